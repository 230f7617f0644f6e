use std::collections::HashMap;
use tracing::trace;

use super::LEGEND_MARKER;

/// Per-file symbol table mapping single-byte monikers to actor names.
///
/// The log stream declares monikers with `=` lines: `=Xname` defines or
/// overwrites `X`, `=X` deletes `X`, and a bare `=` clears the whole table.
/// The legend never survives a parse pass; every file starts empty.
#[derive(Debug, Default)]
pub struct ActorLegend {
    entries: HashMap<u8, String>,
}

impl ActorLegend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one legend-declaration line (first byte must be `=`).
    pub fn apply(&mut self, line: &[u8]) {
        debug_assert_eq!(line.first(), Some(&LEGEND_MARKER));
        match line.len() {
            0 | 1 => {
                trace!("clearing actor legend");
                self.entries.clear();
            }
            2 => {
                trace!(moniker = %(line[1] as char), "removing legend moniker");
                self.entries.remove(&line[1]);
            }
            _ => {
                let name = String::from_utf8_lossy(&line[2..]).into_owned();
                trace!(moniker = %(line[1] as char), actor = %name, "legend entry");
                self.entries.insert(line[1], name);
            }
        }
    }

    /// Resolve a moniker byte to the declared actor name, if any.
    pub fn resolve(&self, moniker: u8) -> Option<&str> {
        self.entries.get(&moniker).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
