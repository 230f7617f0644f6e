//! First-byte dispatch of logical lines and actor/body splitting.

use super::legend::ActorLegend;
use super::{
    BODY_PREFIX_MARKERS, CONTINUATION_MARKER, LEGEND_MARKER, QUOTE_MARKER, TICK_MARKER,
    TIMESTAMP_MARKER,
};

/// What a logical line is, decided purely by its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `@` — absolute timestamp marker.
    Timestamp,
    /// `+` — relative tick increment.
    Tick,
    /// `=` — actor-legend declaration.
    Legend,
    /// Anything else — a body line for the event grammar.
    Body,
}

pub fn classify(line: &[u8]) -> LineKind {
    match line.first() {
        Some(&TIMESTAMP_MARKER) => LineKind::Timestamp,
        Some(&TICK_MARKER) => LineKind::Tick,
        Some(&LEGEND_MARKER) => LineKind::Legend,
        _ => LineKind::Body,
    }
}

/// Split a body line into its attributed actor (if declared inline) and the
/// message body.
///
/// Layout: an optional one-byte flag marker (`!`, `#`, `~`, `` ` ``, `.`),
/// then either a `"`-quoted actor name or a single legend moniker, then the
/// body. A single leading backslash left over from line continuation is
/// stripped from the body.
pub fn split_body<'a>(line: &'a [u8], legend: &ActorLegend) -> (Option<String>, &'a [u8]) {
    let mut rest = match line.first() {
        Some(b) if BODY_PREFIX_MARKERS.contains(b) => &line[1..],
        _ => line,
    };

    let mut actor = None;
    match rest.first() {
        Some(&QUOTE_MARKER) => {
            // Quoted actor name: everything up to the closing quote.
            match rest[1..].iter().position(|&b| b == QUOTE_MARKER) {
                Some(close) => {
                    actor = Some(String::from_utf8_lossy(&rest[1..close + 1]).into_owned());
                    rest = &rest[close + 2..];
                }
                None => {
                    // Unterminated quote: the whole remainder is the name.
                    actor = Some(String::from_utf8_lossy(&rest[1..]).into_owned());
                    rest = &[];
                }
            }
        }
        Some(&moniker) => {
            if let Some(name) = legend.resolve(moniker) {
                actor = Some(name.to_string());
                rest = &rest[1..];
            }
        }
        None => {}
    }

    if rest.first() == Some(&CONTINUATION_MARKER) {
        rest = &rest[1..];
    }

    (actor, rest)
}
