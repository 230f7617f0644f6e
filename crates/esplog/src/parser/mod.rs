//! Streaming parser for legacy ESP instrument log files.
//!
//! A log file is a sequence of physical lines; a trailing backslash joins a
//! line with the next one into a single logical entry. Each logical entry is
//! dispatched on its first byte: absolute timestamps, relative tick
//! increments, actor-legend updates, or a body line that is run through the
//! event grammar.
//!
//! # Architecture
//!
//! - `classify.rs`: first-byte line dispatch and actor/body splitting
//! - `clock.rs`: timestamp reconstruction (absolute markers + ticks)
//! - `legend.rs`: per-file moniker -> actor symbol table
//! - `reconcile.rs`: instrument-vs-ESP clock reconciliation
//! - `events/`: one grammar rule per file, applied in fixed priority order
//! - `orchestrate.rs`: the single streaming pass over one file

pub mod classify;
pub mod clock;
pub mod events;
pub mod legend;
pub mod model;
pub mod orchestrate;
pub mod reconcile;

pub use model::{AncillaryPoint, LogEvent, ParseError};
pub use orchestrate::{parse_log_file, ParseOutcome};

// Marker bytes of the legacy log grammar. These values are fixed by the
// instrument firmware and must never change.

/// `@` — absolute timestamp marker.
pub const TIMESTAMP_MARKER: u8 = b'@';
/// `+` — relative tick increment.
pub const TICK_MARKER: u8 = b'+';
/// `=` — actor-legend declaration.
pub const LEGEND_MARKER: u8 = b'=';
/// `"` — delimiter for inline quoted actor names.
pub const QUOTE_MARKER: u8 = b'"';
/// `\` — line continuation when trailing, sub-entry separator when embedded.
pub const CONTINUATION_MARKER: u8 = b'\\';

/// Leading bytes that flag a body line but carry no meaning of their own;
/// the actor (if any) follows immediately after.
pub const BODY_PREFIX_MARKERS: [u8; 5] = [b'!', b'#', b'~', b'`', b'.'];

/// Instrument clocks more than this far behind the ESP clock are considered
/// to have drifted and are ignored.
pub const MAX_INSTRUMENT_LAG_SECS: i64 = 10 * 60;
/// Instrument clocks ahead by more than this are assumed to be a civil-day
/// rollover mismatch rather than drift.
pub const DAY_ROLLOVER_THRESHOLD_SECS: i64 = 12 * 60 * 60;
