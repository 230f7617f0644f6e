use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("deployment or log file was not specified")]
    MissingSubmission,

    #[error("log file {0} does not exist")]
    LogFileMissing(PathBuf),

    #[error("I/O failure while parsing: {0}")]
    Io(#[from] std::io::Error),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("parse queue has shut down")]
    QueueClosed,
}

/// One structured event extracted from a single body line.
///
/// The grammar rules in [`super::events`] are mutually exclusive by design;
/// a body line yields at most one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    /// A BadNews error report with a bracketed subject and message.
    Error { subject: String, message: String },
    /// A `Can@` block of per-instrument sensor readings.
    Ancillary(Vec<AncillaryEntry>),
    /// A camera exposure record.
    Image {
        x_pixels: u32,
        y_pixels: u32,
        bits: u32,
        exposure: f64,
        /// Directory part of the path on the instrument, trailing slash kept.
        path_prefix: String,
        filename: String,
    },
    /// The start of a named protocol run, with an optional archive clause.
    ProtocolRun {
        name: String,
        target_vol: String,
        archive: Option<ArchiveSpec>,
    },
    /// DWSM sample-bag inhale start.
    DwsmSampleStart { target_volume: String },
    /// DWSM sample-bag stabilization, which ends the inhale.
    DwsmSampleEnd,
    /// Generic sample start.
    SampleStart { target_volume: String },
    /// Generic sample end with the volume actually drawn.
    SampleEnd { actual_volume: String },
}

/// Whole-cell-archive clause trailing a protocol-run start.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveSpec {
    pub name: String,
    pub target_vol: String,
}

/// One per-instrument sub-entry of an ancillary block: the instrument's own
/// wall clock (no date, no zone) plus its comma-separated readings.
#[derive(Debug, Clone, PartialEq)]
pub struct AncillaryEntry {
    pub source: String,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub readings: Vec<RawReading>,
}

/// A value/unit pair exactly as logged, before catalog lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub value: String,
    pub units: String,
}

/// One ancillary time-series point, handed to the persistence collaborator
/// as a flat list at the end of a parse pass. Never retained on the
/// deployment record itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AncillaryPoint {
    pub source: String,
    pub var_name: String,
    pub var_long_name: String,
    pub units: String,
    pub units_as_logged: String,
    pub timestamp: DateTime<Utc>,
    pub value: String,
}
