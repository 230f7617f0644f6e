//! The deployment accumulator: everything a parse pass learns about one
//! deployment, keyed by event timestamp, plus the resume watermark that
//! lets a later pass over a grown log file skip already-parsed lines.

pub mod apply;
pub mod model;

pub use model::{
    AncillaryVariableRecord, ArchiveRecord, Deployment, ErrorRecord, Esp, ImageRecord,
    ProcessRunRecord, SampleRecord,
};
