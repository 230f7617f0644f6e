//! Persistence and filesystem collaborators. The parser core only knows the
//! [`DeploymentSink`] contract; the bundled [`FileSink`] writes JSON and CSV
//! under the configured output directory.

pub mod fs;
pub mod json;
pub mod sink;

pub use fs::DeploymentFs;
pub use json::FileSink;
pub use sink::{DeploymentSink, SinkError};
