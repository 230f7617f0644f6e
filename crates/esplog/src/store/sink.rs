use std::future::Future;

use thiserror::Error;

use crate::deployment::Deployment;
use crate::parser::AncillaryPoint;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O failure while persisting: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Contract between the parse pipeline and whatever stores its results.
///
/// `persist_deployment` durably stores the accumulated record.
/// `insert_ancillary_points` bulk-inserts the time-series points of one parse
/// pass and assigns each distinct (esp, deployment, source, raw unit) a
/// stable `source_id`, written back onto the deployment's catalog.
pub trait DeploymentSink: Send + Sync {
    fn persist_deployment(
        &self,
        deployment: &mut Deployment,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;

    fn insert_ancillary_points(
        &self,
        deployment: &mut Deployment,
        points: &[AncillaryPoint],
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}
