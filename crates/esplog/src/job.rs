//! Serial parse-job queue: one log file is parsed at a time process-wide,
//! later submissions drain FIFO. Parses must not overlap — each pass carries
//! its own legend and clock state, and two passes over the same deployment
//! record would race on the accumulator.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::conf::ParserConfig;
use crate::deployment::Deployment;
use crate::parser::{parse_log_file, ParseError, ParseOutcome};
use crate::store::DeploymentSink;

struct ParseJob {
    deployment: Deployment,
    path: PathBuf,
    reply: oneshot::Sender<Result<ParseOutcome, ParseError>>,
}

/// What `submit` returns: a handle for the outcome, or nothing when the same
/// file is already waiting (the original submitter's handle stays valid).
#[derive(Debug)]
pub enum Submission {
    Queued(oneshot::Receiver<Result<ParseOutcome, ParseError>>),
    Duplicate,
}

/// Handle to the single background parse worker.
#[derive(Debug, Clone)]
pub struct LogParserQueue {
    tx: mpsc::UnboundedSender<ParseJob>,
    queued: Arc<DashMap<PathBuf, ()>>,
}

impl LogParserQueue {
    /// Spawn the worker task. Jobs run strictly one at a time in submission
    /// order; results are persisted through `sink` before the submitter is
    /// answered.
    pub fn new<S>(config: ParserConfig, sink: S) -> Self
    where
        S: DeploymentSink + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<ParseJob>();
        let queued: Arc<DashMap<PathBuf, ()>> = Arc::new(DashMap::new());

        let pending = Arc::clone(&queued);
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                // The file may be resubmitted as soon as this job starts.
                pending.remove(&job.path);

                info!(path = %job.path.display(), deployment = %job.deployment.name, "parsing log file");
                let result = run_job(&config, &sink, job.deployment, &job.path).await;
                if let Err(err) = &result {
                    error!(path = %job.path.display(), %err, "parse job failed");
                }
                let _ = job.reply.send(result);
            }
        });

        Self { tx, queued }
    }

    /// Queue one file for parsing. Rejects empty submissions synchronously;
    /// a path that is already waiting is ignored.
    pub fn submit(
        &self,
        deployment: Deployment,
        path: impl Into<PathBuf>,
    ) -> Result<Submission, ParseError> {
        let path = path.into();
        if path.as_os_str().is_empty() || deployment.name.is_empty() || deployment.esp.name.is_empty()
        {
            return Err(ParseError::MissingSubmission);
        }

        if self.queued.insert(path.clone(), ()).is_some() {
            info!(path = %path.display(), "log file already queued, ignoring");
            return Ok(Submission::Duplicate);
        }

        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ParseJob { deployment, path, reply })
            .map_err(|_| ParseError::QueueClosed)?;
        Ok(Submission::Queued(rx))
    }
}

impl Submission {
    /// Wait for the job to finish. `Duplicate` submissions resolve to
    /// `QueueClosed` only if the queue died; otherwise they have no outcome
    /// of their own and return `None`.
    pub async fn outcome(self) -> Option<Result<ParseOutcome, ParseError>> {
        match self {
            Submission::Queued(rx) => Some(rx.await.unwrap_or(Err(ParseError::QueueClosed))),
            Submission::Duplicate => None,
        }
    }
}

async fn run_job<S: DeploymentSink>(
    config: &ParserConfig,
    sink: &S,
    deployment: Deployment,
    path: &std::path::Path,
) -> Result<ParseOutcome, ParseError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ParseError::LogFileMissing(path.to_path_buf()));
    }

    // Parse a private copy: the live log may still be growing. The temp file
    // is removed on drop whether the job succeeds or fails.
    let temp = tempfile::Builder::new()
        .prefix("esp_log_file_")
        .tempfile_in(&config.temp_dir)?;
    tokio::fs::copy(path, temp.path()).await?;

    let mut outcome = parse_log_file(config, deployment, temp.path()).await?;

    sink.persist_deployment(&mut outcome.deployment)
        .await
        .map_err(|e| ParseError::Persistence(e.to_string()))?;

    if !outcome.ancillary_points.is_empty() {
        sink.insert_ancillary_points(&mut outcome.deployment, &outcome.ancillary_points)
            .await
            .map_err(|e| ParseError::Persistence(e.to_string()))?;
        // The bulk insert assigned source ids onto the catalog; store them.
        sink.persist_deployment(&mut outcome.deployment)
            .await
            .map_err(|e| ParseError::Persistence(e.to_string()))?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AncillaryPoint;
    use crate::store::SinkError;
    use std::io::Write;

    struct NullSink;

    impl DeploymentSink for NullSink {
        async fn persist_deployment(&self, _: &mut Deployment) -> Result<(), SinkError> {
            Ok(())
        }
        async fn insert_ancillary_points(
            &self,
            _: &mut Deployment,
            _: &[AncillaryPoint],
        ) -> Result<(), SinkError> {
            Ok(())
        }
    }

    struct FailingSink;

    impl DeploymentSink for FailingSink {
        async fn persist_deployment(&self, _: &mut Deployment) -> Result<(), SinkError> {
            Err(SinkError::Io(std::io::Error::other("database is down")))
        }
        async fn insert_ancillary_points(
            &self,
            _: &mut Deployment,
            _: &[AncillaryPoint],
        ) -> Result<(), SinkError> {
            Ok(())
        }
    }

    fn write_log(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_submit_parses_and_resolves() {
        let queue = LogParserQueue::new(ParserConfig::default(), NullSink);
        let log = write_log("@UTC1000000000.0\nSampling 50ml\nSampled 48ml\n");

        let submission = queue
            .submit(Deployment::new("bruce", "canon16"), log.path())
            .unwrap();
        let outcome = submission.outcome().await.unwrap().unwrap();
        assert_eq!(outcome.deployment.samples.len(), 1);
        assert_eq!(outcome.deployment.last_line_parsed, 3);
    }

    #[tokio::test]
    async fn test_rejects_empty_submission() {
        let queue = LogParserQueue::new(ParserConfig::default(), NullSink);

        let result = queue.submit(Deployment::new("bruce", "canon16"), "");
        assert!(matches!(result, Err(ParseError::MissingSubmission)));

        let result = queue.submit(Deployment::new("", ""), "/some/log");
        assert!(matches!(result, Err(ParseError::MissingSubmission)));
    }

    #[tokio::test]
    async fn test_duplicate_path_is_ignored() {
        let queue = LogParserQueue::new(ParserConfig::default(), NullSink);
        let log = write_log("@UTC1000000000.0\n");

        // No await between the two submits, so the worker cannot have
        // dequeued the first one yet.
        let first = queue
            .submit(Deployment::new("bruce", "canon16"), log.path())
            .unwrap();
        let second = queue
            .submit(Deployment::new("bruce", "canon16"), log.path())
            .unwrap();

        assert!(matches!(second, Submission::Duplicate));
        assert!(second.outcome().await.is_none());
        assert!(first.outcome().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_jobs_drain_in_submission_order() {
        let queue = LogParserQueue::new(ParserConfig::default(), NullSink);
        let log_a = write_log("@UTC1000000000.0\nSampling 10ml\n");
        let log_b = write_log("@UTC1000000000.0\nSampling 20ml\n");

        let first = queue.submit(Deployment::new("bruce", "a"), log_a.path()).unwrap();
        let second = queue.submit(Deployment::new("bruce", "b"), log_b.path()).unwrap();

        let outcome_a = first.outcome().await.unwrap().unwrap();
        let outcome_b = second.outcome().await.unwrap().unwrap();
        assert_eq!(outcome_a.deployment.samples["1000000000000"].target_volume, "10");
        assert_eq!(outcome_b.deployment.samples["1000000000000"].target_volume, "20");
        assert_eq!(outcome_a.deployment.name, "a");
        assert_eq!(outcome_b.deployment.name, "b");
    }

    #[tokio::test]
    async fn test_missing_file_reported_to_submitter() {
        let queue = LogParserQueue::new(ParserConfig::default(), NullSink);
        let submission = queue
            .submit(Deployment::new("bruce", "canon16"), "/no/such/file.log")
            .unwrap();
        let result = submission.outcome().await.unwrap();
        assert!(matches!(result, Err(ParseError::LogFileMissing(_))));
    }

    #[tokio::test]
    async fn test_queue_continues_after_failed_job() {
        let queue = LogParserQueue::new(ParserConfig::default(), NullSink);
        let log = write_log("@UTC1000000000.0\nSampling 50ml\n");

        let bad = queue
            .submit(Deployment::new("bruce", "canon16"), "/no/such/file.log")
            .unwrap();
        let good = queue
            .submit(Deployment::new("bruce", "canon16"), log.path())
            .unwrap();

        assert!(bad.outcome().await.unwrap().is_err());
        assert!(good.outcome().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_persistence_failure_propagates() {
        let queue = LogParserQueue::new(ParserConfig::default(), FailingSink);
        let log = write_log("@UTC1000000000.0\nSampling 50ml\n");

        let submission = queue
            .submit(Deployment::new("bruce", "canon16"), log.path())
            .unwrap();
        let result = submission.outcome().await.unwrap();
        assert!(matches!(result, Err(ParseError::Persistence(_))));
    }
}
