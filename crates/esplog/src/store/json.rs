use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::deployment::Deployment;
use crate::parser::AncillaryPoint;

use super::sink::{DeploymentSink, SinkError};

/// (esp, deployment, source, raw unit) — the identity a `source_id` is
/// assigned to.
type SourceKey = (String, String, String, String);

/// File-backed sink: the deployment record as pretty JSON, ancillary points
/// appended to a CSV, both under `output_dir/<esp>/<deployment>/`.
#[derive(Debug)]
pub struct FileSink {
    output_dir: PathBuf,
    source_ids: DashMap<SourceKey, i64>,
    next_source_id: AtomicI64,
}

impl FileSink {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            source_ids: DashMap::new(),
            next_source_id: AtomicI64::new(1),
        }
    }

    fn deployment_dir(&self, deployment: &Deployment) -> PathBuf {
        self.output_dir.join(&deployment.esp.name).join(&deployment.name)
    }

    fn source_id(&self, key: SourceKey) -> i64 {
        *self
            .source_ids
            .entry(key)
            .or_insert_with(|| self.next_source_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl DeploymentSink for FileSink {
    async fn persist_deployment(&self, deployment: &mut Deployment) -> Result<(), SinkError> {
        let dir = self.deployment_dir(deployment);
        tokio::fs::create_dir_all(&dir).await?;

        let json = serde_json::to_vec_pretty(deployment)?;
        let path = dir.join("deployment.json");
        tokio::fs::write(&path, json).await?;
        info!(path = %path.display(), "persisted deployment record");
        Ok(())
    }

    async fn insert_ancillary_points(
        &self,
        deployment: &mut Deployment,
        points: &[AncillaryPoint],
    ) -> Result<(), SinkError> {
        if points.is_empty() {
            return Ok(());
        }

        let dir = self.deployment_dir(deployment);
        tokio::fs::create_dir_all(&dir).await?;

        let mut csv = String::new();
        for point in points {
            let key = (
                deployment.esp.name.clone(),
                deployment.name.clone(),
                point.source.clone(),
                point.units_as_logged.clone(),
            );
            let id = self.source_id(key);

            // Write the assigned id back onto the deployment's catalog.
            if let Some(record) = deployment
                .ancillary_data
                .get_mut(&point.source)
                .and_then(|units| units.get_mut(&point.units_as_logged))
            {
                record.source_id = Some(id);
            }

            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                id,
                point.timestamp.to_rfc3339(),
                point.source,
                point.var_name,
                point.units,
                point.value,
            ));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("points.csv"))
            .await?;
        file.write_all(csv.as_bytes()).await?;
        file.flush().await?;
        info!(count = points.len(), "inserted ancillary points");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::lookup::VariableDef;
    use chrono::{TimeZone, Utc};

    fn point(source: &str, units_as_logged: &str, value: &str) -> AncillaryPoint {
        AncillaryPoint {
            source: source.to_string(),
            var_name: "Temp".to_string(),
            var_long_name: "Temperature".to_string(),
            units: "Degrees C".to_string(),
            units_as_logged: units_as_logged.to_string(),
            timestamp: Utc.with_ymd_and_hms(2016, 4, 7, 19, 0, 0).unwrap(),
            value: value.to_string(),
        }
    }

    fn deployment_with_catalog() -> Deployment {
        let mut deployment = Deployment::new("bruce", "canon16");
        let def = VariableDef {
            var_name: "Temp".to_string(),
            var_long_name: "Temperature".to_string(),
            units: "Degrees C".to_string(),
        };
        deployment.register_ancillary_variable("Can", "C", &def);
        deployment.register_ancillary_variable("CTD", "C", &def);
        deployment
    }

    #[tokio::test]
    async fn test_persist_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        let mut deployment = Deployment::new("bruce", "canon16");

        sink.persist_deployment(&mut deployment).await.unwrap();

        let raw = std::fs::read(dir.path().join("bruce/canon16/deployment.json")).unwrap();
        let back: Deployment = serde_json::from_slice(&raw).unwrap();
        assert_eq!(back.name, "canon16");
    }

    #[tokio::test]
    async fn test_source_ids_stable_and_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        let mut deployment = deployment_with_catalog();

        let points = vec![point("Can", "C", "24.2"), point("CTD", "C", "12.1")];
        sink.insert_ancillary_points(&mut deployment, &points).await.unwrap();

        let can_id = deployment.ancillary_data["Can"]["C"].source_id.unwrap();
        let ctd_id = deployment.ancillary_data["CTD"]["C"].source_id.unwrap();
        assert_ne!(can_id, ctd_id);

        // A second pass for the same sources reuses the assigned ids.
        sink.insert_ancillary_points(&mut deployment, &points).await.unwrap();
        assert_eq!(deployment.ancillary_data["Can"]["C"].source_id, Some(can_id));

        let csv = std::fs::read_to_string(dir.path().join("bruce/canon16/points.csv")).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.lines().next().unwrap().starts_with(&format!("{can_id},")));
    }

    #[tokio::test]
    async fn test_empty_points_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        let mut deployment = deployment_with_catalog();

        sink.insert_ancillary_points(&mut deployment, &[]).await.unwrap();
        assert!(!dir.path().join("bruce/canon16/points.csv").exists());
    }
}
