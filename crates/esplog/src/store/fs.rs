use std::path::{Path, PathBuf};

/// Filesystem layout of the locally-mirrored instrument data tree. Image
/// files are synced down from the instrument by an external collaborator;
/// the parser only checks whether they have arrived.
#[derive(Debug, Clone)]
pub struct DeploymentFs {
    data_dir: PathBuf,
}

impl DeploymentFs {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self { data_dir: data_dir.as_ref().to_path_buf() }
    }

    /// Where the raw `.tif` for `filename` lands once mirrored locally.
    pub fn raw_image_path(&self, esp: &str, deployment: &str, filename: &str) -> PathBuf {
        self.data_dir
            .join("instances")
            .join(esp)
            .join("deployments")
            .join(deployment)
            .join("data/raw/esp")
            .join(filename)
    }

    pub async fn image_downloaded(&self, esp: &str, deployment: &str, filename: &str) -> bool {
        tokio::fs::try_exists(self.raw_image_path(esp, deployment, filename))
            .await
            .unwrap_or(false)
    }

    /// URL of the processed (jpg) rendition served by the dashboard.
    pub fn processed_image_url(esp: &str, deployment: &str, filename: &str) -> String {
        let jpg = match filename.strip_suffix(".tif") {
            Some(stem) => format!("{stem}.jpg"),
            None => filename.to_string(),
        };
        format!("/data/instances/{esp}/deployments/{deployment}/data/processed/esp/{jpg}")
    }
}
