use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::lookup::{AncillaryCatalog, TimezoneTable};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Conversion rate for `+` tick markers.
    pub ticks_per_second: u32,
    /// Where temp copies of live log files are made.
    pub temp_dir: PathBuf,
    /// Root of the locally-mirrored instrument data tree (raw images etc.).
    pub data_dir: PathBuf,
    /// Where parse results are written by the file sink.
    pub output_dir: PathBuf,
    /// When false, ancillary points use the ESP log clock rather than the
    /// reconciled instrument clock.
    pub use_ancillary_timestamps: bool,
    pub timezones: TimezoneTable,
    pub ancillary_variables: AncillaryCatalog,
}

impl ParserConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("ESPLOG_CONFIG_FILE")
            .unwrap_or_else(|_| "/etc/esplog/esplog.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using environment variables", config_path);
            Self::from_env()
        };

        // Environment variables override file config
        if let Ok(dir) = std::env::var("ESPLOG_TEMP_DIR") {
            config.temp_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("ESPLOG_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("ESPLOG_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(tps) = std::env::var("ESPLOG_TICKS_PER_SECOND") {
            if let Ok(tps) = tps.parse() {
                config.ticks_per_second = tps;
            }
        }
        if let Ok(flag) = std::env::var("ESPLOG_USE_ANCILLARY_TIMESTAMPS") {
            if let Ok(flag) = flag.parse() {
                config.use_ancillary_timestamps = flag;
            }
        }

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: ParserConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        Self {
            ticks_per_second: std::env::var("ESPLOG_TICKS_PER_SECOND")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            temp_dir: std::env::var("ESPLOG_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            data_dir: std::env::var("ESPLOG_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            output_dir: std::env::var("ESPLOG_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("out")),
            use_ancillary_timestamps: std::env::var("ESPLOG_USE_ANCILLARY_TIMESTAMPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
            timezones: TimezoneTable::default(),
            ancillary_variables: AncillaryCatalog::default(),
        }
    }

    /// Validate configuration values and required directories
    pub fn validate(&self) -> Result<(), String> {
        if self.ticks_per_second == 0 {
            return Err("ticks_per_second must be > 0".to_string());
        }
        if !self.temp_dir.is_dir() {
            return Err(format!("temp_dir not found at: {}", self.temp_dir.display()));
        }
        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 100,
            temp_dir: std::env::temp_dir(),
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("out"),
            use_ancillary_timestamps: true,
            timezones: TimezoneTable::default(),
            ancillary_variables: AncillaryCatalog::default(),
        }
    }
}
