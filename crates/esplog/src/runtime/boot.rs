//! Boot — logging init, config load, queue creation.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::ParserConfig;
use crate::job::LogParserQueue;
use crate::store::FileSink;

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "esplog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load and validate config, then spawn the parse worker with a file-backed
/// sink. Returns `(ParserConfig, LogParserQueue)` on success.
pub fn boot() -> Result<(ParserConfig, LogParserQueue), Box<dyn std::error::Error>> {
    info!("Starting ESP log parser v0.1.0");

    let config = ParserConfig::load()?;
    config.validate()?;
    info!(
        "Loaded configuration: ticks_per_second={}, temp_dir={}, output_dir={}",
        config.ticks_per_second,
        config.temp_dir.display(),
        config.output_dir.display()
    );

    let sink = FileSink::new(&config.output_dir);
    let queue = LogParserQueue::new(config.clone(), sink);
    info!("Parse worker started");

    Ok((config, queue))
}
