use esplog::deployment::Deployment;
use esplog::runtime::boot;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let (_config, queue) = boot::boot()?;

    let mut args = std::env::args().skip(1);
    let (Some(esp_name), Some(deployment_name)) = (args.next(), args.next()) else {
        eprintln!("usage: esplog <esp-name> <deployment-name> <log-file>...");
        std::process::exit(2);
    };

    // Log files for one deployment are parsed in order, carrying the
    // accumulated record (and its resume watermark) from file to file.
    let mut deployment = Deployment::new(&esp_name, &deployment_name);
    for path in args {
        let submission = queue.submit(deployment.clone(), path.as_str())?;
        if let Some(result) = submission.outcome().await {
            let outcome = result?;
            info!(
                %path,
                samples = outcome.deployment.samples.len(),
                errors = outcome.deployment.errors.len(),
                images = outcome.deployment.images.len(),
                points = outcome.ancillary_points.len(),
                "parsed log file"
            );
            deployment = outcome.deployment;
        }
    }

    Ok(())
}
