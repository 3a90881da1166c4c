mod bootstrap;

use anyhow::Result;
use motor_core::settings::Settings;
use motor_runtime::{Pipeline, PipelineConfig};

fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Motor analysis v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, output: {}, profiles: {:?}, charts: {}",
        settings.input.display(),
        settings.output.display(),
        settings.profiles,
        if settings.no_charts {
            "disabled".to_string()
        } else {
            settings.chart_dir.display().to_string()
        }
    );

    let config = PipelineConfig::from(&settings);
    let report = Pipeline::new(config).run();

    if report.is_complete() {
        tracing::info!("All {} steps completed", report.completed.len());
    } else {
        let skipped: Vec<String> = report.skipped.iter().map(|s| s.step.to_string()).collect();
        tracing::warn!("Finished with skipped steps: {}", skipped.join(", "));
    }
    tracing::debug!("Run report: {}", serde_json::to_string(&report)?);

    Ok(())
}
