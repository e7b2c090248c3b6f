use anyhow::{Context, Result};
use sales_pipeline::config::{DEFAULT_CONFIG_PATH, PipelineConfig};
use sales_pipeline::logging;
use sales_pipeline::processor::SalesPipeline;
use sales_pipeline::report::Reporter;
use sales_pipeline::storage::{CsvDirectoryLoader, DatasetLoader, load_sources};
use std::env;
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = PipelineConfig::load(&config_path)
        .with_context(|| format!("Failed to load pipeline configuration from {}", config_path))?;

    logging::init(&config.logging.level);
    config.validate().context("Invalid pipeline configuration")?;

    let run_id = Uuid::new_v4();
    run(config).instrument(info_span!("pipeline_run", %run_id)).await
}

async fn run(config: PipelineConfig) -> Result<()> {
    info!("🚀 Starting category sales pipeline");
    info!(
        "Dataset directory: {} (age range {}, top {})",
        config.dataset.dir,
        config.age_range(),
        config.analysis.top_k
    );

    let loader: Arc<dyn DatasetLoader> = Arc::new(CsvDirectoryLoader::from_config(&config.dataset));

    info!("Loading data...");
    let sources = load_sources(loader)
        .await
        .context("Failed to load source datasets")?;
    info!("Data loaded successfully");

    let pipeline = SalesPipeline::new(config.pipeline_settings());
    let report = pipeline.run(&sources).context("Pipeline run failed")?;

    if report.top_categories.is_empty() {
        warn!(
            "⚠️ No purchases found for age range {}; share tables are empty",
            report.age_range
        );
    }

    let rendered = Reporter
        .render(&report, config.output.format)
        .context("Failed to render report")?;
    println!("{}", rendered);

    info!("🎉 Pipeline completed successfully");
    Ok(())
}
