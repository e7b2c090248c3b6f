use anyhow::{Context, Result};
use sales_pipeline::config::{DEFAULT_CONFIG_PATH, PipelineConfig};
use sales_pipeline::logging;
use sales_pipeline::models::TableKind;
use sales_pipeline::processor::{clean, validate_and_coerce};
use sales_pipeline::storage::{CsvDirectoryLoader, DatasetLoader, load_sources};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = PipelineConfig::load(&config_path)
        .with_context(|| format!("Failed to load pipeline configuration from {}", config_path))?;

    logging::init(&config.logging.level);

    println!("=== INSPECTING DATASET: {} ===\n", config.dataset.dir);

    let loader: Arc<dyn DatasetLoader> = Arc::new(CsvDirectoryLoader::from_config(&config.dataset));
    let sources = load_sources(loader).await?;

    for kind in TableKind::ALL {
        let df = sources.get(kind);
        println!("--- {} ({} rows, {} columns) ---", kind, df.height(), df.width());

        for column in df.get_columns() {
            println!(
                "   {:<16} {:<10} nulls: {}",
                column.name().as_str(),
                column.dtype().to_string(),
                column.null_count()
            );
        }

        match validate_and_coerce(kind, df) {
            Ok(coerced) => {
                let cleaned = clean(kind, &coerced, config.analysis.cleaning_scope)?;
                println!(
                    "✅ Required columns present; {} of {} rows complete after cleaning",
                    cleaned.height(),
                    df.height()
                );
                println!("{}", cleaned.head(Some(5)));
            }
            Err(e) => {
                println!("❌ {}", e);
            }
        }
        println!();
    }

    Ok(())
}
