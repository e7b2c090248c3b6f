use crate::models::AgeRange;
use crate::processor::{CleaningScope, PipelineSettings};
use crate::report::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "src/configs/pipeline.toml";
pub const ENV_PREFIX: &str = "SALES_PIPELINE";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dataset: DatasetSection,
    pub analysis: AnalysisSection,
    pub output: OutputSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSection {
    pub dir: String,
    pub users_file: String,
    pub products_file: String,
    pub purchases_file: String,
    // Rows scanned to infer CSV column types; unset scans the whole file
    pub infer_schema_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    pub age_min: i64,
    pub age_max: i64,
    pub top_k: usize,
    pub cleaning_scope: CleaningScope,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            dir: "./dataset".to_string(),
            users_file: "users.csv".to_string(),
            products_file: "products.csv".to_string(),
            purchases_file: "purchases.csv".to_string(),
            infer_schema_length: None,
        }
    }
}

impl Default for AnalysisSection {
    fn default() -> Self {
        let settings = PipelineSettings::default();
        Self {
            age_min: settings.age_range.min,
            age_max: settings.age_range.max,
            top_k: settings.top_k,
            cleaning_scope: settings.cleaning_scope,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Reads a single TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config file: {}", path))?;

        let config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse pipeline config file: {}", path))?;

        Ok(config)
    }

    /// Layers defaults, the TOML file at `path` (if it exists) and
    /// `SALES_PIPELINE__<SECTION>__<KEY>` environment variables, in that order.
    pub fn load(path: &str) -> Result<Self> {
        let layered = ::config::Config::builder()
            .add_source(::config::Config::try_from(&PipelineConfig::default())?)
            .add_source(
                ::config::File::new(path, ::config::FileFormat::Toml).required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to build pipeline configuration from {}", path))?;

        let config: PipelineConfig = layered
            .try_deserialize()
            .context("Failed to deserialize pipeline configuration")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dataset.dir.trim().is_empty() {
            return Err(anyhow::anyhow!("Dataset directory cannot be empty"));
        }

        for (name, file) in [
            ("users_file", &self.dataset.users_file),
            ("products_file", &self.dataset.products_file),
            ("purchases_file", &self.dataset.purchases_file),
        ] {
            if file.trim().is_empty() {
                return Err(anyhow::anyhow!("Dataset {} cannot be empty", name));
            }
        }

        if self.analysis.age_min > self.analysis.age_max {
            return Err(anyhow::anyhow!(
                "Age range is inverted: age_min {} > age_max {}",
                self.analysis.age_min,
                self.analysis.age_max
            ));
        }

        Ok(())
    }

    pub fn age_range(&self) -> AgeRange {
        AgeRange::new(self.analysis.age_min, self.analysis.age_max)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            age_range: self.age_range(),
            top_k: self.analysis.top_k,
            cleaning_scope: self.analysis.cleaning_scope,
        }
    }
}
