use crate::config::DatasetSection;
use crate::error::{PipelineError, Result};
use crate::models::{SourceTables, TableKind};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Produces one of the three source tables.
pub trait DatasetLoader: Send + Sync {
    fn load(&self, kind: TableKind) -> Result<DataFrame>;
}

/// Reads the source tables from files in a single directory.
///
/// Files ending in `.parquet` are read as Parquet, `.csv` files as CSV with a
/// header row.
#[derive(Debug, Clone)]
pub struct CsvDirectoryLoader {
    dir: PathBuf,
    users_file: String,
    products_file: String,
    purchases_file: String,
    infer_schema_length: Option<usize>,
}

impl CsvDirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::from_config(&DatasetSection::default()).with_dir(dir)
    }

    pub fn from_config(section: &DatasetSection) -> Self {
        Self {
            dir: PathBuf::from(&section.dir),
            users_file: section.users_file.clone(),
            products_file: section.products_file.clone(),
            purchases_file: section.purchases_file.clone(),
            infer_schema_length: section.infer_schema_length,
        }
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn path_for(&self, kind: TableKind) -> PathBuf {
        let file = match kind {
            TableKind::Users => &self.users_file,
            TableKind::Products => &self.products_file,
            TableKind::Purchases => &self.purchases_file,
        };
        self.dir.join(file)
    }

    fn read_csv(&self, path: &Path) -> PolarsResult<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
    }

    fn read_parquet(&self, path: &Path) -> PolarsResult<DataFrame> {
        let file = std::fs::File::open(path)?;
        ParquetReader::new(file).finish()
    }
}

impl DatasetLoader for CsvDirectoryLoader {
    fn load(&self, kind: TableKind) -> Result<DataFrame> {
        let path = self.path_for(kind);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let read = match extension.as_deref() {
            Some("csv") => self.read_csv(&path),
            Some("parquet") => self.read_parquet(&path),
            _ => return Err(PipelineError::UnsupportedFormat { table: kind, path }),
        };

        let df = read.map_err(|source| PipelineError::Load {
            table: kind,
            path: path.clone(),
            source,
        })?;

        info!(
            "Loaded {} table from {}: {} rows, {} columns",
            kind,
            path.display(),
            df.height(),
            df.width()
        );
        Ok(df)
    }
}

/// Loads the three source tables concurrently on the blocking thread pool.
/// The first failure is returned; nothing is retried.
pub async fn load_sources(loader: Arc<dyn DatasetLoader>) -> Result<SourceTables> {
    let load = |kind: TableKind| {
        let loader = Arc::clone(&loader);
        async move {
            match tokio::task::spawn_blocking(move || loader.load(kind)).await {
                Ok(result) => result,
                Err(source) => Err(PipelineError::LoaderTask { table: kind, source }),
            }
        }
    };

    let (users, products, purchases) = tokio::try_join!(
        load(TableKind::Users),
        load(TableKind::Products),
        load(TableKind::Purchases)
    )?;

    Ok(SourceTables {
        users,
        products,
        purchases,
    })
}
