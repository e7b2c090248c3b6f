use crate::models::TableKind;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Stages that merely produce zero rows are not errors; they are logged as
/// warnings and the run continues.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        table: TableKind,
        column: &'static str,
    },

    #[error("{table}.{column} has type {dtype}, which cannot be coerced to {expected}")]
    TypeMismatch {
        table: TableKind,
        column: &'static str,
        dtype: String,
        expected: &'static str,
    },

    #[error("failed to load {table} table from {}: {source}", .path.display())]
    Load {
        table: TableKind,
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("unsupported file format for {table} table: {}", .path.display())]
    UnsupportedFormat { table: TableKind, path: PathBuf },

    #[error("loader task for {table} table did not complete: {source}")]
    LoaderTask {
        table: TableKind,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
