use crate::error::{PipelineError, Result};
use crate::models::TableKind;
use polars::prelude::*;
use tracing::{debug, warn};

/// Checks that every required column of `kind` is present and has a dtype
/// that can be cast to its semantic type.
pub fn validate_columns(kind: TableKind, df: &DataFrame) -> Result<()> {
    for required in kind.required_columns() {
        let column = df
            .column(required.name)
            .map_err(|_| PipelineError::MissingColumn {
                table: kind,
                column: required.name,
            })?;

        if !required.semantic.accepts(column.dtype()) {
            return Err(PipelineError::TypeMismatch {
                table: kind,
                column: required.name,
                dtype: column.dtype().to_string(),
                expected: required.semantic.name(),
            });
        }
    }

    Ok(())
}

/// Casts the required columns to their semantic types.
///
/// The cast is non-strict: a value that cannot be converted (including a
/// fractional value in an integer column) becomes null and the row is later
/// dropped by the cleaner. Extra columns are left as-is.
pub fn coerce_types(kind: TableKind, df: &DataFrame) -> Result<DataFrame> {
    let mut casts: Vec<Expr> = Vec::with_capacity(kind.required_columns().len());
    for required in kind.required_columns() {
        let source = df.column(required.name)?.dtype();
        casts.push(required.semantic.coerce_expr(required.name, source));
    }

    let coerced = df.clone().lazy().with_columns(casts).collect()?;

    for required in kind.required_columns() {
        let before = df.column(required.name)?.null_count();
        let after = coerced.column(required.name)?.null_count();
        if after > before {
            warn!(
                "{} values in {}.{} are not valid {} values and will be treated as missing",
                after - before,
                kind,
                required.name,
                required.semantic.name()
            );
        }
    }

    warn_on_duplicate_keys(kind, &coerced)?;

    debug!("Coerced {} table ({} rows)", kind, coerced.height());
    Ok(coerced)
}

/// Validates then coerces a single table.
pub fn validate_and_coerce(kind: TableKind, df: &DataFrame) -> Result<DataFrame> {
    validate_columns(kind, df)?;
    coerce_types(kind, df)
}

// Duplicate keys fan out purchases during the join; they are reported, not rejected.
fn warn_on_duplicate_keys(kind: TableKind, df: &DataFrame) -> Result<()> {
    let Some(key) = kind.key_column() else {
        return Ok(());
    };

    let keys = df.column(key)?.as_materialized_series().drop_nulls();
    let unique = keys.n_unique()?;
    if unique < keys.len() {
        warn!(
            "{} table has {} duplicate {} values; matching purchases will be counted once per duplicate",
            kind,
            keys.len() - unique,
            key
        );
    }

    Ok(())
}
