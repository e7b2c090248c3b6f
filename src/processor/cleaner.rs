use crate::error::Result;
use crate::models::TableKind;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Which columns must be present for a row to survive cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningScope {
    /// Every column of the table, including ones the pipeline ignores.
    #[default]
    AllColumns,
    /// Only the columns the pipeline reads.
    RequiredColumns,
}

/// Drops every row that has a missing value in one of the considered columns.
/// NaN counts as missing for float columns.
pub fn clean(kind: TableKind, table: &DataFrame, scope: CleaningScope) -> Result<DataFrame> {
    let columns: Vec<String> = match scope {
        CleaningScope::AllColumns => table
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        CleaningScope::RequiredColumns => kind
            .required_columns()
            .iter()
            .map(|c| c.name.to_string())
            .collect(),
    };

    let mut predicate: Option<Expr> = None;
    for name in &columns {
        let mut present = col(name.as_str()).is_not_null();
        if table.column(name)?.dtype().is_float() {
            present = present.and(col(name.as_str()).is_not_nan());
        }
        predicate = Some(match predicate {
            Some(acc) => acc.and(present),
            None => present,
        });
    }

    let cleaned = match predicate {
        Some(predicate) => table.clone().lazy().filter(predicate).collect()?,
        None => table.clone(),
    };

    let dropped = table.height() - cleaned.height();
    info!(
        "Cleaned {} table: kept {} of {} rows ({} incomplete)",
        kind,
        cleaned.height(),
        table.height(),
        dropped
    );
    if cleaned.height() == 0 {
        warn!("{} table has no complete rows after cleaning", kind);
    }

    Ok(cleaned)
}
