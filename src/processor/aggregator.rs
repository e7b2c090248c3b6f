use crate::error::Result;
use crate::models::{CATEGORY, CategoryAggregate, FactTable, PRICE, QUANTITY, TOTAL_SALES};
use crate::processor::rounding::round2;
use polars::prelude::*;
use tracing::{debug, warn};

/// Sums `quantity * price` per category, optionally restricted to the fact
/// rows matching `predicate`.
///
/// Each category total is rounded once, after summing. Every category that
/// occurs in the (filtered) fact table gets an entry, zero totals included.
/// The result is ordered by category name.
pub fn aggregate_by_category(
    fact: &FactTable,
    predicate: Option<Expr>,
) -> Result<Vec<CategoryAggregate>> {
    let mut lf = fact.frame().clone().lazy();
    let filtered = predicate.is_some();
    if let Some(predicate) = predicate {
        lf = lf.filter(predicate);
    }

    let revenue = col(QUANTITY).cast(DataType::Float64) * col(PRICE);
    let grouped = lf
        .group_by([col(CATEGORY)])
        .agg([revenue.sum().alias(TOTAL_SALES)])
        .collect()?;

    let categories = grouped.column(CATEGORY)?.str()?;
    let totals = grouped.column(TOTAL_SALES)?.f64()?;

    let mut aggregates: Vec<CategoryAggregate> = categories
        .into_iter()
        .zip(totals.into_iter())
        .filter_map(|(category, total)| {
            Some(CategoryAggregate {
                category: category?.to_string(),
                total_sales: round2(total.unwrap_or(0.0)),
            })
        })
        .collect();
    aggregates.sort_by(|a, b| a.category.cmp(&b.category));

    debug!(
        "Aggregated {} fact rows into {} categories (filtered: {})",
        fact.height(),
        aggregates.len(),
        filtered
    );
    if aggregates.is_empty() {
        warn!("Category aggregate is empty (filtered: {})", filtered);
    }

    Ok(aggregates)
}
