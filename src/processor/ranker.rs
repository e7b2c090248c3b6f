use crate::models::{CategoryAggregate, CategoryShare};
use crate::processor::rounding::round2;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Extends each aggregate with its share of the grand total, in percent.
///
/// When the grand total is zero every share is zero. Input order is kept.
pub fn compute_shares(aggregates: &[CategoryAggregate]) -> Vec<CategoryShare> {
    let grand_total: f64 = aggregates.iter().map(|a| a.total_sales).sum();
    if grand_total == 0.0 && !aggregates.is_empty() {
        warn!("Grand total is zero; all category shares are reported as 0%");
    }

    aggregates
        .iter()
        .map(|a| CategoryShare {
            category: a.category.clone(),
            total_sales: a.total_sales,
            percentage: if grand_total == 0.0 {
                0.0
            } else {
                round2(a.total_sales / grand_total * 100.0)
            },
        })
        .collect()
}

/// Highest share first; equal shares ordered by category name.
pub fn share_ordering(a: &CategoryShare, b: &CategoryShare) -> Ordering {
    b.percentage
        .total_cmp(&a.percentage)
        .then_with(|| a.category.cmp(&b.category))
}

/// Returns the `top_k` largest shares. Asking for more entries than exist
/// returns all of them.
pub fn rank_top_k(shares: &[CategoryShare], top_k: usize) -> Vec<CategoryShare> {
    let mut ranked = shares.to_vec();
    ranked.sort_by(share_ordering);
    ranked.truncate(top_k);

    debug!("Ranked {} categories, kept top {}", shares.len(), ranked.len());
    ranked
}

pub fn share_and_rank(aggregates: &[CategoryAggregate], top_k: usize) -> Vec<CategoryShare> {
    rank_top_k(&compute_shares(aggregates), top_k)
}
