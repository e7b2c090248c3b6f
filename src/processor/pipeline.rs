use crate::error::Result;
use crate::models::{AgeRange, PipelineReport, SourceTables, TableKind};
use crate::processor::aggregator::aggregate_by_category;
use crate::processor::cleaner::{CleaningScope, clean};
use crate::processor::joiner::build_fact_table;
use crate::processor::ranker::{compute_shares, rank_top_k};
use crate::processor::schema_validator::{coerce_types, validate_columns};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub age_range: AgeRange,
    pub top_k: usize,
    pub cleaning_scope: CleaningScope,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            age_range: AgeRange::default(),
            top_k: 3,
            cleaning_scope: CleaningScope::default(),
        }
    }
}

/// Category sales analysis over users, products and purchases.
///
/// `run` is a pure function of its inputs: the source tables are only read,
/// and running it twice yields equal reports.
pub struct SalesPipeline {
    settings: PipelineSettings,
}

impl SalesPipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        SalesPipeline { settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn run(&self, sources: &SourceTables) -> Result<PipelineReport> {
        let settings = &self.settings;

        // All three tables are checked before any of them is transformed.
        for kind in TableKind::ALL {
            validate_columns(kind, sources.get(kind))?;
        }
        info!("Validated required columns of all source tables");

        let scope = settings.cleaning_scope;
        let users = clean(
            TableKind::Users,
            &coerce_types(TableKind::Users, &sources.users)?,
            scope,
        )?;
        let products = clean(
            TableKind::Products,
            &coerce_types(TableKind::Products, &sources.products)?,
            scope,
        )?;
        let purchases = clean(
            TableKind::Purchases,
            &coerce_types(TableKind::Purchases, &sources.purchases)?,
            scope,
        )?;

        let fact = build_fact_table(&purchases, &products, &users)?;

        let category_sales = aggregate_by_category(&fact, None)?;
        info!("Computed total sales for {} categories", category_sales.len());

        let category_sales_in_age_range =
            aggregate_by_category(&fact, Some(settings.age_range.predicate()))?;
        info!(
            "Computed total sales for {} categories in age range {}",
            category_sales_in_age_range.len(),
            settings.age_range
        );

        let category_shares = compute_shares(&category_sales_in_age_range);
        let top_categories = rank_top_k(&category_shares, settings.top_k);
        info!(
            "Selected top {} of {} categories by share of spending",
            top_categories.len(),
            category_shares.len()
        );

        Ok(PipelineReport {
            age_range: settings.age_range,
            top_k: settings.top_k,
            category_sales,
            category_sales_in_age_range,
            category_shares,
            top_categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::models::{CategoryAggregate, CategoryShare};
    use polars::prelude::*;

    fn sample_sources() -> SourceTables {
        SourceTables {
            users: df!("user_id" => [1i64], "age" => [20i64]).unwrap(),
            products: df!(
                "product_id" => [1i64, 2],
                "category" => ["A", "B"],
                "price" => [10.0f64, 5.0]
            )
            .unwrap(),
            purchases: df!(
                "user_id" => [1i64, 1],
                "product_id" => [1i64, 2],
                "quantity" => [2i64, 1]
            )
            .unwrap(),
        }
    }

    #[test]
    fn test_reference_example() {
        let report = SalesPipeline::new(PipelineSettings::default())
            .run(&sample_sources())
            .unwrap();

        let expected_totals = vec![
            CategoryAggregate { category: "A".into(), total_sales: 20.0 },
            CategoryAggregate { category: "B".into(), total_sales: 5.0 },
        ];
        let expected_shares = vec![
            CategoryShare { category: "A".into(), total_sales: 20.0, percentage: 80.0 },
            CategoryShare { category: "B".into(), total_sales: 5.0, percentage: 20.0 },
        ];

        assert_eq!(report.category_sales, expected_totals);
        assert_eq!(report.category_sales_in_age_range, expected_totals);
        assert_eq!(report.category_shares, expected_shares);
        assert_eq!(report.top_categories, expected_shares);
    }

    #[test]
    fn test_missing_column_aborts_before_cleaning() {
        let mut sources = sample_sources();
        sources.purchases = df!("user_id" => [1i64], "product_id" => [1i64]).unwrap();

        let err = SalesPipeline::new(PipelineSettings::default())
            .run(&sources)
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::MissingColumn { table: TableKind::Purchases, column: "quantity" }
        ));
    }

    #[test]
    fn test_nobody_in_age_range() {
        let mut sources = sample_sources();
        sources.users = df!("user_id" => [1i64], "age" => [40i64]).unwrap();

        let report = SalesPipeline::new(PipelineSettings::default())
            .run(&sources)
            .unwrap();

        assert_eq!(report.category_sales.len(), 2);
        assert!(report.category_sales_in_age_range.is_empty());
        assert!(report.category_shares.is_empty());
        assert!(report.top_categories.is_empty());
    }

    #[test]
    fn test_sources_are_not_modified() {
        let sources = sample_sources();
        let before = sources.clone();

        SalesPipeline::new(PipelineSettings::default())
            .run(&sources)
            .unwrap();

        assert!(sources.users.equals(&before.users));
        assert!(sources.products.equals(&before.products));
        assert!(sources.purchases.equals(&before.purchases));
    }
}
