use crate::models::{
    CATEGORY, CategoryAggregate, CategoryShare, PERCENTAGE, PipelineReport, TOTAL_SALES,
};
use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Renders a pipeline report for the console.
pub struct Reporter;

impl Reporter {
    pub fn render(&self, report: &PipelineReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => self.render_tables(report),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    fn render_tables(&self, report: &PipelineReport) -> Result<String> {
        let range = report.age_range;
        let filtered_column = format!("{}_{}_{}", TOTAL_SALES, range.min, range.max);
        let mut out = String::new();

        writeln!(out, "Total sales by category")?;
        writeln!(out, "{}", aggregates_frame(&report.category_sales, TOTAL_SALES)?)?;

        writeln!(out, "\nTotal sales by category, age {}", range)?;
        writeln!(
            out,
            "{}",
            aggregates_frame(&report.category_sales_in_age_range, &filtered_column)?
        )?;

        writeln!(out, "\nShare of spending by category, age {}", range)?;
        writeln!(
            out,
            "{}",
            shares_frame(&report.category_shares, &filtered_column)?
        )?;

        writeln!(
            out,
            "\nTop {} categories by share of spending, age {}",
            report.top_k, range
        )?;
        writeln!(
            out,
            "{}",
            shares_frame(&report.top_categories, &filtered_column)?
        )?;

        Ok(out)
    }
}

fn aggregates_frame(aggregates: &[CategoryAggregate], total_column: &str) -> PolarsResult<DataFrame> {
    let categories: Vec<&str> = aggregates.iter().map(|a| a.category.as_str()).collect();
    let totals: Vec<f64> = aggregates.iter().map(|a| a.total_sales).collect();

    df!(
        CATEGORY => categories,
        total_column => totals
    )
}

fn shares_frame(shares: &[CategoryShare], total_column: &str) -> PolarsResult<DataFrame> {
    let categories: Vec<&str> = shares.iter().map(|s| s.category.as_str()).collect();
    let totals: Vec<f64> = shares.iter().map(|s| s.total_sales).collect();
    let percentages: Vec<f64> = shares.iter().map(|s| s.percentage).collect();

    df!(
        CATEGORY => categories,
        total_column => totals,
        PERCENTAGE => percentages
    )
}
