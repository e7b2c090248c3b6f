use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const USER_ID: &str = "user_id";
pub const PRODUCT_ID: &str = "product_id";
pub const AGE: &str = "age";
pub const CATEGORY: &str = "category";
pub const PRICE: &str = "price";
pub const QUANTITY: &str = "quantity";
pub const TOTAL_SALES: &str = "total_sales";
pub const PERCENTAGE: &str = "percentage";

/// The semantic type a required column is coerced to before cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    Integer,
    Decimal,
    Text,
}

impl SemanticType {
    pub fn target_dtype(&self) -> DataType {
        match self {
            SemanticType::Integer => DataType::Int64,
            SemanticType::Decimal => DataType::Float64,
            SemanticType::Text => DataType::String,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SemanticType::Integer => "integer",
            SemanticType::Decimal => "decimal",
            SemanticType::Text => "string",
        }
    }

    /// Whether a column of `dtype` can be cast to this type at all.
    /// Individual values that fail the cast become null.
    pub fn accepts(&self, dtype: &DataType) -> bool {
        let numeric_or_text = dtype.is_integer()
            || dtype.is_float()
            || matches!(dtype, DataType::String | DataType::Null);
        match self {
            SemanticType::Integer | SemanticType::Decimal => numeric_or_text,
            SemanticType::Text => numeric_or_text || matches!(dtype, DataType::Boolean),
        }
    }

    /// Cast expression for column `name` whose current dtype is `source`.
    ///
    /// Floats with a fractional part are not integers; they become null
    /// instead of being truncated.
    pub fn coerce_expr(&self, name: &str, source: &DataType) -> Expr {
        let target = self.target_dtype();
        match self {
            SemanticType::Integer if source.is_float() => {
                let value = col(name);
                when((value.clone() % lit(1.0)).eq(lit(0.0)))
                    .then(value)
                    .otherwise(lit(NULL))
                    .cast(target)
                    .alias(name)
            }
            _ => col(name).cast(target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredColumn {
    pub name: &'static str,
    pub semantic: SemanticType,
}

const fn required(name: &'static str, semantic: SemanticType) -> RequiredColumn {
    RequiredColumn { name, semantic }
}

const USER_COLUMNS: [RequiredColumn; 2] = [
    required(USER_ID, SemanticType::Integer),
    required(AGE, SemanticType::Integer),
];

const PRODUCT_COLUMNS: [RequiredColumn; 3] = [
    required(PRODUCT_ID, SemanticType::Integer),
    required(CATEGORY, SemanticType::Text),
    required(PRICE, SemanticType::Decimal),
];

const PURCHASE_COLUMNS: [RequiredColumn; 3] = [
    required(USER_ID, SemanticType::Integer),
    required(PRODUCT_ID, SemanticType::Integer),
    required(QUANTITY, SemanticType::Integer),
];

/// One of the three source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Users,
    Products,
    Purchases,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Users, TableKind::Products, TableKind::Purchases];

    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Users => "users",
            TableKind::Products => "products",
            TableKind::Purchases => "purchases",
        }
    }

    pub fn required_columns(&self) -> &'static [RequiredColumn] {
        match self {
            TableKind::Users => &USER_COLUMNS,
            TableKind::Products => &PRODUCT_COLUMNS,
            TableKind::Purchases => &PURCHASE_COLUMNS,
        }
    }

    /// Column expected to be unique within the table, if any.
    pub fn key_column(&self) -> Option<&'static str> {
        match self {
            TableKind::Users => Some(USER_ID),
            TableKind::Products => Some(PRODUCT_ID),
            TableKind::Purchases => None,
        }
    }

    pub fn required_exprs(&self) -> Vec<Expr> {
        self.required_columns().iter().map(|c| col(c.name)).collect()
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three loaded source tables, as handed over by a loader.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub users: DataFrame,
    pub products: DataFrame,
    pub purchases: DataFrame,
}

impl SourceTables {
    pub fn get(&self, kind: TableKind) -> &DataFrame {
        match kind {
            TableKind::Users => &self.users,
            TableKind::Products => &self.products,
            TableKind::Purchases => &self.purchases,
        }
    }
}

/// Denormalized purchases joined with their product and user.
///
/// Columns: user_id, product_id, quantity, category, price, age.
#[derive(Debug, Clone)]
pub struct FactTable(DataFrame);

impl FactTable {
    pub(crate) fn new(df: DataFrame) -> Self {
        FactTable(df)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.0
    }

    pub fn height(&self) -> usize {
        self.0.height()
    }

    pub fn is_empty(&self) -> bool {
        self.0.height() == 0
    }
}

/// Inclusive age bounds used to restrict the fact table before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: i64,
    pub max: i64,
}

impl AgeRange {
    pub fn new(min: i64, max: i64) -> Self {
        AgeRange { min, max }
    }

    pub fn contains(&self, age: i64) -> bool {
        (self.min..=self.max).contains(&age)
    }

    pub fn predicate(&self) -> Expr {
        col(AGE)
            .gt_eq(lit(self.min))
            .and(col(AGE).lt_eq(lit(self.max)))
    }
}

impl Default for AgeRange {
    fn default() -> Self {
        AgeRange { min: 18, max: 25 }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category: String,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub total_sales: f64,
    pub percentage: f64,
}

/// The four result sets of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub age_range: AgeRange,
    pub top_k: usize,
    pub category_sales: Vec<CategoryAggregate>,
    pub category_sales_in_age_range: Vec<CategoryAggregate>,
    pub category_shares: Vec<CategoryShare>,
    pub top_categories: Vec<CategoryShare>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns_per_table() {
        let names = |kind: TableKind| -> Vec<&str> {
            kind.required_columns().iter().map(|c| c.name).collect()
        };

        assert_eq!(names(TableKind::Users), vec!["user_id", "age"]);
        assert_eq!(names(TableKind::Products), vec!["product_id", "category", "price"]);
        assert_eq!(names(TableKind::Purchases), vec!["user_id", "product_id", "quantity"]);
    }

    #[test]
    fn test_age_range_is_inclusive() {
        let range = AgeRange::default();
        assert!(range.contains(18));
        assert!(range.contains(25));
        assert!(!range.contains(17));
        assert!(!range.contains(26));
        assert_eq!(range.to_string(), "18-25");
    }

    #[test]
    fn test_semantic_type_rejects_nested_columns() {
        let list = DataType::List(Box::new(DataType::Int64));
        assert!(!SemanticType::Decimal.accepts(&list));
        assert!(SemanticType::Decimal.accepts(&DataType::String));
        assert!(SemanticType::Integer.accepts(&DataType::Float64));
        assert!(SemanticType::Text.accepts(&DataType::Null));
    }

    #[test]
    fn test_booleans_are_only_text() {
        assert!(!SemanticType::Integer.accepts(&DataType::Boolean));
        assert!(!SemanticType::Decimal.accepts(&DataType::Boolean));
        assert!(SemanticType::Text.accepts(&DataType::Boolean));
    }
}
