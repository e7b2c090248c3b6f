use crate::error::Result;
use crate::models::{FactTable, PRODUCT_ID, TableKind, USER_ID};
use polars::prelude::*;
use tracing::{info, warn};

/// Joins purchases with products on `product_id`, then with users on
/// `user_id`. Both joins are inner joins: purchases whose product or user is
/// missing do not reach the fact table.
///
/// Only the required columns of each table take part, so extra columns with
/// clashing names never get suffixed.
pub fn build_fact_table(
    purchases: &DataFrame,
    products: &DataFrame,
    users: &DataFrame,
) -> Result<FactTable> {
    let purchases_lf = purchases
        .clone()
        .lazy()
        .select(TableKind::Purchases.required_exprs());
    let products_lf = products
        .clone()
        .lazy()
        .select(TableKind::Products.required_exprs());
    let users_lf = users.clone().lazy().select(TableKind::Users.required_exprs());

    let fact = purchases_lf
        .join(
            products_lf,
            [col(PRODUCT_ID)],
            [col(PRODUCT_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .join(
            users_lf,
            [col(USER_ID)],
            [col(USER_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let orphans = count_orphan_purchases(purchases, products, users)?;
    info!(
        "Joined {} purchases into {} fact rows ({} without a matching product or user)",
        purchases.height(),
        fact.height(),
        orphans
    );
    if fact.height() == 0 {
        warn!("Fact table is empty; every aggregate will be empty");
    }

    Ok(FactTable::new(fact))
}

/// Number of purchases without a matching product or user.
///
/// Semi joins keep each purchase at most once, so duplicate product or user
/// keys do not hide orphans the way comparing fact and purchase heights would.
pub fn count_orphan_purchases(
    purchases: &DataFrame,
    products: &DataFrame,
    users: &DataFrame,
) -> Result<usize> {
    let matched = purchases
        .clone()
        .lazy()
        .select([col(USER_ID), col(PRODUCT_ID)])
        .join(
            products.clone().lazy().select([col(PRODUCT_ID)]),
            [col(PRODUCT_ID)],
            [col(PRODUCT_ID)],
            JoinArgs::new(JoinType::Semi),
        )
        .join(
            users.clone().lazy().select([col(USER_ID)]),
            [col(USER_ID)],
            [col(USER_ID)],
            JoinArgs::new(JoinType::Semi),
        )
        .collect()?;

    Ok(purchases.height() - matched.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orphan_purchases_are_dropped() {
        let users = df!("user_id" => [1i64], "age" => [20i64]).unwrap();
        let products = df!(
            "product_id" => [1i64, 2],
            "category" => ["A", "B"],
            "price" => [10.0f64, 5.0]
        )
        .unwrap();
        let purchases = df!(
            "user_id" => [1i64, 1, 2],
            "product_id" => [1i64, 3, 2],
            "quantity" => [2i64, 1, 4]
        )
        .unwrap();

        let fact = build_fact_table(&purchases, &products, &users).unwrap();

        assert_eq!(fact.height(), 1);
        let row_category = fact.frame().column("category").unwrap().str().unwrap().get(0);
        assert_eq!(row_category, Some("A"));
        let age = fact.frame().column("age").unwrap().i64().unwrap().get(0);
        assert_eq!(age, Some(20));
    }

    #[test]
    fn test_duplicate_product_keys_do_not_hide_orphans() {
        let users = df!("user_id" => [1i64], "age" => [20i64]).unwrap();
        let products = df!(
            "product_id" => [1i64, 1],
            "category" => ["A", "A"],
            "price" => [10.0f64, 10.0]
        )
        .unwrap();
        let purchases = df!(
            "user_id" => [1i64, 1],
            "product_id" => [1i64, 7],
            "quantity" => [1i64, 1]
        )
        .unwrap();

        let fact = build_fact_table(&purchases, &products, &users).unwrap();
        assert_eq!(fact.height(), purchases.height());

        let orphans = count_orphan_purchases(&purchases, &products, &users).unwrap();
        assert_eq!(orphans, 1);
    }

    #[test]
    fn test_orphans_counted_for_missing_users() {
        let users = df!("user_id" => [1i64], "age" => [20i64]).unwrap();
        let products = df!(
            "product_id" => [1i64],
            "category" => ["A"],
            "price" => [1.0f64]
        )
        .unwrap();
        let purchases = df!(
            "user_id" => [1i64, 2, 3],
            "product_id" => [1i64, 1, 1],
            "quantity" => [1i64, 1, 1]
        )
        .unwrap();

        let orphans = count_orphan_purchases(&purchases, &products, &users).unwrap();
        assert_eq!(orphans, 2);
    }

    #[test]
    fn test_extra_columns_do_not_reach_the_fact_table() {
        let users = df!("user_id" => [1i64], "age" => [30i64], "name" => ["ann"]).unwrap();
        let products = df!(
            "product_id" => [1i64],
            "category" => ["A"],
            "price" => [1.5f64],
            "name" => ["widget"]
        )
        .unwrap();
        let purchases = df!(
            "user_id" => [1i64],
            "product_id" => [1i64],
            "quantity" => [3i64],
            "purchase_date" => ["2024-01-01"]
        )
        .unwrap();

        let fact = build_fact_table(&purchases, &products, &users).unwrap();

        let mut names: Vec<String> = fact
            .frame()
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["age", "category", "price", "product_id", "quantity", "user_id"]
        );
    }

    #[test]
    fn test_empty_intersection_yields_empty_fact_table() {
        let users = df!("user_id" => [9i64], "age" => [20i64]).unwrap();
        let products = df!(
            "product_id" => [1i64],
            "category" => ["A"],
            "price" => [1.0f64]
        )
        .unwrap();
        let purchases = df!(
            "user_id" => [1i64],
            "product_id" => [1i64],
            "quantity" => [1i64]
        )
        .unwrap();

        let fact = build_fact_table(&purchases, &products, &users).unwrap();
        assert!(fact.is_empty());
    }
}
