//! Input table resolution and CSV loading

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::{ReportError, Result};
use crate::models::{CategoryName, Order, OrderCsv, OrderItem, Product, Review};

/// File paths of the input tables, as supplied by configuration
#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    pub orders: Option<PathBuf>,
    pub order_items: Option<PathBuf>,
    pub products: Option<PathBuf>,
    pub product_category: Option<PathBuf>,
    pub order_reviews: Option<PathBuf>,
}

/// Input paths verified to exist on disk
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub orders: PathBuf,
    pub order_items: PathBuf,
    pub products: PathBuf,
    pub product_category: PathBuf,
    pub order_reviews: PathBuf,
}

impl InputPaths {
    /// Check every required input, reporting all unset or missing files at once.
    pub fn resolve(&self) -> Result<ResolvedPaths> {
        let mut missing = Vec::new();
        let mut require = |name: &str, path: &Option<PathBuf>| match path {
            Some(p) if p.is_file() => Some(p.clone()),
            _ => {
                missing.push(name.to_string());
                None
            }
        };

        let orders = require("orders", &self.orders);
        let order_items = require("order_items", &self.order_items);
        let products = require("products", &self.products);
        let product_category = require("product_category", &self.product_category);
        let order_reviews = require("order_reviews", &self.order_reviews);

        match (orders, order_items, products, product_category, order_reviews) {
            (
                Some(orders),
                Some(order_items),
                Some(products),
                Some(product_category),
                Some(order_reviews),
            ) => Ok(ResolvedPaths {
                orders,
                order_items,
                products,
                product_category,
                order_reviews,
            }),
            _ => Err(ReportError::MissingInputs(missing)),
        }
    }
}

/// All raw tables consumed by the pipeline
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub products: Vec<Product>,
    pub category_names: Vec<CategoryName>,
    pub reviews: Vec<Review>,
}

pub fn load_tables(paths: &InputPaths) -> Result<Tables> {
    let resolved = paths.resolve()?;

    let raw_orders: Vec<OrderCsv> = load_table("orders", &resolved.orders)?;
    let total = raw_orders.len();
    let orders: Vec<Order> = raw_orders.iter().filter_map(OrderCsv::to_order).collect();
    if orders.len() < total {
        warn!(
            "Skipped {} orders with unparseable purchase timestamps",
            total - orders.len()
        );
    }

    let tables = Tables {
        orders,
        order_items: load_table("order_items", &resolved.order_items)?,
        products: load_table("products", &resolved.products)?,
        category_names: load_table("product_category", &resolved.product_category)?,
        reviews: load_table("order_reviews", &resolved.order_reviews)?,
    };

    info!(
        "Loaded {} orders, {} order items, {} products, {} category names, {} reviews",
        tables.orders.len(),
        tables.order_items.len(),
        tables.products.len(),
        tables.category_names.len(),
        tables.reviews.len()
    );

    Ok(tables)
}

/// Read a headed CSV file into typed records.
///
/// Malformed rows are skipped and counted; an unreadable file is an error.
pub fn load_table<T: DeserializeOwned>(table: &'static str, path: &Path) -> Result<Vec<T>> {
    let load_err = |source| ReportError::Load {
        table,
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(load_err)?;

    let mut records = Vec::new();
    let mut error_count = 0;
    for (i, result) in reader.deserialize().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                if error_count < 5 {
                    warn!("Failed to parse {} record {}: {}", table, i, e);
                }
                error_count += 1;
            }
        }
    }

    if error_count > 0 {
        warn!("Skipped {} malformed {} records", error_count, table);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_lists_every_missing_input() {
        let present = NamedTempFile::new().unwrap();
        let paths = InputPaths {
            orders: Some(present.path().to_path_buf()),
            order_items: None,
            products: Some(PathBuf::from("/definitely/not/here.csv")),
            product_category: Some(present.path().to_path_buf()),
            order_reviews: None,
        };

        match paths.resolve() {
            Err(ReportError::MissingInputs(missing)) => {
                assert_eq!(missing, vec!["order_items", "products", "order_reviews"]);
            }
            other => panic!("expected MissingInputs, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_inputs_message_is_aggregated() {
        let err = InputPaths::default().resolve().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required files: orders, order_items, products, product_category, order_reviews"
        );
    }

    #[test]
    fn test_load_table_skips_malformed_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "order_id,order_item_id,product_id,seller_id,price").unwrap();
        writeln!(file, "o1,1,p1,s1,10.5").unwrap();
        writeln!(file, "o2,1,p2,s1,not-a-price").unwrap();
        writeln!(file, "o3,1,p3,s2,7").unwrap();

        let items: Vec<OrderItem> = load_table("order_items", file.path()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].order_id, "o1");
        assert_eq!(items[1].price, 7.0);
    }

    #[test]
    fn test_empty_optional_fields_are_none() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "product_id,product_category_name,product_weight_g").unwrap();
        writeln!(file, "p1,,300").unwrap();
        writeln!(file, "p2,beleza_saude,120").unwrap();

        let products: Vec<Product> = load_table("products", file.path()).unwrap();
        assert_eq!(products[0].product_category_name, None);
        assert_eq!(products[1].product_category_name.as_deref(), Some("beleza_saude"));
    }
}
