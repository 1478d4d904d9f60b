//! Paired (this week, last week) views built from the raw tables
//!
//! Every join is an inner join: a row whose key has no match on the other
//! side is dropped, never zero-filled. Inputs are borrowed and never mutated,
//! so the same source table can feed several views.

use std::collections::HashMap;

use crate::category_names::format_category;
use crate::loader::Tables;
use crate::models::{
    CategoryName, Order, OpsRow, OrderItem, Period, Product, ProductRow, ReportWindow, Review,
    RevenueRow,
};

/// A view computed once for each compared period
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPair<T> {
    pub this_week: Vec<T>,
    pub last_week: Vec<T>,
}

impl<T> Default for WeekPair<T> {
    fn default() -> Self {
        Self {
            this_week: Vec::new(),
            last_week: Vec::new(),
        }
    }
}

impl<T> WeekPair<T> {
    /// Apply the same transformation to both weeks.
    pub fn map<U>(&self, f: impl Fn(&[T]) -> Vec<U>) -> WeekPair<U> {
        WeekPair {
            this_week: f(&self.this_week),
            last_week: f(&self.last_week),
        }
    }
}

/// The three layered views consumed by the KPI calculators
#[derive(Debug, Clone)]
pub struct Views {
    pub orders: WeekPair<Order>,
    pub revenue: WeekPair<RevenueRow>,
    pub products: WeekPair<ProductRow>,
    pub operations: WeekPair<OpsRow>,
}

pub fn build_views(tables: &Tables, window: &ReportWindow) -> Views {
    let orders = split_orders(&tables.orders, window);
    let revenue = orders.map(|week| revenue_view(week, &tables.order_items));
    let products =
        revenue.map(|week| product_view(week, &tables.products, &tables.category_names));
    let operations = revenue.map(|week| operations_view(week, &tables.reviews));

    Views {
        orders,
        revenue,
        products,
        operations,
    }
}

/// Orders purchased within each period; orders outside both are dropped.
pub fn split_orders(orders: &[Order], window: &ReportWindow) -> WeekPair<Order> {
    WeekPair {
        this_week: orders_in(orders, &window.this_week),
        last_week: orders_in(orders, &window.last_week),
    }
}

fn orders_in(orders: &[Order], period: &Period) -> Vec<Order> {
    orders
        .iter()
        .filter(|o| period.contains(&o.purchased_at))
        .cloned()
        .collect()
}

/// Join orders with their line items, one row per item.
pub fn revenue_view(orders: &[Order], items: &[OrderItem]) -> Vec<RevenueRow> {
    let items_by_order = index_by(items, |i| i.order_id.as_str());

    orders
        .iter()
        .flat_map(|order| {
            items_by_order
                .get(order.order_id.as_str())
                .into_iter()
                .flatten()
                .map(move |item| RevenueRow {
                    order_id: order.order_id.clone(),
                    status: order.status.clone(),
                    purchased_at: order.purchased_at,
                    delivered_at: order.delivered_at,
                    product_id: item.product_id.clone(),
                    price: item.price,
                })
        })
        .collect()
}

/// Join revenue rows with products and the category translation table.
///
/// Products without a category key never match a translation row and are
/// dropped. A translation row without an English name yields `category: None`.
pub fn product_view(
    revenue: &[RevenueRow],
    products: &[Product],
    category_names: &[CategoryName],
) -> Vec<ProductRow> {
    let products_by_id = index_by(products, |p| p.product_id.as_str());
    let names_by_key = index_by(category_names, |c| c.product_category_name.as_str());

    let mut rows = Vec::new();
    for row in revenue {
        let Some(matches) = products_by_id.get(row.product_id.as_str()) else {
            continue;
        };
        for product in matches {
            let Some(key) = product.product_category_name.as_deref() else {
                continue;
            };
            for name in names_by_key.get(key).into_iter().flatten() {
                rows.push(ProductRow {
                    purchased_at: row.purchased_at,
                    price: row.price,
                    category: format_category(name.product_category_name_english.as_deref()),
                });
            }
        }
    }
    rows
}

/// Join revenue rows with order reviews.
pub fn operations_view(revenue: &[RevenueRow], reviews: &[Review]) -> Vec<OpsRow> {
    let reviews_by_order = index_by(reviews, |r| r.order_id.as_str());

    revenue
        .iter()
        .flat_map(|row| {
            reviews_by_order
                .get(row.order_id.as_str())
                .into_iter()
                .flatten()
                .map(move |review| OpsRow {
                    status: row.status.clone(),
                    purchased_at: row.purchased_at,
                    delivered_at: row.delivered_at,
                    review_score: review.review_score,
                })
        })
        .collect()
}

/// Group rows by key, preserving input order within each group.
fn index_by<'a, T>(rows: &'a [T], key: impl Fn(&'a T) -> &'a str) -> HashMap<&'a str, Vec<&'a T>> {
    let mut index: HashMap<&str, Vec<&T>> = HashMap::new();
    for row in rows {
        index.entry(key(row)).or_default().push(row);
    }
    index
}
