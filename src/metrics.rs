//! KPI calculators over the paired weekly views
//!
//! Empty-set policy: sums are 0, counts are 0, means are `None` ("no data").

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Datelike;
use serde::Serialize;

use crate::comparison::{percent_change, rating_change, Change, Comparison, Polarity, RatingComparison};
use crate::joiner::{Views, WeekPair};
use crate::models::{OpsRow, ProductRow, RevenueRow};

/// Delivery times at or above this many days are treated as outliers
pub const DELIVERY_OUTLIER_DAYS: f64 = 50.0;

pub const DEFAULT_TOP_CATEGORIES: usize = 3;

const DAY_ABBREVIATIONS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Sum of line-item prices
pub fn total_revenue(revenue: &WeekPair<RevenueRow>) -> Comparison {
    let sum = |rows: &[RevenueRow]| rows.iter().map(|r| r.price).sum::<f64>();
    Comparison::of_totals(sum(&revenue.this_week), sum(&revenue.last_week))
}

/// Number of line items (not distinct orders)
pub fn order_count(revenue: &WeekPair<RevenueRow>) -> Comparison {
    Comparison::of_totals(
        revenue.this_week.len() as f64,
        revenue.last_week.len() as f64,
    )
}

/// Mean line-item price
pub fn average_order_value(revenue: &WeekPair<RevenueRow>) -> Comparison {
    let aov = |rows: &[RevenueRow]| mean(rows.iter().map(|r| r.price));
    Comparison::between(
        aov(&revenue.this_week),
        aov(&revenue.last_week),
        Polarity::HigherIsBetter,
    )
}

/// Mean days from purchase to customer delivery over delivered rows,
/// excluding outliers of [`DELIVERY_OUTLIER_DAYS`] or more.
pub fn mean_delivery_days(rows: &[OpsRow]) -> Option<f64> {
    mean(
        rows.iter()
            .filter(|r| r.status == "delivered")
            .filter_map(|r| {
                let delivered = r.delivered_at?;
                Some((delivered - r.purchased_at).num_seconds() as f64 / 86_400.0)
            })
            .filter(|days| *days < DELIVERY_OUTLIER_DAYS),
    )
}

/// Delivery time comparison; a decrease is an improvement
pub fn average_delivery_time(operations: &WeekPair<OpsRow>) -> Comparison {
    Comparison::between(
        mean_delivery_days(&operations.this_week),
        mean_delivery_days(&operations.last_week),
        Polarity::LowerIsBetter,
    )
}

pub fn mean_rating(rows: &[OpsRow]) -> Option<f64> {
    mean(rows.iter().filter_map(|r| r.review_score))
}

pub fn average_order_rating(operations: &WeekPair<OpsRow>) -> RatingComparison {
    rating_change(
        mean_rating(&operations.this_week),
        mean_rating(&operations.last_week),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMetrics {
    pub name: String,
    pub sales: f64,
    /// Rows in the category this week divided by 7, rounded up
    pub daily_rate: u64,
    pub previous_sales: f64,
    #[serde(flatten)]
    pub change: Change,
}

/// Top categories by this week's revenue, highest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryRanking {
    pub categories: Vec<CategoryMetrics>,
}

impl CategoryRanking {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn top(&self) -> Option<&CategoryMetrics> {
        self.categories.first()
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn sales(&self) -> Vec<f64> {
        self.categories.iter().map(|c| c.sales).collect()
    }

    pub fn daily_rates(&self) -> Vec<u64> {
        self.categories.iter().map(|c| c.daily_rate).collect()
    }

    pub fn previous_sales(&self) -> Vec<f64> {
        self.categories.iter().map(|c| c.previous_sales).collect()
    }
}

/// Rank categories by summed price this week.
///
/// Ties are broken alphabetically by category name. Rows without a
/// category are not ranked.
pub fn top_categories(products: &WeekPair<ProductRow>, max_categories: usize) -> CategoryRanking {
    let this_week = category_totals(&products.this_week);
    let last_week = category_totals(&products.last_week);

    let mut ranked: Vec<(&str, &CategoryTotal)> =
        this_week.iter().map(|(name, total)| (*name, total)).collect();
    ranked.sort_by(|a, b| b.1.sales.total_cmp(&a.1.sales).then_with(|| a.0.cmp(b.0)));

    let categories = ranked
        .into_iter()
        .take(max_categories)
        .map(|(name, total)| {
            let previous_sales = last_week.get(name).map_or(0.0, |t| t.sales);
            CategoryMetrics {
                name: name.to_string(),
                sales: total.sales,
                daily_rate: total.rows.div_ceil(7),
                previous_sales,
                change: percent_change(total.sales, previous_sales, Polarity::HigherIsBetter),
            }
        })
        .collect();

    CategoryRanking { categories }
}

#[derive(Debug, Default)]
struct CategoryTotal {
    sales: f64,
    rows: u64,
}

fn category_totals(rows: &[ProductRow]) -> HashMap<&str, CategoryTotal> {
    let mut totals: HashMap<&str, CategoryTotal> = HashMap::new();
    for row in rows {
        if let Some(category) = row.category.as_deref() {
            let total = totals.entry(category).or_default();
            total.sales += row.price;
            total.rows += 1;
        }
    }
    totals
}

/// Revenue and distinct orders per weekday, Monday first.
///
/// Only weekdays present in the data appear; there is no zero-fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesTrend {
    pub days: Vec<String>,
    pub revenue: Vec<f64>,
    pub orders: Vec<usize>,
}

impl SalesTrend {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Index of the highest-revenue day; the earliest wins ties.
    pub fn peak_day(&self) -> Option<usize> {
        self.revenue
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            })
            .map(|(i, _)| i)
    }
}

pub fn sales_trend(revenue: &[RevenueRow]) -> SalesTrend {
    let mut by_day: BTreeMap<u32, (f64, HashSet<&str>)> = BTreeMap::new();
    for row in revenue {
        let day = row.purchased_at.weekday().num_days_from_monday();
        let entry = by_day.entry(day).or_default();
        entry.0 += row.price;
        entry.1.insert(row.order_id.as_str());
    }

    let mut trend = SalesTrend::default();
    for (day, (revenue, orders)) in by_day {
        trend.days.push(DAY_ABBREVIATIONS[day as usize].to_string());
        trend.revenue.push(revenue);
        trend.orders.push(orders.len());
    }
    trend
}

/// Every KPI for one report run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub revenue: Comparison,
    pub orders: Comparison,
    pub average_order_value: Comparison,
    pub delivery_time: Comparison,
    pub rating: RatingComparison,
    pub categories: CategoryRanking,
    pub sales_trend: SalesTrend,
}

impl KpiSummary {
    pub fn compute(views: &Views, max_categories: usize) -> Self {
        Self {
            revenue: total_revenue(&views.revenue),
            orders: order_count(&views.revenue),
            average_order_value: average_order_value(&views.revenue),
            delivery_time: average_delivery_time(&views.operations),
            rating: average_order_rating(&views.operations),
            categories: top_categories(&views.products, max_categories),
            sales_trend: sales_trend(&views.revenue.this_week),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::{Sign, Trend};
    use crate::models::parse_timestamp;

    fn revenue_row(order_id: &str, ts: &str, price: f64) -> RevenueRow {
        RevenueRow {
            order_id: order_id.to_string(),
            status: "delivered".to_string(),
            purchased_at: parse_timestamp(ts).unwrap(),
            delivered_at: None,
            product_id: "p".to_string(),
            price,
        }
    }

    fn product_row(category: Option<&str>, price: f64) -> ProductRow {
        ProductRow {
            purchased_at: parse_timestamp("2017-05-01 10:00:00").unwrap(),
            price,
            category: category.map(str::to_string),
        }
    }

    fn ops_row(status: &str, purchased: &str, delivered: Option<&str>, score: Option<f64>) -> OpsRow {
        OpsRow {
            status: status.to_string(),
            purchased_at: parse_timestamp(purchased).unwrap(),
            delivered_at: delivered.and_then(parse_timestamp),
            review_score: score,
        }
    }

    #[test]
    fn test_revenue_orders_and_aov() {
        let revenue = WeekPair {
            this_week: vec![
                revenue_row("a", "2017-05-01 10:00:00", 60.0),
                revenue_row("a", "2017-05-01 10:00:00", 50.0),
            ],
            last_week: vec![revenue_row("b", "2017-04-25 10:00:00", 100.0)],
        };

        let total = total_revenue(&revenue);
        assert_eq!(total.current, Some(110.0));
        assert_eq!(total.change.percent_change, 10.0);
        assert_eq!(total.change.sign, Sign::Plus);

        let orders = order_count(&revenue);
        assert_eq!(orders.current, Some(2.0));
        assert_eq!(orders.change.percent_change, 100.0);

        let aov = average_order_value(&revenue);
        assert_eq!(aov.current, Some(55.0));
        assert_eq!(aov.change.trend, Trend::Negative);
        assert_eq!(aov.change.percent_change, 45.0);
    }

    #[test]
    fn test_empty_week_policy() {
        let revenue = WeekPair {
            this_week: Vec::new(),
            last_week: vec![revenue_row("b", "2017-04-25 10:00:00", 100.0)],
        };
        assert_eq!(total_revenue(&revenue).current, Some(0.0));
        assert_eq!(order_count(&revenue).current, Some(0.0));

        let aov = average_order_value(&revenue);
        assert_eq!(aov.current, None);
        assert_eq!(aov.previous, Some(100.0));
        assert!(aov.change.is_neutral());
    }

    #[test]
    fn test_delivery_outlier_boundary() {
        let rows = vec![
            ops_row("delivered", "2017-05-01 00:00:00", Some("2017-06-20 00:00:00"), None),
            ops_row("delivered", "2017-05-01 00:00:00", Some("2017-05-03 12:00:00"), None),
        ];
        // exactly 50 days is excluded
        assert_eq!(mean_delivery_days(&rows), Some(2.5));

        let just_under = vec![ops_row(
            "delivered",
            "2017-05-01 00:00:00",
            Some("2017-06-19 23:59:59"),
            None,
        )];
        let days = mean_delivery_days(&just_under).unwrap();
        assert!(days < 50.0 && days > 49.99);
    }

    #[test]
    fn test_delivery_ignores_undelivered_rows() {
        let rows = vec![
            ops_row("shipped", "2017-05-01 00:00:00", Some("2017-05-02 00:00:00"), None),
            ops_row("delivered", "2017-05-01 00:00:00", None, None),
        ];
        assert_eq!(mean_delivery_days(&rows), None);
    }

    #[test]
    fn test_faster_delivery_is_positive() {
        let operations = WeekPair {
            this_week: vec![ops_row("delivered", "2017-05-01 00:00:00", Some("2017-05-04 00:00:00"), None)],
            last_week: vec![ops_row("delivered", "2017-04-24 00:00:00", Some("2017-04-28 00:00:00"), None)],
        };
        let cmp = average_delivery_time(&operations);
        assert_eq!(cmp.current, Some(3.0));
        assert_eq!(cmp.previous, Some(4.0));
        assert_eq!(cmp.change.percent_change, 25.0);
        assert_eq!(cmp.change.sign, Sign::Plus);
        assert_eq!(cmp.change.trend, Trend::Positive);
    }

    #[test]
    fn test_rating_uses_difference() {
        let operations = WeekPair {
            this_week: vec![
                ops_row("delivered", "2017-05-01 00:00:00", None, Some(5.0)),
                ops_row("delivered", "2017-05-01 00:00:00", None, Some(4.0)),
                ops_row("delivered", "2017-05-01 00:00:00", None, None),
            ],
            last_week: vec![ops_row("delivered", "2017-04-24 00:00:00", None, Some(4.0))],
        };
        let cmp = average_order_rating(&operations);
        assert_eq!(cmp.current, Some(4.5));
        assert_eq!(cmp.difference, 0.5);
        assert_eq!(cmp.trend, Trend::Positive);
    }

    #[test]
    fn test_top_categories_sorted_and_truncated() {
        let products = WeekPair {
            this_week: vec![
                product_row(Some("Toys"), 10.0),
                product_row(Some("Garden"), 40.0),
                product_row(Some("Toys"), 25.0),
                product_row(Some("Books"), 5.0),
                product_row(None, 1000.0),
            ],
            last_week: vec![product_row(Some("Garden"), 50.0)],
        };

        let ranking = top_categories(&products, 2);
        assert_eq!(ranking.names(), vec!["Garden", "Toys"]);
        assert_eq!(ranking.sales(), vec![40.0, 35.0]);
        assert_eq!(ranking.daily_rates(), vec![1, 1]);
        assert_eq!(ranking.previous_sales(), vec![50.0, 0.0]);

        let garden = &ranking.categories[0].change;
        assert_eq!(garden.percent_change, 20.0);
        assert_eq!(garden.trend, Trend::Negative);

        // no prior sales: zero-baseline guard makes it neutral
        assert!(ranking.categories[1].change.is_neutral());

        let all = top_categories(&products, 10);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_top_categories_tie_break_alphabetical() {
        let products = WeekPair {
            this_week: vec![
                product_row(Some("Zeta"), 10.0),
                product_row(Some("Alpha"), 10.0),
                product_row(Some("Mid"), 10.0),
            ],
            last_week: Vec::new(),
        };
        let ranking = top_categories(&products, 3);
        assert_eq!(ranking.names(), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_daily_rate_rounds_up() {
        let rows: Vec<ProductRow> = (0..8).map(|_| product_row(Some("Toys"), 1.0)).collect();
        let products = WeekPair { this_week: rows, last_week: Vec::new() };
        assert_eq!(top_categories(&products, 1).daily_rates(), vec![2]);
    }

    #[test]
    fn test_sales_trend_by_weekday_without_zero_fill() {
        let rows = vec![
            revenue_row("c", "2017-05-07 09:00:00", 5.0),
            revenue_row("a", "2017-05-01 09:00:00", 10.0),
            revenue_row("a", "2017-05-01 09:00:00", 15.0),
            revenue_row("b", "2017-05-01 18:00:00", 20.0),
            revenue_row("d", "2017-05-03 12:00:00", 7.5),
        ];
        let trend = sales_trend(&rows);
        assert_eq!(trend.days, vec!["Mon", "Wed", "Sun"]);
        assert_eq!(trend.revenue, vec![45.0, 7.5, 5.0]);
        assert_eq!(trend.orders, vec![2, 1, 1]);
        assert_eq!(trend.peak_day(), Some(0));
    }

    #[test]
    fn test_peak_day_prefers_earliest_on_tie() {
        let trend = SalesTrend {
            days: vec!["Tue".into(), "Thu".into()],
            revenue: vec![10.0, 10.0],
            orders: vec![1, 1],
        };
        assert_eq!(trend.peak_day(), Some(0));
        assert_eq!(SalesTrend::default().peak_day(), None);
    }
}
