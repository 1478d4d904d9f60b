use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw order record from the orders CSV
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCsv {
    pub order_id: String,
    pub order_status: String,
    pub order_purchase_timestamp: String,
    pub order_delivered_customer_date: Option<String>,
}

/// Order with parsed timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub status: String,
    pub purchased_at: NaiveDateTime,
    pub delivered_at: Option<NaiveDateTime>,
}

impl OrderCsv {
    /// Returns `None` when the purchase timestamp cannot be parsed.
    pub fn to_order(&self) -> Option<Order> {
        let purchased_at = parse_timestamp(&self.order_purchase_timestamp)?;
        let delivered_at = self
            .order_delivered_customer_date
            .as_deref()
            .and_then(parse_timestamp);

        Some(Order {
            order_id: self.order_id.clone(),
            status: self.order_status.clone(),
            purchased_at,
            delivered_at,
        })
    }
}

/// Line item from the order items CSV
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    pub order_id: String,
    pub product_id: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_category_name: Option<String>,
}

/// Category translation row (source-language key to English name)
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryName {
    pub product_category_name: String,
    pub product_category_name_english: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub order_id: String,
    pub review_score: Option<f64>,
}

/// Order joined with one of its line items
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueRow {
    pub order_id: String,
    pub status: String,
    pub purchased_at: NaiveDateTime,
    pub delivered_at: Option<NaiveDateTime>,
    pub product_id: String,
    pub price: f64,
}

/// Line item joined with its product category display name
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub purchased_at: NaiveDateTime,
    pub price: f64,
    pub category: Option<String>,
}

/// Line item joined with the order's review
#[derive(Debug, Clone, PartialEq)]
pub struct OpsRow {
    pub status: String,
    pub purchased_at: NaiveDateTime,
    pub delivered_at: Option<NaiveDateTime>,
    pub review_score: Option<f64>,
}

/// Inclusive calendar-date interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// True when the timestamp's calendar date lies in `[start, end]`.
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        let date = ts.date();
        date >= self.start && date <= self.end
    }
}

/// The two periods compared by a report run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub this_week: Period,
    pub last_week: Period,
}

impl ReportWindow {
    /// Builds the window from an optional start/end.
    ///
    /// A missing end defaults to `today`, a missing start to six days before
    /// the end. Last week is always the seven days immediately preceding
    /// this week's start.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self> {
        let end = end.unwrap_or(today);
        let start = start.unwrap_or(end - Duration::days(6));
        if start > end {
            return Err(ReportError::InvalidWindow { start, end });
        }

        let last_week_end = start - Duration::days(1);
        let last_week_start = last_week_end - Duration::days(6);

        Ok(Self {
            this_week: Period::new(start, end),
            last_week: Period::new(last_week_start, last_week_end),
        })
    }

    /// `YYYYMMDD_YYYYMMDD` tag of this week, used in output file names.
    pub fn period_tag(&self) -> String {
        format!(
            "{}_{}",
            self.this_week.start.format("%Y%m%d"),
            self.this_week.end.format("%Y%m%d")
        )
    }
}

/// Parse a `YYYY-MM-DD` command-line date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ReportError::InvalidDate(s.to_string()))
}

/// Parse a CSV timestamp; a bare date is read as midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
