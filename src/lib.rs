//! Weekly e-commerce KPI report
//!
//! Loads Olist-style order tables, compares this week against last week,
//! and renders an HTML report with charts and plain-language insights.

pub mod category_names;
pub mod charts;
pub mod comparison;
pub mod config;
pub mod error;
pub mod formatting;
pub mod insights;
pub mod joiner;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod report;

pub use config::{ChartStyle, ReportConfig};
pub use error::{ReportError, Result};
pub use loader::InputPaths;
pub use report::{generate_report, GeneratedReport};
