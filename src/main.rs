//! Weekly e-commerce report generator
//!
//! Usage:
//!   cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --start <DATE>           First day of the reported week (default: end - 6 days)
//!   --end <DATE>             Last day of the reported week (default: today)
//!   --output-dir <PATH>      Root of reports/ and assets/plots/ (default: data)
//!   --top-categories <N>     Categories to rank and chart (default: 5)
//!   --print-metrics          Print the computed KPIs as JSON
//!
//! Input tables come from --orders etc. or the matching *_FILE_PATH variables,
//! which may also be set in a `.env` file. The lower-case keys of older `.env`
//! files (`orders_table_file_path`, `orderd_items_table_file_path`, ...) are
//! still accepted when the upper-case variable is unset.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use ecommerce_weekly_report::models::parse_date;
use ecommerce_weekly_report::{generate_report, InputPaths, ReportConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ecommerce_weekly_report")]
#[command(about = "Generate the weekly e-commerce performance report")]
struct Args {
    /// First day of the reported week (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Last day of the reported week (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    /// Output root directory
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// Number of product categories to rank
    #[arg(long, default_value = "5")]
    top_categories: usize,

    /// Orders table CSV
    #[arg(long, env = "ORDERS_TABLE_FILE_PATH")]
    orders: Option<PathBuf>,

    /// Order items table CSV
    #[arg(long, env = "ORDER_ITEMS_TABLE_FILE_PATH")]
    order_items: Option<PathBuf>,

    /// Products table CSV
    #[arg(long, env = "PRODUCTS_TABLE_FILE_PATH")]
    products: Option<PathBuf>,

    /// Category name translation CSV
    #[arg(long, env = "PRODUCT_CATEGORY_FILE_PATH")]
    product_category: Option<PathBuf>,

    /// Order reviews table CSV
    #[arg(long, env = "ORDER_REVIEWS_TABLE_FILE_PATH")]
    order_reviews: Option<PathBuf>,

    /// Print the KPI summary as JSON on stdout
    #[arg(long)]
    print_metrics: bool,
}

/// (variable read by clap, lower-case key used by older `.env` files)
const LEGACY_ENV_KEYS: [(&str, &str); 5] = [
    ("ORDERS_TABLE_FILE_PATH", "orders_table_file_path"),
    ("ORDER_ITEMS_TABLE_FILE_PATH", "orderd_items_table_file_path"),
    ("PRODUCTS_TABLE_FILE_PATH", "products_table_file_path"),
    ("PRODUCT_CATEGORY_FILE_PATH", "product_category_file_path"),
    ("ORDER_REVIEWS_TABLE_FILE_PATH", "order_reviews_table_file_path"),
];

/// Upper-case variables to fill in from their legacy lower-case keys
fn legacy_env_overrides(lookup: impl Fn(&str) -> Option<String>) -> Vec<(&'static str, String)> {
    LEGACY_ENV_KEYS
        .iter()
        .filter(|(key, _)| lookup(key).is_none())
        .filter_map(|(key, legacy)| lookup(legacy).map(|value| (*key, value)))
        .collect()
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    for (key, value) in legacy_env_overrides(|k| std::env::var(k).ok()) {
        std::env::set_var(key, value);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error generating report: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let start = optional_date(args.start.as_deref())?;
    let end = optional_date(args.end.as_deref())?;

    let inputs = InputPaths {
        orders: args.orders,
        order_items: args.order_items,
        products: args.products,
        product_category: args.product_category,
        order_reviews: args.order_reviews,
    };
    let config = ReportConfig::new(inputs, &args.output_dir).with_top_categories(args.top_categories);

    let report = generate_report(&config, start, end)?;
    info!("Report generated successfully: {}", report.path.display());

    if args.print_metrics {
        println!("{}", serde_json::to_string_pretty(&report.data.summary)?);
    }

    Ok(())
}

fn optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    Ok(value.map(parse_date).transpose()?)
}
