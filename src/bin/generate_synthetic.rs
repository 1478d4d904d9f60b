//! Synthetic data generator for the weekly report inputs
//!
//! Writes the five Olist-style tables the report consumes, covering a
//! configurable date range with randomized order volume, basket sizes,
//! delivery times and review scores.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --start <DATE>           First purchase day (default: 2017-04-24)
//!   --days <N>               Number of days to generate (default: 14)
//!   --orders-per-day <N>     Mean orders per day (default: 40)
//!   --seed <N>               Random seed for reproducibility (optional)
//!   --output-dir <PATH>      Directory for the CSV files (default: data/raw)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;

/// Synthetic data generator for the weekly report
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate synthetic e-commerce order tables")]
struct Args {
    /// First purchase day (YYYY-MM-DD)
    #[arg(long, default_value = "2017-04-24")]
    start: NaiveDate,

    /// Number of days to generate
    #[arg(long, default_value = "14")]
    days: u32,

    /// Mean number of orders per day
    #[arg(long, default_value = "40")]
    orders_per_day: u32,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(long, default_value = "data/raw")]
    output_dir: PathBuf,
}

/// (source name, english name, price range)
const CATEGORIES: &[(&str, &str, (f64, f64))] = &[
    ("beleza_saude", "health_beauty", (15.0, 180.0)),
    ("informatica_acessorios", "computers_accessories", (30.0, 450.0)),
    ("cama_mesa_banho", "bed_bath_table", (20.0, 220.0)),
    ("esporte_lazer", "sports_leisure", (25.0, 300.0)),
    ("moveis_decoracao", "furniture_decor", (40.0, 600.0)),
    ("relogios_presentes", "watches_gifts", (50.0, 900.0)),
    ("utilidades_domesticas", "housewares", (10.0, 150.0)),
    ("fashion_roupa_feminina", "fashio_female_clothing", (20.0, 160.0)),
    ("brinquedos", "toys", (15.0, 200.0)),
    ("eletronicos", "electronics", (25.0, 500.0)),
];

const PRODUCTS_PER_CATEGORY: usize = 12;
const UNDELIVERED_RATE: f64 = 0.06;
const VERY_LATE_RATE: f64 = 0.02;
const REVIEW_RATE: f64 = 0.9;

#[derive(Debug, Serialize)]
struct OrderRecord {
    order_id: String,
    customer_id: String,
    order_status: &'static str,
    order_purchase_timestamp: String,
    order_approved_at: String,
    order_delivered_customer_date: String,
    order_estimated_delivery_date: String,
}

#[derive(Debug, Serialize)]
struct OrderItemRecord {
    order_id: String,
    order_item_id: u32,
    product_id: String,
    price: f64,
    freight_value: f64,
}

#[derive(Debug, Serialize)]
struct ProductRecord {
    product_id: String,
    product_category_name: String,
}

#[derive(Debug, Serialize)]
struct CategoryRecord {
    product_category_name: &'static str,
    product_category_name_english: &'static str,
}

#[derive(Debug, Serialize)]
struct ReviewRecord {
    review_id: String,
    order_id: String,
    review_score: u8,
}

struct CatalogEntry {
    product_id: String,
    category: usize,
}

/// Generate a 32-char hex identifier in the style of the Olist dataset
fn generate_id(rng: &mut impl Rng) -> String {
    format!("{:016x}{:016x}", rng.gen::<u64>(), rng.gen::<u64>())
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn build_catalog(rng: &mut impl Rng) -> Vec<CatalogEntry> {
    let mut catalog = Vec::with_capacity(CATEGORIES.len() * PRODUCTS_PER_CATEGORY);
    for category in 0..CATEGORIES.len() {
        for _ in 0..PRODUCTS_PER_CATEGORY {
            catalog.push(CatalogEntry {
                product_id: generate_id(rng),
                category,
            });
        }
    }
    catalog
}

/// Orders for one day; weekends are a little busier
fn daily_order_count(day: NaiveDate, mean: u32, rng: &mut impl Rng) -> u32 {
    use chrono::{Datelike, Weekday};

    let weekend_boost = match day.weekday() {
        Weekday::Sat | Weekday::Sun => 1.2,
        _ => 1.0,
    };
    let factor = rng.gen_range(0.7..1.3) * weekend_boost;
    (mean as f64 * factor).round() as u32
}

/// Review score skewed towards the top, worse for slow deliveries
fn review_score(delivery_days: Option<i64>, rng: &mut impl Rng) -> u8 {
    let penalty = match delivery_days {
        Some(d) if d > 20 => 2,
        Some(d) if d > 12 => 1,
        None => 1,
        _ => 0,
    };
    let base: u8 = match rng.gen_range(0..100) {
        0..=54 => 5,
        55..=74 => 4,
        75..=84 => 3,
        85..=91 => 2,
        _ => 1,
    };
    base.saturating_sub(penalty).max(1)
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("🔧 Synthetic Order Data Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Start date:       {}", args.start);
    println!("Days:             {}", args.days);
    println!("Orders per day:   ~{}", args.orders_per_day);
    println!("Output directory: {}", args.output_dir.display());
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    println!("📦 Building product catalog...");
    let catalog = build_catalog(&mut rng);

    let mut orders = Vec::new();
    let mut items = Vec::new();
    let mut reviews = Vec::new();

    println!("🏭 Generating orders...");
    for offset in 0..args.days {
        let day = args.start + Duration::days(offset as i64);
        for _ in 0..daily_order_count(day, args.orders_per_day, &mut rng) {
            let order_id = generate_id(&mut rng);
            let purchased = day
                .and_hms_opt(rng.gen_range(0..24), rng.gen_range(0..60), rng.gen_range(0..60))
                .context("generating purchase time")?;

            let delivery_days = if rng.gen_bool(UNDELIVERED_RATE) {
                None
            } else if rng.gen_bool(VERY_LATE_RATE) {
                Some(rng.gen_range(50..90))
            } else {
                Some(rng.gen_range(2..25))
            };
            let delivered = delivery_days.map(|d| purchased + Duration::days(d) + Duration::hours(rng.gen_range(0..12)));
            let status = match delivered {
                Some(_) => "delivered",
                None if rng.gen_bool(0.5) => "shipped",
                None => "processing",
            };

            orders.push(OrderRecord {
                order_id: order_id.clone(),
                customer_id: generate_id(&mut rng),
                order_status: status,
                order_purchase_timestamp: format_datetime(&purchased),
                order_approved_at: format_datetime(&(purchased + Duration::minutes(rng.gen_range(5..120)))),
                order_delivered_customer_date: delivered.as_ref().map(format_datetime).unwrap_or_default(),
                order_estimated_delivery_date: format_datetime(&(purchased + Duration::days(rng.gen_range(15..30)))),
            });

            let basket = if rng.gen_bool(0.85) { 1 } else { rng.gen_range(2..=4) };
            for item_id in 1..=basket {
                let product = &catalog[rng.gen_range(0..catalog.len())];
                let (low, high) = CATEGORIES[product.category].2;
                let price = (rng.gen_range(low..high) * 100.0).round() / 100.0;
                items.push(OrderItemRecord {
                    order_id: order_id.clone(),
                    order_item_id: item_id,
                    product_id: product.product_id.clone(),
                    price,
                    freight_value: (rng.gen_range(5.0..40.0_f64) * 100.0).round() / 100.0,
                });
            }

            if rng.gen_bool(REVIEW_RATE) {
                reviews.push(ReviewRecord {
                    review_id: generate_id(&mut rng),
                    order_id,
                    review_score: review_score(delivery_days, &mut rng),
                });
            }
        }
    }

    let products: Vec<ProductRecord> = catalog
        .iter()
        .map(|p| ProductRecord {
            product_id: p.product_id.clone(),
            product_category_name: CATEGORIES[p.category].0.to_string(),
        })
        .collect();
    let category_names: Vec<CategoryRecord> = CATEGORIES
        .iter()
        .map(|(source, english, _)| CategoryRecord {
            product_category_name: *source,
            product_category_name_english: *english,
        })
        .collect();

    println!("💾 Writing tables...");
    let dir = &args.output_dir;
    write_csv(&dir.join("orders.csv"), &orders)?;
    write_csv(&dir.join("order_items.csv"), &items)?;
    write_csv(&dir.join("products.csv"), &products)?;
    write_csv(&dir.join("product_category_name_translation.csv"), &category_names)?;
    write_csv(&dir.join("order_reviews.csv"), &reviews)?;

    println!("\n✅ Generation complete!");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Orders:      {:>8}", orders.len());
    println!("Order items: {:>8}", items.len());
    println!("Products:    {:>8}", products.len());
    println!("Categories:  {:>8}", category_names.len());
    println!("Reviews:     {:>8}", reviews.len());
    println!("\nPoint the report at these files with:");
    println!("   ORDERS_TABLE_FILE_PATH={}", dir.join("orders.csv").display());
    println!("   ORDER_ITEMS_TABLE_FILE_PATH={}", dir.join("order_items.csv").display());
    println!("   PRODUCTS_TABLE_FILE_PATH={}", dir.join("products.csv").display());
    println!(
        "   PRODUCT_CATEGORY_FILE_PATH={}",
        dir.join("product_category_name_translation.csv").display()
    );
    println!("   ORDER_REVIEWS_TABLE_FILE_PATH={}", dir.join("order_reviews.csv").display());

    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
