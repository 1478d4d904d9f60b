//! Report assembly: metrics, insights and charts rendered into one HTML page

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::charts::{create_sales_trend_chart, create_top_categories_chart};
use crate::comparison::{Comparison, RatingComparison, Trend};
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::formatting::{currency, with_thousands};
use crate::insights::Insights;
use crate::joiner::build_views;
use crate::loader::{load_tables, Tables};
use crate::metrics::KpiSummary;
use crate::models::{Period, ReportWindow};

const STYLESHEET: &str = include_str!("../assets/report.css");
const STYLESHEET_NAME: &str = "report.css";

/// Everything computed for one report, independent of output files
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub window: ReportWindow,
    pub summary: KpiSummary,
    pub insights: Insights,
}

/// Chart locations as referenced from the HTML file
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLinks {
    pub sales_trend: String,
    pub top_categories: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub path: PathBuf,
    pub data: ReportData,
}

pub fn build_report_data(tables: &Tables, window: ReportWindow, top_categories: usize) -> ReportData {
    let views = build_views(tables, &window);
    info!(
        "This week: {} orders, {} line items; last week: {} orders, {} line items",
        views.orders.this_week.len(),
        views.revenue.this_week.len(),
        views.orders.last_week.len(),
        views.revenue.last_week.len()
    );

    let summary = KpiSummary::compute(&views, top_categories);
    info!("Metrics calculated");

    let insights = Insights::generate(&summary);
    info!("Text insights generated");

    ReportData {
        window,
        summary,
        insights,
    }
}

/// Generate the report for the week ending `this_week_end` (default: today).
pub fn generate_report(
    config: &ReportConfig,
    this_week_start: Option<NaiveDate>,
    this_week_end: Option<NaiveDate>,
) -> Result<GeneratedReport> {
    let window = ReportWindow::resolve(this_week_start, this_week_end, Local::now().date_naive())?;
    generate_report_for(config, window)
}

pub fn generate_report_for(config: &ReportConfig, window: ReportWindow) -> Result<GeneratedReport> {
    info!(
        "Generating report for period: {} to {}",
        window.this_week.start, window.this_week.end
    );
    info!(
        "Comparison period: {} to {}",
        window.last_week.start, window.last_week.end
    );

    let tables = load_tables(&config.inputs)?;
    let data = build_report_data(&tables, window, config.top_categories);

    let tag = window.period_tag();
    let sales_trend_file = format!("sales_trend_{}.svg", tag);
    let categories_file = format!("top_categories_{}.svg", tag);
    let links = ChartLinks {
        sales_trend: format!("../assets/plots/{}", sales_trend_file),
        top_categories: format!("../assets/plots/{}", categories_file),
    };
    let html = render_html(&data, &links, Local::now().naive_local());

    let plots_dir = config.plots_dir();
    let reports_dir = config.reports_dir();
    let outputs = OutputPaths {
        sales_trend: plots_dir.join(&sales_trend_file),
        top_categories: plots_dir.join(&categories_file),
        stylesheet: reports_dir.join(STYLESHEET_NAME),
        html: reports_dir.join(format!("report_{}.html", tag)),
    };

    let mut written = Vec::new();
    if let Err(e) = write_outputs(config, &data, &outputs, &html, &mut written) {
        for path in &written {
            if let Err(remove_err) = fs::remove_file(path) {
                warn!("Failed to remove {}: {}", path.display(), remove_err);
            }
        }
        return Err(e);
    }
    info!("HTML report generated: {}", outputs.html.display());

    Ok(GeneratedReport {
        path: outputs.html,
        data,
    })
}

struct OutputPaths {
    sales_trend: PathBuf,
    top_categories: PathBuf,
    stylesheet: PathBuf,
    html: PathBuf,
}

/// Write charts, stylesheet and HTML, recording each file this run created.
///
/// A stylesheet that already existed is shared with earlier reports and is
/// not recorded.
fn write_outputs(
    config: &ReportConfig,
    data: &ReportData,
    outputs: &OutputPaths,
    html: &str,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    create_dir(&config.plots_dir())?;
    create_dir(&config.reports_dir())?;

    create_sales_trend_chart(&data.summary.sales_trend, &config.chart_style, &outputs.sales_trend)?;
    written.push(outputs.sales_trend.clone());
    create_top_categories_chart(
        &data.summary.categories,
        config.top_categories,
        &config.chart_style,
        &outputs.top_categories,
    )?;
    written.push(outputs.top_categories.clone());
    info!("Visualizations saved to {}", config.plots_dir().display());

    let stylesheet_existed = outputs.stylesheet.exists();
    fs::write(&outputs.stylesheet, STYLESHEET).map_err(|e| ReportError::io(&outputs.stylesheet, e))?;
    if !stylesheet_existed {
        written.push(outputs.stylesheet.clone());
    }

    fs::write(&outputs.html, html).map_err(|e| ReportError::io(&outputs.html, e))?;
    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| ReportError::io(path, e))
}

pub fn render_html(data: &ReportData, charts: &ChartLinks, generated_at: NaiveDateTime) -> String {
    let summary = &data.summary;
    let insights = &data.insights;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>Weekly E-commerce Report {}</title>\n",
        period_label(&data.window.this_week)
    ));
    html.push_str(&format!(
        "<link rel=\"stylesheet\" href=\"{}\">\n</head>\n<body>\n",
        STYLESHEET_NAME
    ));

    html.push_str("<header class=\"report-header\">\n");
    html.push_str("<h1>Weekly E-commerce Performance Report</h1>\n");
    html.push_str(&format!(
        "<p class=\"period\">{} <span class=\"versus\">vs.</span> {}</p>\n",
        period_label(&data.window.this_week),
        period_label(&data.window.last_week)
    ));
    html.push_str(&format!(
        "<p class=\"generated\">Generated on {}</p>\n</header>\n",
        generated_at.format("%Y-%m-%d at %H:%M:%S")
    ));

    html.push_str("<section class=\"kpis\">\n");
    html.push_str(&kpi_card("Total Revenue", &summary.revenue, currency));
    html.push_str(&kpi_card("Total Orders", &summary.orders, |v| with_thousands(v, 0)));
    html.push_str(&kpi_card("Average Order Value", &summary.average_order_value, currency));
    html.push_str(&kpi_card("Avg. Delivery Time", &summary.delivery_time, |v| {
        format!("{:.1} days", v)
    }));
    html.push_str(&rating_card(&summary.rating));
    html.push_str("</section>\n");

    html.push_str("<section class=\"summary\">\n<h2>Executive Summary</h2>\n");
    html.push_str(&format!("<p>{}</p>\n</section>\n", escape(&insights.executive_summary)));

    html.push_str("<section class=\"sales\">\n<h2>Sales Performance</h2>\n");
    html.push_str(&chart_figure(&charts.sales_trend, "Daily sales performance"));
    html.push_str(&bullet_list(&insights.sales));
    html.push_str("</section>\n");

    html.push_str("<section class=\"products\">\n<h2>Product Performance</h2>\n");
    html.push_str(&chart_figure(&charts.top_categories, "Top product categories by revenue"));
    html.push_str(&category_table(summary));
    html.push_str(&bullet_list(&insights.products));
    html.push_str("</section>\n");

    html.push_str("<section class=\"operations\">\n<h2>Operational Insights</h2>\n");
    html.push_str(&bullet_list(&insights.operations));
    html.push_str("</section>\n");

    html.push_str("</body>\n</html>\n");
    html
}

fn period_label(period: &Period) -> String {
    format!(
        "{} to {}",
        period.start.format("%Y-%m-%d"),
        period.end.format("%Y-%m-%d")
    )
}

fn kpi_card(title: &str, comparison: &Comparison, fmt: impl Fn(f64) -> String) -> String {
    let value = |v: Option<f64>| v.map(&fmt).unwrap_or_else(|| "n/a".to_string());
    format!(
        "<div class=\"kpi-card\">\n<h3>{}</h3>\n<p class=\"value\">{}</p>\n\
         <p class=\"change {}\">{}{:.1}%</p>\n<p class=\"previous\">Last week: {}</p>\n</div>\n",
        escape(title),
        value(comparison.current),
        trend_class(comparison.change.trend),
        comparison.change.sign,
        comparison.change.percent_change,
        value(comparison.previous)
    )
}

fn rating_card(rating: &RatingComparison) -> String {
    let value = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}/5.0", v));
    format!(
        "<div class=\"kpi-card\">\n<h3>Customer Rating</h3>\n<p class=\"value\">{}</p>\n\
         <p class=\"change {}\">{}{:.1} points</p>\n<p class=\"previous\">Last week: {}</p>\n</div>\n",
        value(rating.current),
        trend_class(rating.trend),
        rating.sign,
        rating.difference,
        value(rating.previous)
    )
}

fn category_table(summary: &KpiSummary) -> String {
    if summary.categories.is_empty() {
        return "<p class=\"empty\">No category sales this week.</p>\n".to_string();
    }

    let mut table = String::from(
        "<table class=\"categories\">\n<thead><tr><th>Category</th><th>Revenue</th>\
         <th>Daily Orders</th><th>Last Week</th><th>Change</th></tr></thead>\n<tbody>\n",
    );
    for category in &summary.categories.categories {
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}{:.1}%</td></tr>\n",
            escape(&category.name),
            currency(category.sales),
            category.daily_rate,
            currency(category.previous_sales),
            trend_class(category.change.trend),
            category.change.sign,
            category.change.percent_change
        ));
    }
    table.push_str("</tbody>\n</table>\n");
    table
}

fn chart_figure(src: &str, alt: &str) -> String {
    format!(
        "<figure class=\"chart\"><img src=\"{}\" alt=\"{}\"></figure>\n",
        escape(src),
        escape(alt)
    )
}

fn bullet_list(items: &[String]) -> String {
    let mut list = String::from("<ul class=\"insights\">\n");
    for item in items {
        list.push_str(&format!("<li>{}</li>\n", escape(item)));
    }
    list.push_str("</ul>\n");
    list
}

fn trend_class(trend: Trend) -> &'static str {
    trend.as_str()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
