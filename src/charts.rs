//! SVG charts for the report
//!
//! Styling comes from the [`ChartStyle`] passed to each call.

use std::fmt::Display;
use std::path::Path;

use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use tracing::debug;

use crate::comparison::Trend;
use crate::config::{ChartStyle, Palette};
use crate::error::{ReportError, Result};
use crate::formatting::currency_whole;
use crate::metrics::{CategoryRanking, SalesTrend};

type DrawResult<DB> = std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Revenue line over order-count bars, one point per weekday present
pub fn create_sales_trend_chart(trend: &SalesTrend, style: &ChartStyle, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (style.width, style.height)).into_drawing_area();
    draw_sales_trend(&root, trend, style)
        .and_then(|_| root.present())
        .map_err(|e| chart_error(path, e))?;
    debug!("Wrote sales trend chart to {}", path.display());
    Ok(())
}

/// Revenue bars for the ranked categories, at most `max_categories`
pub fn create_top_categories_chart(
    ranking: &CategoryRanking,
    max_categories: usize,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    let root = SVGBackend::new(path, (style.width, style.height)).into_drawing_area();
    draw_top_categories(&root, ranking, max_categories, style)
        .and_then(|_| root.present())
        .map_err(|e| chart_error(path, e))?;
    debug!("Wrote top categories chart to {}", path.display());
    Ok(())
}

fn chart_error(path: &Path, e: impl Display) -> ReportError {
    ReportError::Chart(format!("{}: {}", path.display(), e))
}

fn draw_sales_trend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    trend: &SalesTrend,
    style: &ChartStyle,
) -> DrawResult<DB> {
    const TITLE: &str = "Daily Sales Performance";
    root.fill(&WHITE)?;

    if trend.is_empty() {
        return draw_placeholder(root, TITLE, style);
    }

    let palette = style.palette;
    let n = trend.days.len();
    let max_revenue = trend.revenue.iter().copied().fold(0.0, f64::max).max(1.0);
    let max_orders = trend.orders.iter().copied().max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(TITLE, title_font(style))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .right_y_label_area_size(70)
        .build_cartesian_2d((0..n - 1).into_segmented(), 0f64..max_revenue * 1.1)?
        .set_secondary_coord((0..n - 1).into_segmented(), 0f64..max_orders * 1.1);

    let day_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            trend.days.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };
    let revenue_label = |v: &f64| currency_whole(*v);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(palette.background.mix(0.2))
        .x_labels(n)
        .x_label_formatter(&day_label)
        .y_desc("Daily Revenue ($)")
        .y_label_formatter(&revenue_label)
        .label_style(tick_font(style))
        .axis_desc_style(label_font(style))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc("Number of Orders")
        .label_style(tick_font(style))
        .axis_desc_style(label_font(style))
        .draw()?;

    let highlight = palette.highlight;
    chart
        .draw_secondary_series(
            Histogram::vertical(chart.borrow_secondary())
                .style(highlight.mix(0.6).filled())
                .margin(20)
                .data(trend.orders.iter().enumerate().map(|(i, c)| (i, *c as f64))),
        )?
        .label("Number of Orders")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], highlight.mix(0.6).filled()));

    let primary = palette.primary;
    let points: Vec<(SegmentValue<usize>, f64)> = trend
        .revenue
        .iter()
        .enumerate()
        .map(|(i, v)| (SegmentValue::CenterOf(i), *v))
        .collect();

    chart
        .draw_series(LineSeries::new(points.clone(), primary.stroke_width(3)))?
        .label("Revenue")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], primary.stroke_width(3)));
    chart.draw_series(points.iter().map(|p| Circle::new(p.clone(), 6, WHITE.filled())))?;
    chart.draw_series(points.iter().map(|p| Circle::new(p.clone(), 6, primary.stroke_width(2))))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.9))
        .border_style(palette.accent)
        .label_font(tick_font(style))
        .draw()?;

    Ok(())
}

fn draw_top_categories<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    ranking: &CategoryRanking,
    max_categories: usize,
    style: &ChartStyle,
) -> DrawResult<DB> {
    const TITLE: &str = "Top Product Categories by Revenue";
    root.fill(&WHITE)?;

    let categories: Vec<_> = ranking.categories.iter().take(max_categories).collect();
    if categories.is_empty() {
        return draw_placeholder(root, TITLE, style);
    }

    let palette = style.palette;
    let n = categories.len();
    let max_sales = categories.iter().map(|c| c.sales).fold(0.0, f64::max).max(1.0);
    let bar_margin = if n <= 3 { 60 } else { 25 };

    let mut chart = ChartBuilder::on(root)
        .caption(TITLE, title_font(style))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d((0..n - 1).into_segmented(), 0f64..max_sales * 1.1)?;

    let category_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => categories
            .get(*i)
            .map(|c| c.name.clone())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    let revenue_label = |v: &f64| currency_whole(*v);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(palette.background.mix(0.2))
        .x_labels(n)
        .x_label_formatter(&category_label)
        .y_desc("Revenue ($)")
        .y_label_formatter(&revenue_label)
        .label_style(tick_font(style))
        .axis_desc_style(label_font(style))
        .draw()?;

    let bar_colors: Vec<RGBColor> = categories
        .iter()
        .map(|c| trend_color(c.change.trend, &palette))
        .collect();
    chart.draw_series(
        Histogram::vertical(&chart)
            .style_func(move |v: &SegmentValue<usize>, _: &f64| {
                let idx = match v {
                    SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => Some(*i),
                    SegmentValue::Last => None,
                };
                idx.and_then(|i| bar_colors.get(i).copied())
                    .unwrap_or(palette.primary)
                    .filled()
            })
            .margin(bar_margin)
            .data(categories.iter().enumerate().map(|(i, c)| (i, c.sales))),
    )?;

    let value_style = TextStyle::from(tick_font(style).style(FontStyle::Bold))
        .color(&palette.secondary)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(categories.iter().enumerate().map(|(i, c)| {
        Text::new(
            currency_whole(c.sales),
            (SegmentValue::CenterOf(i), c.sales + max_sales * 0.02),
            value_style.clone(),
        )
    }))?;

    Ok(())
}

/// Bar colour for a category's week-over-week trend
fn trend_color(trend: Trend, palette: &Palette) -> RGBColor {
    match trend {
        Trend::Positive => palette.positive,
        Trend::Negative => palette.negative,
        Trend::Neutral => palette.primary,
    }
}

fn draw_placeholder<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    style: &ChartStyle,
) -> DrawResult<DB> {
    let area = root.titled(title, title_font(style))?;
    let (width, height) = area.dim_in_pixel();
    let message_style =
        TextStyle::from(label_font(style)).pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        "No sales recorded for this period",
        (width as i32 / 2, height as i32 / 2),
        message_style,
    ))?;
    Ok(())
}

fn title_font(style: &ChartStyle) -> FontDesc<'_> {
    (style.font_family.as_str(), style.title_size)
        .into_font()
        .style(FontStyle::Bold)
}

fn label_font(style: &ChartStyle) -> FontDesc<'_> {
    (style.font_family.as_str(), style.label_size).into_font()
}

fn tick_font(style: &ChartStyle) -> FontDesc<'_> {
    (style.font_family.as_str(), style.tick_size).into_font()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::Change;
    use crate::metrics::CategoryMetrics;
    use tempfile::TempDir;

    fn trend() -> SalesTrend {
        SalesTrend {
            days: vec!["Mon".to_string(), "Wed".to_string(), "Sat".to_string()],
            revenue: vec![1500.0, 820.5, 2100.0],
            orders: vec![12, 7, 15],
        }
    }

    fn ranking() -> CategoryRanking {
        let category = |name: &str, sales: f64| CategoryMetrics {
            name: name.to_string(),
            sales,
            daily_rate: 2,
            previous_sales: 0.0,
            change: Change::NEUTRAL,
        };
        CategoryRanking {
            categories: vec![
                category("Health Beauty", 3200.0),
                category("Watches Gifts", 2100.0),
                category("Toys", 900.0),
            ],
        }
    }

    #[test]
    fn test_sales_trend_chart_is_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sales_trend.svg");
        create_sales_trend_chart(&trend(), &ChartStyle::default(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Daily Sales Performance"));
    }

    #[test]
    fn test_top_categories_chart_respects_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("top_categories.svg");
        create_top_categories_chart(&ranking(), 2, &ChartStyle::default(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Health Beauty"));
        assert!(svg.contains("$3,200"));
        assert!(!svg.contains("Toys"));
    }

    #[test]
    fn test_bars_are_coloured_by_trend() {
        let palette = Palette::default();
        assert_eq!(trend_color(Trend::Positive, &palette), palette.positive);
        assert_eq!(trend_color(Trend::Negative, &palette), palette.negative);
        assert_eq!(trend_color(Trend::Neutral, &palette), palette.primary);

        let mut ranking = ranking();
        ranking.categories[0].change = crate::comparison::percent_change(
            3200.0,
            2000.0,
            crate::comparison::Polarity::HigherIsBetter,
        );
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coloured.svg");
        create_top_categories_chart(&ranking, 3, &ChartStyle::default(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap().to_lowercase();
        assert!(svg.contains("#27ae60"));
        assert!(!svg.contains("#e74c3c"));
    }

    #[test]
    fn test_empty_data_renders_placeholder() {
        let dir = TempDir::new().unwrap();
        let style = ChartStyle::default();
        let trend_path = dir.path().join("empty_trend.svg");
        let categories_path = dir.path().join("empty_categories.svg");

        create_sales_trend_chart(&SalesTrend::default(), &style, &trend_path).unwrap();
        create_top_categories_chart(&CategoryRanking::default(), 5, &style, &categories_path).unwrap();

        for path in [trend_path, categories_path] {
            let svg = std::fs::read_to_string(&path).unwrap();
            assert!(svg.contains("No sales recorded for this period"));
        }
    }

    #[test]
    fn test_unwritable_path_is_chart_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("chart.svg");
        let err = create_sales_trend_chart(&trend(), &ChartStyle::default(), &path).unwrap_err();
        assert!(matches!(err, ReportError::Chart(_)));
    }
}
