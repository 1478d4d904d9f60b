//! Natural-language insights generated from the computed KPIs
//!
//! Pure functions of their inputs; wording is keyed on trend and magnitude.

use serde::Serialize;

use crate::comparison::{Comparison, RatingComparison, Sign, Trend};
use crate::formatting::currency;
use crate::metrics::{CategoryRanking, KpiSummary, SalesTrend};

/// Percent change above which wording becomes stronger
pub const STRONG_CHANGE_PERCENT: f64 = 10.0;

/// Rating difference (points) considered substantial
pub const SUBSTANTIAL_RATING_POINTS: f64 = 0.3;

const PRODUCT_INSIGHT_LIMIT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    pub executive_summary: String,
    pub sales: Vec<String>,
    pub products: Vec<String>,
    pub operations: Vec<String>,
}

impl Insights {
    pub fn generate(summary: &KpiSummary) -> Self {
        Self {
            executive_summary: executive_summary(
                &summary.revenue,
                &summary.orders,
                &summary.average_order_value,
                &summary.categories,
            ),
            sales: sales_insights(&summary.revenue, &summary.orders, &summary.sales_trend),
            products: product_insights(&summary.categories),
            operations: operational_insights(&summary.delivery_time, &summary.rating),
        }
    }
}

pub fn executive_summary(
    revenue: &Comparison,
    orders: &Comparison,
    aov: &Comparison,
    categories: &CategoryRanking,
) -> String {
    let mut summary = String::from("This week's e-commerce performance ");

    summary.push_str(match revenue.change.trend {
        Trend::Positive => "showed growth ",
        Trend::Neutral => "remained stable ",
        Trend::Negative => "faced some challenges ",
    });

    summary.push_str(&format!(
        "with a {}{:.1}% {} trend in total revenue",
        revenue.change.sign, revenue.change.percent_change, revenue.change.trend
    ));
    summary.push_str(&format!(
        " and a {}{:.1}% {} trend in total orders. ",
        orders.change.sign, orders.change.percent_change, orders.change.trend
    ));

    match (aov.change.trend, aov.current) {
        (Trend::Positive, _) => summary.push_str(&format!(
            "Customers spent more per order with average order value increasing by {:.1}%. ",
            aov.change.percent_change
        )),
        (Trend::Negative, _) => summary.push_str(&format!(
            "Average order value decreased by {:.1}%, suggesting a shift toward lower-priced items. ",
            aov.change.percent_change
        )),
        (Trend::Neutral, Some(value)) => summary.push_str(&format!(
            "Average order value remained consistent at {}. ",
            currency(value)
        )),
        (Trend::Neutral, None) => summary.push_str("No orders were placed this week. "),
    }

    if let Some(top) = categories.top() {
        summary.push_str(&format!("Our top-performing product category was {}, ", top.name));
        match top.change.sign {
            Sign::Plus => summary.push_str(&format!(
                "which saw a {:.1}% increase in sales compared to last week ",
                top.change.percent_change
            )),
            Sign::Minus => summary.push_str(&format!(
                "which experienced a {:.1}% decrease in sales compared to last week ",
                top.change.percent_change
            )),
            Sign::Flat => summary.push_str("which maintained stable sales compared to last week "),
        }
        summary.push_str(&format!("with an average of {} daily orders. ", top.daily_rate));
    }

    summary.trim_end().to_string()
}

/// Weekly comparison, peak day and weekday/weekend distribution
pub fn sales_insights(revenue: &Comparison, orders: &Comparison, trend: &SalesTrend) -> Vec<String> {
    let weekly_comparison = match revenue.change.sign {
        Sign::Plus => format!(
            "This week's sales were +{:.1}% higher than last week's.",
            revenue.change.percent_change
        ),
        Sign::Minus => format!(
            "This week's sales were -{:.1}% lower than last week's.",
            revenue.change.percent_change
        ),
        Sign::Flat => "This week's sales were in line with last week's.".to_string(),
    };

    let Some(peak) = trend.peak_day() else {
        return vec![weekly_comparison, "No sales were recorded this week.".to_string()];
    };

    let peak_day_insight = format!(
        "Peak sales day was {}, with revenue of {} and {} orders.",
        trend.days[peak],
        currency(trend.revenue[peak]),
        trend.orders[peak]
    );

    vec![weekly_comparison, peak_day_insight, day_distribution(orders, trend)]
}

fn day_distribution(orders: &Comparison, trend: &SalesTrend) -> String {
    let total: f64 = trend.revenue.iter().sum();
    let weekend: Option<f64> = trend
        .days
        .iter()
        .zip(&trend.revenue)
        .filter(|(day, _)| matches!(day.as_str(), "Sat" | "Sun"))
        .map(|(_, revenue)| *revenue)
        .reduce(|a, b| a + b);

    match weekend {
        Some(weekend) if total > 0.0 => {
            let percent = weekend / total * 100.0;
            let tail = if percent > 30.0 {
                "showing strong weekend performance."
            } else if percent > 20.0 {
                "with balanced weekday-weekend distribution."
            } else {
                "indicating stronger weekday performance."
            };
            format!(
                "Weekend sales represented {:.1}% of total weekly revenue, {}",
                percent, tail
            )
        }
        _ => match orders.change.trend {
            Trend::Positive => format!(
                "Order volume increased by {:.1}%, showing increased customer engagement.",
                orders.change.percent_change
            ),
            Trend::Negative => format!(
                "Order volume decreased by {:.1}%, suggesting a need to evaluate customer acquisition channels.",
                orders.change.percent_change
            ),
            Trend::Neutral => {
                "Order volume held steady, maintaining consistent customer activity.".to_string()
            }
        },
    }
}

/// One sentence for each of the first three ranked categories
pub fn product_insights(categories: &CategoryRanking) -> Vec<String> {
    categories
        .categories
        .iter()
        .take(PRODUCT_INSIGHT_LIMIT)
        .map(|category| {
            let pct = category.change.percent_change;
            let strong = pct > STRONG_CHANGE_PERCENT;
            let tail = match (category.change.trend, strong) {
                (Trend::Positive, true) => format!(
                    "continues to be a top-performing category, with a significant {:.1}% growth.",
                    pct
                ),
                (Trend::Positive, false) => format!("saw a healthy {:.1}% increase in sales.", pct),
                (Trend::Negative, true) => {
                    format!("experienced a notable decline of {:.1}% in sales.", pct)
                }
                (Trend::Negative, false) => {
                    format!("showed a slight decrease of {:.1}% in sales.", pct)
                }
                (Trend::Neutral, _) => {
                    "showed steady performance with consistent sales levels.".to_string()
                }
            };
            format!("{} {}", category.name, tail)
        })
        .collect()
}

/// Delivery and customer-satisfaction sentences
pub fn operational_insights(delivery: &Comparison, rating: &RatingComparison) -> Vec<String> {
    vec![delivery_insight(delivery), satisfaction_insight(rating)]
}

fn delivery_insight(delivery: &Comparison) -> String {
    let pct = delivery.change.percent_change;
    let days = delivery.abs_difference().unwrap_or(0.0);
    match delivery.change.trend {
        Trend::Positive => format!(
            "Delivery times have improved by {:.1} days on average{}",
            days,
            if pct > STRONG_CHANGE_PERCENT {
                ", significantly enhancing customer experience."
            } else {
                ", showing incremental efficiency gains."
            }
        ),
        Trend::Negative => format!(
            "Delivery times have increased by {:.1} days on average{}",
            days,
            if pct > STRONG_CHANGE_PERCENT {
                ", indicating logistics challenges to address."
            } else {
                ", suggesting need for process optimization."
            }
        ),
        Trend::Neutral if delivery.current.is_none() => {
            "No delivered orders were recorded this week.".to_string()
        }
        Trend::Neutral => {
            "Delivery times have remained stable, maintaining consistent fulfillment times."
                .to_string()
        }
    }
}

fn satisfaction_insight(rating: &RatingComparison) -> String {
    let Some(current) = rating.current else {
        return "No customer reviews were recorded this week.".to_string();
    };
    let substantial = rating.difference >= SUBSTANTIAL_RATING_POINTS;

    match rating.trend {
        Trend::Positive => format!(
            "Customer satisfaction improved to {:.1}/5.0 (↑ {:.1} points){}",
            current,
            rating.difference,
            if substantial {
                ", reflecting substantial service enhancements."
            } else {
                ", showing positive customer reception."
            }
        ),
        Trend::Negative => format!(
            "Customer satisfaction declined to {:.1}/5.0 (↓ {:.1} points){}",
            current,
            rating.difference,
            if substantial {
                ", requiring immediate attention."
            } else {
                ", suggesting opportunities for improvement."
            }
        ),
        Trend::Neutral => format!(
            "Customer satisfaction remained steady at {:.1}/5.0, maintaining consistent service standards.",
            current
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::{percent_change, rating_change, Change, Polarity};
    use crate::metrics::CategoryMetrics;

    fn category(name: &str, sales: f64, previous: f64) -> CategoryMetrics {
        CategoryMetrics {
            name: name.to_string(),
            sales,
            daily_rate: 3,
            previous_sales: previous,
            change: percent_change(sales, previous, Polarity::HigherIsBetter),
        }
    }

    #[test]
    fn test_executive_summary_growth() {
        let ranking = CategoryRanking {
            categories: vec![category("Health Beauty", 200.0, 100.0)],
        };
        let text = executive_summary(
            &Comparison::of_totals(150.0, 100.0),
            &Comparison::of_totals(12.0, 10.0),
            &Comparison::of_totals(50.0, 50.0),
            &ranking,
        );
        assert_eq!(
            text,
            "This week's e-commerce performance showed growth with a +50.0% positive trend in total revenue \
             and a +20.0% positive trend in total orders. Average order value remained consistent at $50.00. \
             Our top-performing product category was Health Beauty, which saw a 100.0% increase in sales \
             compared to last week with an average of 3 daily orders."
        );
    }

    #[test]
    fn test_executive_summary_without_categories() {
        let text = executive_summary(
            &Comparison::of_totals(90.0, 100.0),
            &Comparison::of_totals(9.0, 10.0),
            &Comparison::of_totals(10.0, 10.0),
            &CategoryRanking::default(),
        );
        assert!(text.starts_with("This week's e-commerce performance faced some challenges"));
        assert!(!text.contains("top-performing"));
    }

    #[test]
    fn test_sales_insights_weekend_share() {
        let trend = SalesTrend {
            days: vec!["Mon".into(), "Sat".into(), "Sun".into()],
            revenue: vec![600.0, 250.0, 150.0],
            orders: vec![6, 2, 1],
        };
        let insights = sales_insights(
            &Comparison::of_totals(1000.0, 800.0),
            &Comparison::of_totals(9.0, 9.0),
            &trend,
        );
        assert_eq!(insights[0], "This week's sales were +25.0% higher than last week's.");
        assert_eq!(insights[1], "Peak sales day was Mon, with revenue of $600.00 and 6 orders.");
        assert_eq!(
            insights[2],
            "Weekend sales represented 40.0% of total weekly revenue, showing strong weekend performance."
        );
    }

    #[test]
    fn test_sales_insights_without_weekend_or_sales() {
        let trend = SalesTrend {
            days: vec!["Tue".into()],
            revenue: vec![100.0],
            orders: vec![2],
        };
        let insights = sales_insights(
            &Comparison::of_totals(100.0, 100.0),
            &Comparison::of_totals(5.0, 4.0),
            &trend,
        );
        assert_eq!(insights[0], "This week's sales were in line with last week's.");
        assert_eq!(
            insights[2],
            "Order volume increased by 25.0%, showing increased customer engagement."
        );

        let empty = sales_insights(
            &Comparison::of_totals(0.0, 100.0),
            &Comparison::of_totals(0.0, 4.0),
            &SalesTrend::default(),
        );
        assert_eq!(empty.len(), 2);
        assert_eq!(empty[1], "No sales were recorded this week.");
    }

    #[test]
    fn test_product_insights_wording_thresholds() {
        let ranking = CategoryRanking {
            categories: vec![
                category("A", 150.0, 100.0),
                category("B", 105.0, 100.0),
                category("C", 50.0, 100.0),
                category("D", 10.0, 10.0),
            ],
        };
        let insights = product_insights(&ranking);
        assert_eq!(insights.len(), 3);
        assert_eq!(
            insights[0],
            "A continues to be a top-performing category, with a significant 50.0% growth."
        );
        assert_eq!(insights[1], "B saw a healthy 5.0% increase in sales.");
        assert_eq!(insights[2], "C experienced a notable decline of 50.0% in sales.");
    }

    #[test]
    fn test_operational_insights() {
        let delivery = Comparison::between(Some(6.0), Some(8.0), Polarity::LowerIsBetter);
        let rating = rating_change(Some(4.5), Some(4.0));
        let insights = operational_insights(&delivery, &rating);
        assert_eq!(
            insights[0],
            "Delivery times have improved by 2.0 days on average, significantly enhancing customer experience."
        );
        assert_eq!(
            insights[1],
            "Customer satisfaction improved to 4.5/5.0 (↑ 0.5 points), reflecting substantial service enhancements."
        );

        let slower = Comparison::between(Some(10.5), Some(10.0), Polarity::LowerIsBetter);
        let flat = rating_change(Some(4.0), Some(4.01));
        let insights = operational_insights(&slower, &flat);
        assert_eq!(
            insights[0],
            "Delivery times have increased by 0.5 days on average, suggesting need for process optimization."
        );
        assert!(insights[1].contains("remained steady at 4.0/5.0"));
    }

    #[test]
    fn test_missing_data_sentences() {
        let delivery = Comparison {
            current: None,
            previous: Some(5.0),
            change: Change::NEUTRAL,
        };
        let insights = operational_insights(&delivery, &rating_change(None, Some(4.0)));
        assert_eq!(insights[0], "No delivered orders were recorded this week.");
        assert_eq!(insights[1], "No customer reviews were recorded this week.");
    }
}
