//! Week-over-week comparison rules shared by every KPI
//!
//! A change carries its magnitude in `percent_change` (always >= 0, one
//! decimal) and its direction in `sign`/`trend`. A change is neutral exactly
//! when its magnitude is zero.

use std::fmt;

use serde::Serialize;

/// Below this absolute difference a rating change is reported as flat
pub const RATING_NEUTRAL_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sign {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "")]
    Flat,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
            Sign::Flat => "",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Positive,
    Negative,
    Neutral,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Positive => "positive",
            Trend::Negative => "negative",
            Trend::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which direction of movement counts as an improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    HigherIsBetter,
    /// e.g. delivery time
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Change {
    pub percent_change: f64,
    pub sign: Sign,
    pub trend: Trend,
}

impl Change {
    pub const NEUTRAL: Change = Change {
        percent_change: 0.0,
        sign: Sign::Flat,
        trend: Trend::Neutral,
    };

    /// Build a change from a signed raw delta and a rounded magnitude.
    fn directional(raw: f64, magnitude: f64, polarity: Polarity) -> Self {
        if raw == 0.0 || magnitude == 0.0 {
            return Change::NEUTRAL;
        }
        let improved = match polarity {
            Polarity::HigherIsBetter => raw > 0.0,
            Polarity::LowerIsBetter => raw < 0.0,
        };
        Change {
            percent_change: magnitude,
            sign: if improved { Sign::Plus } else { Sign::Minus },
            trend: if improved {
                Trend::Positive
            } else {
                Trend::Negative
            },
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.trend == Trend::Neutral
    }
}

/// Relative change from `previous` to `current`.
///
/// A zero `previous` yields the neutral change whatever `current` is, so a
/// metric with no baseline reads as "no change".
pub fn percent_change(current: f64, previous: f64, polarity: Polarity) -> Change {
    if previous == 0.0 {
        return Change::NEUTRAL;
    }
    let raw = (current - previous) / previous * 100.0;
    Change::directional(raw, round1(raw.abs()), polarity)
}

/// Round to one decimal place.
///
/// Rounds the exact binary value, with exact ties going to the even digit:
/// 0.25 becomes 0.2 and 0.35 (stored just below) becomes 0.3.
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// A KPI value for both weeks and the change between them.
///
/// `None` marks a mean over no rows; a comparison missing either side is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub current: Option<f64>,
    pub previous: Option<f64>,
    #[serde(flatten)]
    pub change: Change,
}

impl Comparison {
    pub fn between(current: Option<f64>, previous: Option<f64>, polarity: Polarity) -> Self {
        let change = match (current, previous) {
            (Some(c), Some(p)) => percent_change(c, p, polarity),
            _ => Change::NEUTRAL,
        };
        Self {
            current,
            previous,
            change,
        }
    }

    pub fn of_totals(current: f64, previous: f64) -> Self {
        Self::between(Some(current), Some(previous), Polarity::HigherIsBetter)
    }

    /// Absolute difference of the two values, when both exist
    pub fn abs_difference(&self) -> Option<f64> {
        Some((self.current? - self.previous?).abs())
    }
}

/// Average rating compared by absolute difference rather than percentage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingComparison {
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub difference: f64,
    pub sign: Sign,
    pub trend: Trend,
}

pub fn rating_change(current: Option<f64>, previous: Option<f64>) -> RatingComparison {
    let neutral = RatingComparison {
        current,
        previous,
        difference: 0.0,
        sign: Sign::Flat,
        trend: Trend::Neutral,
    };
    let (Some(c), Some(p)) = (current, previous) else {
        return neutral;
    };

    // snap so that decimal differences like 3.05 - 3.0 land on the threshold
    let diff = ((c - p) * 1e9).round() / 1e9;
    if diff.abs() < RATING_NEUTRAL_THRESHOLD {
        return neutral;
    }

    let change = Change::directional(diff, round1(diff.abs()), Polarity::HigherIsBetter);
    RatingComparison {
        difference: change.percent_change,
        sign: change.sign,
        trend: change.trend,
        ..neutral
    }
}
