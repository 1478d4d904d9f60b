//! Run configuration: inputs, output layout and chart styling

use std::path::{Path, PathBuf};

use plotters::style::RGBColor;

use crate::loader::InputPaths;
use crate::metrics::DEFAULT_TOP_CATEGORIES;

/// Colour palette shared by the charts and the report stylesheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub primary: RGBColor,
    pub secondary: RGBColor,
    pub accent: RGBColor,
    pub background: RGBColor,
    pub highlight: RGBColor,
    pub positive: RGBColor,
    pub negative: RGBColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: RGBColor(0x26, 0x3A, 0x47),
            secondary: RGBColor(0x44, 0x5B, 0x6A),
            accent: RGBColor(0x72, 0x84, 0x95),
            background: RGBColor(0x98, 0xA9, 0xBE),
            highlight: RGBColor(0x84, 0xC5, 0xDB),
            positive: RGBColor(0x27, 0xAE, 0x60),
            negative: RGBColor(0xE7, 0x4C, 0x3C),
        }
    }
}

/// Chart appearance, passed explicitly to every render call
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub palette: Palette,
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub title_size: f64,
    pub label_size: f64,
    pub tick_size: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            width: 1000,
            height: 600,
            font_family: "sans-serif".to_string(),
            title_size: 24.0,
            label_size: 16.0,
            tick_size: 13.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub inputs: InputPaths,
    /// Root directory; reports and plots go in subdirectories
    pub output_dir: PathBuf,
    pub top_categories: usize,
    pub chart_style: ChartStyle,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            inputs: InputPaths::default(),
            output_dir: PathBuf::from("data"),
            top_categories: DEFAULT_TOP_CATEGORIES,
            chart_style: ChartStyle::default(),
        }
    }
}

impl ReportConfig {
    pub fn new(inputs: InputPaths, output_dir: impl AsRef<Path>) -> Self {
        Self {
            inputs,
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_top_categories(mut self, n: usize) -> Self {
        self.top_categories = n;
        self
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.output_dir.join("assets").join("plots")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_layout() {
        let config = ReportConfig::new(InputPaths::default(), "/tmp/out").with_top_categories(5);
        assert_eq!(config.reports_dir(), PathBuf::from("/tmp/out/reports"));
        assert_eq!(config.plots_dir(), PathBuf::from("/tmp/out/assets/plots"));
        assert_eq!(config.top_categories, 5);
    }

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.top_categories, 3);
        assert_eq!(config.chart_style.palette.primary, RGBColor(0x26, 0x3A, 0x47));
    }
}
