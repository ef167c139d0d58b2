//! # Chart Style
//!
//! Named style parameters for the chart, each with a literal fallback.
//!
//! [`StyleConfig`] is what an external source supplies (every key optional,
//! values unchecked). [`ChartStyle::resolve`] turns it into concrete values
//! once per render; a missing, empty, zero or otherwise unusable value falls
//! back to the literal default.

use serde::Deserialize;

/// Default number of grid intervals per axis
pub const DEFAULT_GRIDLINE_COUNT: u32 = 5;

/// Largest accepted grid interval count per axis
pub const MAX_GRIDLINE_COUNT: u32 = 100;

/// Default crosshair dash pattern
pub const DEFAULT_TIPLINE_DASH: [f64; 2] = [5.0, 5.0];

/// Style keys as supplied by configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub gridline_count: Option<u32>,
    pub gridline_color: Option<String>,
    pub gridline_width: Option<f64>,
    pub gridline_dash: Option<Vec<f64>>,
    pub gridtext_color: Option<String>,
    pub gridtext_font: Option<String>,
    pub line_color: Option<String>,
    pub line_width: Option<f64>,
    pub line_dash: Option<Vec<f64>>,
    pub tipline_color: Option<String>,
    pub tipline_width: Option<f64>,
    pub tipline_dash: Option<Vec<f64>>,
}

/// Stroke parameters for a line
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    /// Alternating dash / gap lengths; empty means solid
    pub dash: Vec<f64>,
}

/// Fill parameters for text
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: String,
    /// CSS font shorthand, e.g. `14px Arial`
    pub font: String,
}

/// Fully resolved chart style
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub gridline_count: u32,
    pub grid: Stroke,
    pub grid_text: TextStyle,
    pub line: Stroke,
    pub crosshair: Stroke,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::resolve(&StyleConfig::default())
    }
}

impl ChartStyle {
    /// Resolve configured values against the literal fallbacks
    ///
    /// # Examples
    ///
    /// ```
    /// use sweep_dash::chart::style::{ChartStyle, StyleConfig};
    ///
    /// let style = ChartStyle::resolve(&StyleConfig {
    ///     line_color: Some("orange".to_string()),
    ///     gridline_count: Some(0), // unusable: falls back to 5
    ///     ..Default::default()
    /// });
    /// assert_eq!(style.line.color, "orange");
    /// assert_eq!(style.gridline_count, 5);
    /// ```
    pub fn resolve(config: &StyleConfig) -> Self {
        Self {
            gridline_count: config
                .gridline_count
                .filter(|&n| n > 0 && n <= MAX_GRIDLINE_COUNT)
                .unwrap_or(DEFAULT_GRIDLINE_COUNT),
            grid: Stroke {
                color: color_or(&config.gridline_color, "grey"),
                width: width_or(config.gridline_width, 1.0),
                dash: dash_or(&config.gridline_dash, &[]),
            },
            grid_text: TextStyle {
                color: color_or(&config.gridtext_color, "white"),
                font: color_or(&config.gridtext_font, "14px Arial"),
            },
            line: Stroke {
                color: color_or(&config.line_color, "white"),
                width: width_or(config.line_width, 2.0),
                dash: dash_or(&config.line_dash, &[]),
            },
            crosshair: Stroke {
                color: color_or(&config.tipline_color, "grey"),
                width: width_or(config.tipline_width, 2.0),
                dash: dash_or(&config.tipline_dash, &DEFAULT_TIPLINE_DASH),
            },
        }
    }
}

fn color_or(value: &Option<String>, fallback: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn width_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => fallback,
    }
}

fn dash_or(value: &Option<Vec<f64>>, fallback: &[f64]) -> Vec<f64> {
    match value {
        Some(dash) if dash.iter().all(|d| d.is_finite() && *d >= 0.0) => dash.clone(),
        _ => fallback.to_vec(),
    }
}
