//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::chart::style::{StyleConfig, MAX_GRIDLINE_COUNT};
use crate::error::{DashboardError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Device connection configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Chart surface configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_margin")]
    pub margin: f64,

    #[serde(default)]
    pub style: StyleConfig,
}

/// Sweep log export configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: String,

    #[serde(default = "default_export_prefix")]
    pub prefix: String,
}

/// Log output configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for daily-rotated log files; empty logs to stdout only
    #[serde(default)]
    pub dir: String,
}

// Default value functions
fn default_url() -> String { crate::connection::websocket::DEFAULT_DEVICE_URL.to_string() }
fn default_reconnect_delay_ms() -> u64 { 2000 }
fn default_debounce_ms() -> u64 { 500 }

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 480 }
fn default_margin() -> f64 { crate::chart::geometry::DEFAULT_MARGIN }

fn default_export_dir() -> String { ".".to_string() }
fn default_export_prefix() -> String { crate::sampler::DEFAULT_EXPORT_PREFIX.to_string() }

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            margin: default_margin(),
            style: StyleConfig::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
            prefix: default_export_prefix(),
        }
    }
}

impl ConnectionConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sweep_dash::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let url = &self.connection.url;
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(invalid(format!("connection url must start with ws:// or wss://, got {:?}", url)));
        }

        if self.connection.reconnect_delay_ms == 0 || self.connection.reconnect_delay_ms > 60000 {
            return Err(invalid("reconnect_delay_ms must be between 1 and 60000"));
        }

        if self.connection.debounce_ms == 0 || self.connection.debounce_ms > 10000 {
            return Err(invalid("debounce_ms must be between 1 and 10000"));
        }

        if !self.chart.margin.is_finite() || self.chart.margin < 0.0 {
            return Err(invalid("chart margin must be a non-negative number"));
        }

        // The plot area must not be empty
        let min_side = 2.0 * self.chart.margin;
        if f64::from(self.chart.width) <= min_side || f64::from(self.chart.height) <= min_side {
            return Err(invalid(format!(
                "chart width and height must exceed twice the margin ({})",
                min_side
            )));
        }

        if let Some(count) = self.chart.style.gridline_count {
            if count > MAX_GRIDLINE_COUNT {
                return Err(invalid(format!(
                    "gridline_count must be at most {} (0 uses the default)",
                    MAX_GRIDLINE_COUNT
                )));
            }
        }

        if self.export.dir.is_empty() {
            return Err(invalid("export dir cannot be empty"));
        }

        if self.export.prefix.contains(['/', '\\']) {
            return Err(invalid("export prefix cannot contain path separators"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> DashboardError {
    DashboardError::Config(toml::de::Error::custom(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.connection.url, "ws://42.42.42.42/ws");
        assert_eq!(config.connection.reconnect_delay(), Duration::from_millis(2000));
        assert_eq!(config.connection.debounce(), Duration::from_millis(500));
        assert_eq!(config.chart.margin, 50.0);
        assert_eq!(config.export.prefix, "log");
        assert!(config.logging.dir.is_empty());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml("").expect("empty config should be valid");
        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.height, 480);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
[connection]
url = "ws://192.168.4.1/ws"

[chart.style]
gridline_count = 10
line_color = "lime"
"#,
        )
        .unwrap();

        assert_eq!(config.connection.url, "ws://192.168.4.1/ws");
        assert_eq!(config.connection.reconnect_delay_ms, 2000, "Unset keys keep defaults");
        assert_eq!(config.chart.style.gridline_count, Some(10));
        assert_eq!(config.chart.style.line_color.as_deref(), Some("lime"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let result = Config::from_toml("[connection]\nurl = \"http://device/ws\"\n");
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_invalid_timings() {
        assert!(Config::from_toml("[connection]\nreconnect_delay_ms = 0\n").is_err());
        assert!(Config::from_toml("[connection]\ndebounce_ms = 0\n").is_err());
        assert!(Config::from_toml("[connection]\ndebounce_ms = 20000\n").is_err());
    }

    #[test]
    fn test_chart_too_small_for_margin() {
        let result = Config::from_toml("[chart]\nwidth = 100\nheight = 400\n");
        assert!(result.is_err(), "100px leaves no plot area with a 50px margin");
    }

    #[test]
    fn test_gridline_count_is_capped() {
        assert!(Config::from_toml("[chart.style]\ngridline_count = 100\n").is_ok());
        assert!(Config::from_toml("[chart.style]\ngridline_count = 0\n").is_ok(), "0 falls back to 5");

        let result = Config::from_toml("[chart.style]\ngridline_count = 4000000000\n");
        assert!(matches!(result, Err(DashboardError::Config(_))), "Huge counts would flood every redraw");
    }

    #[test]
    fn test_invalid_export_prefix() {
        assert!(Config::from_toml("[export]\nprefix = \"../log\"\n").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(Config::from_toml("[connection"), Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[connection]
url = "ws://10.0.0.2/ws"
debounce_ms = 250

[export]
dir = "./sweeps"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).expect("config should load");
        assert_eq!(config.connection.debounce_ms, 250);
        assert_eq!(config.export.dir, "./sweeps");
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = Config::from_toml(include_str!("../config/default.toml")).unwrap();
        assert_eq!(config.connection.url, Config::default().connection.url);
        assert_eq!(config.chart.style.tipline_dash, Some(vec![5.0, 5.0]));
        assert_eq!(config.chart.style.gridline_dash, Some(vec![]));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/sweep-dash.toml");
        assert!(matches!(result, Err(DashboardError::Io(_))));
    }
}
