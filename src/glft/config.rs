use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fs, path::Path, path::PathBuf};

/// What to do once the arrival history reaches `history_capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOverflow {
    /// Report `HistoryCapacityExceeded` and stop the run.
    Fail,
    /// Drop everything older than the calibration window and keep going.
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlftConfig {
    /// Risk aversion used inside the intensity term (ξ).
    #[serde(default = "default_xi")]
    pub xi: f64,
    /// Inventory penalty weight (γ).
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Depth scale in ticks (δ).
    #[serde(default = "default_delta")]
    pub delta: f64,
    #[serde(default = "default_max_position")]
    pub max_position: f64,
    #[serde(default = "default_order_qty")]
    pub order_qty: f64,
    /// Calibration window W, in steps.
    #[serde(default = "default_window")]
    pub calibration_window: usize,
    /// Calibration cadence N, in steps.
    #[serde(default = "default_cadence")]
    pub calibration_cadence: usize,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_history_overflow")]
    pub history_overflow: HistoryOverflow,
    /// Multiplier turning per-step mid-change deviation into the reporting unit.
    #[serde(default = "default_vol_normalization")]
    pub volatility_normalization: f64,
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    #[serde(default = "default_histogram_buckets")]
    pub histogram_buckets: usize,
    #[serde(default = "default_fit_buckets")]
    pub fit_buckets: usize,
    #[serde(default)]
    pub stats_csv_path: Option<PathBuf>,
}

fn default_xi() -> f64 {
    0.05
}

fn default_gamma() -> f64 {
    0.05
}

fn default_delta() -> f64 {
    1.0
}

fn default_max_position() -> f64 {
    5.0
}

fn default_order_qty() -> f64 {
    1.0
}

fn default_window() -> usize {
    6_000
}

fn default_cadence() -> usize {
    50
}

fn default_history_capacity() -> usize {
    10_000_000
}

fn default_history_overflow() -> HistoryOverflow {
    HistoryOverflow::Fail
}

fn default_vol_normalization() -> f64 {
    10.0_f64.sqrt()
}

fn default_step_ms() -> u64 {
    100
}

fn default_histogram_buckets() -> usize {
    500
}

fn default_fit_buckets() -> usize {
    70
}

impl Default for GlftConfig {
    fn default() -> Self {
        Self {
            xi: default_xi(),
            gamma: default_gamma(),
            delta: default_delta(),
            max_position: default_max_position(),
            order_qty: default_order_qty(),
            calibration_window: default_window(),
            calibration_cadence: default_cadence(),
            history_capacity: default_history_capacity(),
            history_overflow: default_history_overflow(),
            volatility_normalization: default_vol_normalization(),
            step_ms: default_step_ms(),
            histogram_buckets: default_histogram_buckets(),
            fit_buckets: default_fit_buckets(),
            stats_csv_path: None,
        }
    }
}

impl GlftConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;
        Self::from_toml_str(&data)
    }

    /// Parses either top-level keys or a nested `[glft]` table, then applies
    /// `GLFT_*` environment overrides and validates the result.
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let raw: toml::Value = toml::from_str(data).with_context(|| "Failed to parse TOML config")?;
        let value = match raw.get("glft") {
            Some(table @ toml::Value::Table(_)) => table.clone(),
            _ => raw,
        };
        let mut cfg: GlftConfig = value
            .try_into()
            .with_context(|| "Invalid glft config structure")?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        override_f64("GLFT_XI", &mut self.xi);
        override_f64("GLFT_GAMMA", &mut self.gamma);
        override_f64("GLFT_DELTA", &mut self.delta);
        override_f64("GLFT_MAX_POSITION", &mut self.max_position);
        override_f64("GLFT_ORDER_QTY", &mut self.order_qty);
        override_usize("GLFT_CALIBRATION_WINDOW", &mut self.calibration_window);
        override_usize("GLFT_CALIBRATION_CADENCE", &mut self.calibration_cadence);
        override_usize("GLFT_HISTORY_CAPACITY", &mut self.history_capacity);
        override_f64(
            "GLFT_VOLATILITY_NORMALIZATION",
            &mut self.volatility_normalization,
        );
        override_u64("GLFT_STEP_MS", &mut self.step_ms);
        override_usize("GLFT_HISTOGRAM_BUCKETS", &mut self.histogram_buckets);
        override_usize("GLFT_FIT_BUCKETS", &mut self.fit_buckets);
        if let Ok(value) = env::var("GLFT_HISTORY_OVERFLOW") {
            match value.to_ascii_lowercase().as_str() {
                "fail" => self.history_overflow = HistoryOverflow::Fail,
                "compact" => self.history_overflow = HistoryOverflow::Compact,
                _ => {}
            }
        }
        if let Ok(value) = env::var("GLFT_STATS_CSV_PATH") {
            self.stats_csv_path = Some(PathBuf::from(value));
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.xi.is_finite() && self.xi > 0.0,
            "xi must be a positive finite number"
        );
        anyhow::ensure!(
            self.gamma.is_finite() && self.gamma > 0.0,
            "gamma must be a positive finite number"
        );
        anyhow::ensure!(
            self.delta.is_finite() && self.delta > 0.0,
            "delta must be a positive finite number"
        );
        anyhow::ensure!(
            self.max_position > 0.0,
            "max_position must be greater than zero"
        );
        anyhow::ensure!(self.order_qty > 0.0, "order_qty must be greater than zero");
        anyhow::ensure!(
            self.calibration_window >= 2,
            "calibration_window must be at least 2 steps"
        );
        anyhow::ensure!(
            self.calibration_cadence >= 1,
            "calibration_cadence must be at least 1 step"
        );
        anyhow::ensure!(
            self.history_capacity >= self.calibration_window,
            "history_capacity must be >= calibration_window"
        );
        anyhow::ensure!(
            self.history_overflow == HistoryOverflow::Fail
                || self.history_capacity > self.calibration_window,
            "history_overflow = compact needs history_capacity > calibration_window"
        );
        anyhow::ensure!(
            self.volatility_normalization.is_finite() && self.volatility_normalization > 0.0,
            "volatility_normalization must be a positive finite number"
        );
        anyhow::ensure!(self.step_ms > 0, "step_ms must be greater than zero");
        anyhow::ensure!(
            self.histogram_buckets >= 2,
            "histogram_buckets must be at least 2"
        );
        anyhow::ensure!(
            (2..=self.histogram_buckets).contains(&self.fit_buckets),
            "fit_buckets must be between 2 and histogram_buckets"
        );
        Ok(())
    }

    pub fn step_duration_secs(&self) -> f64 {
        self.step_ms as f64 / 1_000.0
    }

    pub fn step_duration_ns(&self) -> i64 {
        (self.step_ms as i64).saturating_mul(1_000_000)
    }

    /// Seconds of trading covered by one calibration window.
    pub fn window_secs(&self) -> f64 {
        self.calibration_window as f64 * self.step_duration_secs()
    }
}

fn override_f64(key: &str, field: &mut f64) {
    if let Ok(value) = env::var(key) {
        if let Ok(parsed) = value.parse::<f64>() {
            *field = parsed;
        }
    }
}

fn override_usize(key: &str, field: &mut usize) {
    if let Ok(value) = env::var(key) {
        if let Ok(parsed) = value.parse::<usize>() {
            *field = parsed;
        }
    }
}

fn override_u64(key: &str, field: &mut u64) {
    if let Ok(value) = env::var(key) {
        if let Ok(parsed) = value.parse::<u64>() {
            *field = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = GlftConfig::default();
        assert!(cfg.validate().is_ok());
        assert!((cfg.window_secs() - 600.0).abs() < 1e-9);
        assert_eq!(cfg.step_duration_ns(), 100_000_000);
        assert!((cfg.volatility_normalization - 10.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_nested_table_is_parsed() {
        let cfg = GlftConfig::from_toml_str(
            r#"
            [glft]
            gamma = 0.1
            delta = 2.0
            calibration_window = 100
            calibration_cadence = 10
            history_overflow = "compact"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.gamma, 0.1);
        assert_eq!(cfg.delta, 2.0);
        assert_eq!(cfg.calibration_window, 100);
        assert_eq!(cfg.calibration_cadence, 10);
        assert_eq!(cfg.history_overflow, HistoryOverflow::Compact);
        assert_eq!(cfg.fit_buckets, 70);
    }

    #[test]
    fn test_top_level_keys_are_parsed() {
        let cfg = GlftConfig::from_toml_str("max_position = 12.5\norder_qty = 0.5\n").unwrap();
        assert_eq!(cfg.max_position, 12.5);
        assert_eq!(cfg.order_qty, 0.5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(GlftConfig::from_toml_str("delta = 0.0").is_err());
        assert!(GlftConfig::from_toml_str("calibration_cadence = 0").is_err());
        assert!(
            GlftConfig::from_toml_str("calibration_window = 100\nhistory_capacity = 50").is_err()
        );
        assert!(GlftConfig::from_toml_str("fit_buckets = 600").is_err());
    }
}
