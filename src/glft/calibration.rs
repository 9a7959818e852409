use super::{config::GlftConfig, intensity::measure_trading_intensity};
use crate::errors::{GlftError, Result};

/// Ordinary least squares fit of `y = slope * x + intercept`.
///
/// Returns `(slope, intercept)`. Fails when the inputs differ in length,
/// hold fewer than two points, or `x` has no variance.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    if x.len() != y.len() {
        return Err(GlftError::degenerate(format!(
            "x has {} points but y has {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(GlftError::degenerate(format!(
            "need at least 2 points, got {}",
            x.len()
        )));
    }
    let n = x.len() as f64;
    let sx: f64 = x.iter().sum();
    let sy: f64 = y.iter().sum();
    let sx2: f64 = x.iter().map(|v| v * v).sum();
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();

    let denominator = n * sx2 - sx * sx;
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(GlftError::degenerate("x has zero variance"));
    }
    let slope = (n * sxy - sx * sy) / denominator;
    let intercept = (sy - slope * sx) / n;
    Ok((slope, intercept))
}

/// Decay parameters of `λ(d) = A·exp(−k·d)` fitted from one window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntensityFit {
    pub a: f64,
    pub k: f64,
    /// Buckets that carried a positive intensity and entered the fit.
    pub points: usize,
}

/// Refits (A, k) from the arrival-depth history on a fixed cadence.
#[derive(Clone, Debug)]
pub struct IntensityCalibrator {
    window: usize,
    cadence: usize,
    histogram_buckets: usize,
    fit_buckets: usize,
    window_secs: f64,
}

impl IntensityCalibrator {
    pub fn new(config: &GlftConfig) -> Self {
        Self {
            window: config.calibration_window,
            cadence: config.calibration_cadence,
            histogram_buckets: config.histogram_buckets,
            fit_buckets: config.fit_buckets,
            window_secs: config.window_secs(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Whether a refit is scheduled at `step` given `available` samples.
    pub fn is_due(&self, step: usize, available: usize) -> bool {
        available >= self.window && step % self.cadence == 0
    }

    /// Fits the most recent `window` depth samples.
    pub fn fit(&self, arrival_depth: &[Option<f64>]) -> Result<IntensityFit> {
        if arrival_depth.len() < self.window {
            return Err(GlftError::degenerate(format!(
                "history holds {} samples, window is {}",
                arrival_depth.len(),
                self.window
            )));
        }
        let samples = &arrival_depth[arrival_depth.len() - self.window..];
        let counts = measure_trading_intensity(samples, self.histogram_buckets);

        let (x, y): (Vec<f64>, Vec<f64>) = counts
            .iter()
            .take(self.fit_buckets)
            .enumerate()
            .filter_map(|(bucket, &count)| {
                let lambda = count as f64 / self.window_secs;
                (lambda > 0.0).then(|| (bucket as f64 + 0.5, lambda.ln()))
            })
            .unzip();

        if x.len() < 2 {
            return Err(GlftError::degenerate(format!(
                "only {} bucket(s) with positive intensity",
                x.len()
            )));
        }

        let (slope, intercept) = linear_regression(&x, &y)?;
        Ok(IntensityFit {
            a: intercept.exp(),
            k: -slope,
            points: x.len(),
        })
    }
}
