use statrs::statistics::Statistics;

/// Rolling standard deviation of per-step mid-price changes, in ticks.
///
/// The raw deviation is per step; `normalization` rescales it to the unit
/// the quote engine expects (√10 turns 100 ms steps into ticks per √s).
#[derive(Clone, Debug)]
pub struct VolatilityEstimator {
    window: usize,
    normalization: f64,
}

impl VolatilityEstimator {
    pub fn new(window: usize, normalization: f64) -> Self {
        Self {
            window,
            normalization,
        }
    }

    /// Estimate over the latest `window` samples, skipping missing entries.
    /// Returns `None` when the window holds no usable sample.
    pub fn estimate(&self, mid_price_chg: &[Option<f64>]) -> Option<f64> {
        let start = mid_price_chg.len().saturating_sub(self.window);
        let samples: Vec<f64> = mid_price_chg[start..]
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if samples.is_empty() {
            return None;
        }
        let sigma = samples.iter().population_std_dev() * self.normalization;
        sigma.is_finite().then_some(sigma)
    }

    pub fn is_warmed_up(&self, available: usize) -> bool {
        available >= self.window
    }
}
