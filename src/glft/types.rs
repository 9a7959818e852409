use serde::Serialize;

/// Fitted intensity decay (A, k) and volatility currently used for quoting.
///
/// Every field is NaN until the first successful calibration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CalibrationState {
    pub a: f64,
    pub k: f64,
    pub volatility: f64,
    /// Step at which (A, k) were last refitted.
    pub calibrated_at: Option<usize>,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            a: f64::NAN,
            k: f64::NAN,
            volatility: f64::NAN,
            calibrated_at: None,
        }
    }
}

impl CalibrationState {
    pub fn is_calibrated(&self) -> bool {
        self.a.is_finite() && self.k.is_finite() && self.volatility.is_finite()
    }
}

/// GLFT coefficients derived from (ξ, γ, δ, A, k).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coefficients {
    pub c1: f64,
    pub c2: f64,
}

/// Top of book in ticks plus the mid the quotes are centred on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BookTicks {
    pub best_bid_tick: i64,
    pub best_ask_tick: i64,
    pub mid_tick: f64,
    pub tick_size: f64,
}

impl BookTicks {
    pub fn new(best_bid_tick: i64, best_ask_tick: i64, tick_size: f64) -> Self {
        Self {
            best_bid_tick,
            best_ask_tick,
            mid_tick: (best_bid_tick + best_ask_tick) as f64 / 2.0,
            tick_size,
        }
    }
}

/// Output of the quote engine for one step. A NaN price means the side is
/// not quoted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QuotePair {
    pub half_spread: f64,
    pub skew: f64,
    pub bid_price: f64,
    pub ask_price: f64,
}

impl QuotePair {
    pub fn suppressed() -> Self {
        Self {
            half_spread: f64::NAN,
            skew: f64::NAN,
            bid_price: f64::NAN,
            ask_price: f64::NAN,
        }
    }

    pub fn bid(&self) -> Option<f64> {
        self.bid_price.is_finite().then_some(self.bid_price)
    }

    pub fn ask(&self) -> Option<f64> {
        self.ask_price.is_finite().then_some(self.ask_price)
    }
}

/// Per-step record handed to the statistics recorder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StepStats {
    pub step: usize,
    pub half_spread: f64,
    pub skew: f64,
    pub volatility: f64,
    pub a: f64,
    pub k: f64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub position: f64,
}

/// Counts of what the order manager did during one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub cancelled: usize,
    pub submitted: usize,
}

/// Totals for a whole run.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RunSummary {
    pub steps: usize,
    pub calibrations: usize,
    pub failed_calibrations: usize,
    pub orders_submitted: usize,
    pub orders_cancelled: usize,
    pub final_state: CalibrationState,
}
