//! GLFT (Guéant–Lehalle–Fernandez-Tapia) market making.
//!
//! `GlftStrategy` ties together arrival-intensity tracking, periodic (A, k)
//! calibration, volatility estimation, the closed-form quote engine and
//! order reconciliation against an [`ExecutionHarness`].

pub mod calibration;
pub mod config;
pub mod execution;
pub mod intensity;
#[cfg(test)]
pub(crate) mod mock;
pub mod recorder;
pub mod spreads;
pub mod strategy;
pub mod types;
pub mod volatility;

pub use calibration::{linear_regression, IntensityCalibrator, IntensityFit};
pub use config::{GlftConfig, HistoryOverflow};
pub use execution::{ExecutionHarness, OrderLifecycleManager};
pub use intensity::{measure_trading_intensity, ArrivalIntensityTracker};
pub use recorder::{CsvStatsRecorder, JsonLinesStatsRecorder, StatsRecorder};
pub use strategy::GlftStrategy;
pub use types::{BookTicks, CalibrationState, QuotePair, RunSummary, StepStats};
pub use volatility::VolatilityEstimator;
