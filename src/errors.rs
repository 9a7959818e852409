use thiserror::Error;

use crate::types::OrderId;

pub type Result<T> = std::result::Result<T, GlftError>;

#[derive(Debug, Error)]
pub enum GlftError {
    #[error("history capacity {capacity} exceeded; run horizon is longer than the configured buffer")]
    HistoryCapacityExceeded { capacity: usize },
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),
    #[error("invalid calibration: A={a}, k={k}")]
    InvalidCalibration { a: f64, k: f64 },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("order {order_id} rejected by harness: {reason}")]
    OrderRejected { order_id: OrderId, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GlftError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        GlftError::DegenerateFit(reason.into())
    }

    /// True for failures that leave the calibration state untouched and
    /// should not abort a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GlftError::DegenerateFit(_) | GlftError::InvalidCalibration { .. }
        )
    }
}
