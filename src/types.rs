use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an order resting at the harness.
///
/// Orders submitted by the quoting core use the price expressed in ticks as
/// their id, so at most one order can rest on a given price level.
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OrderId(pub i64);

impl OrderId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Price-level key for `price`: the price rounded to the nearest tick.
    pub fn from_price(price: f64, tick_size: f64) -> Self {
        Self((price / tick_size).round() as i64)
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<OrderId> for i64 {
    fn from(value: OrderId) -> Self {
        value.into_inner()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    GoodTillCancel,
    /// Post-only: rejected by the venue instead of crossing the book.
    GoodTillCrossing,
    ImmediateOrCancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Active,
    Cancelled,
    Filled,
}

/// Snapshot of an order as observed at the harness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub order_id: OrderId,
    pub side: Side,
    pub price: f64,
    pub qty: f64,
    pub status: OrderStatus,
    pub cancellable: bool,
}

impl RestingOrder {
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }
}

/// Market trade printed since the previous step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicTrade {
    pub side: Side,
    pub price: f64,
    pub qty: f64,
}

impl PublicTrade {
    pub fn new(side: Side, price: f64, qty: f64) -> Self {
        Self { side, price, qty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_from_price_rounds_to_tick() {
        assert_eq!(OrderId::from_price(100.01, 0.01), OrderId::new(10001));
        assert_eq!(OrderId::from_price(99.999_999_9, 0.01), OrderId::new(10000));
        assert_eq!(i64::from(OrderId::new(7)), 7);
        assert_eq!(OrderId::new(42).to_string(), "42");
    }
}
