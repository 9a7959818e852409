use super::types::{QuotePair, ReconcileOutcome};
use crate::{
    errors::{GlftError, Result},
    types::{OrderId, PublicTrade, RestingOrder, Side, TimeInForce},
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The market simulator / execution venue the strategy is stepped against.
///
/// The harness owns the clock, the book, the trade tape and every order;
/// the strategy only observes them and issues cancel/submit requests.
pub trait ExecutionHarness {
    /// Advances the clock. Returns `false` once the data is exhausted.
    fn elapse(&mut self, duration_ns: i64) -> bool;
    fn best_bid_tick(&self) -> i64;
    fn best_ask_tick(&self) -> i64;
    fn tick_size(&self) -> f64;
    /// Trades printed since the last `clear_last_trades`.
    fn last_trades(&self) -> &[PublicTrade];
    fn clear_last_trades(&mut self);
    /// Signed inventory.
    fn position(&self) -> f64;
    fn orders(&self) -> &HashMap<OrderId, RestingOrder>;
    /// Requests cancellation. Returns `false` when there was nothing to
    /// cancel (unknown, filled or already cancelled order).
    fn cancel(&mut self, order_id: OrderId) -> bool;
    fn submit_buy_order(
        &mut self,
        order_id: OrderId,
        price: f64,
        qty: f64,
        time_in_force: TimeInForce,
    ) -> Result<()>;
    fn submit_sell_order(
        &mut self,
        order_id: OrderId,
        price: f64,
        qty: f64,
        time_in_force: TimeInForce,
    ) -> Result<()>;
    /// Drops filled and cancelled orders from `orders`.
    fn clear_inactive_orders(&mut self);
}

/// Keeps at most one post-only order per side resting at the latest quote.
#[derive(Clone, Debug)]
pub struct OrderLifecycleManager {
    max_position: f64,
    order_qty: f64,
}

impl OrderLifecycleManager {
    pub fn new(max_position: f64, order_qty: f64) -> Self {
        Self {
            max_position,
            order_qty,
        }
    }

    /// Cancels every order whose price no longer matches its side's quote,
    /// then submits the missing quotes while inventory stays inside
    /// `±max_position`. Orders are keyed by price in ticks, so a level that
    /// already holds an order is never quoted twice.
    pub fn reconcile<H>(&self, harness: &mut H, quote: &QuotePair) -> Result<ReconcileOutcome>
    where
        H: ExecutionHarness + ?Sized,
    {
        let mut outcome = ReconcileOutcome::default();
        harness.clear_inactive_orders();

        let tick_size = harness.tick_size();
        let bid_key = quote.bid().map(|price| OrderId::from_price(price, tick_size));
        let ask_key = quote.ask().map(|price| OrderId::from_price(price, tick_size));

        let stale: Vec<OrderId> = harness
            .orders()
            .values()
            .filter(|order| order.cancellable)
            .filter(|order| {
                let target = match order.side {
                    Side::Buy => bid_key,
                    Side::Sell => ask_key,
                };
                target != Some(OrderId::from_price(order.price, tick_size))
            })
            .map(|order| order.order_id)
            .collect();

        for order_id in stale {
            if harness.cancel(order_id) {
                debug!(%order_id, "cancelled stale quote");
                outcome.cancelled += 1;
            }
        }

        let position = harness.position();
        if position < self.max_position {
            if let (Some(price), Some(key)) = (quote.bid(), bid_key) {
                if self.submit(harness, Side::Buy, key, price)? {
                    outcome.submitted += 1;
                }
            }
        }
        if position > -self.max_position {
            if let (Some(price), Some(key)) = (quote.ask(), ask_key) {
                if self.submit(harness, Side::Sell, key, price)? {
                    outcome.submitted += 1;
                }
            }
        }

        Ok(outcome)
    }

    fn submit<H>(&self, harness: &mut H, side: Side, key: OrderId, price: f64) -> Result<bool>
    where
        H: ExecutionHarness + ?Sized,
    {
        if harness.orders().contains_key(&key) {
            return Ok(false);
        }
        let result = match side {
            Side::Buy => {
                harness.submit_buy_order(key, price, self.order_qty, TimeInForce::GoodTillCrossing)
            }
            Side::Sell => {
                harness.submit_sell_order(key, price, self.order_qty, TimeInForce::GoodTillCrossing)
            }
        };
        match result {
            Ok(()) => {
                debug!(side = side.as_str(), order_id = %key, price, "submitted quote");
                Ok(true)
            }
            Err(err @ GlftError::OrderRejected { .. }) => {
                warn!(side = side.as_str(), order_id = %key, price, "quote rejected: {}", err);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
