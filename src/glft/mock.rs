//! In-memory harness for unit tests.

use super::execution::ExecutionHarness;
use crate::{
    errors::{GlftError, Result},
    types::{OrderId, OrderStatus, PublicTrade, RestingOrder, Side, TimeInForce},
};
use std::collections::{HashMap, VecDeque};

#[derive(Clone, Debug)]
pub(crate) struct MockTick {
    pub best_bid_tick: i64,
    pub best_ask_tick: i64,
    pub trades: Vec<PublicTrade>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Submission {
    pub order_id: OrderId,
    pub side: Side,
    pub price: f64,
    pub qty: f64,
    pub time_in_force: TimeInForce,
}

/// Replays scripted ticks. Resting orders never fill on their own; tests
/// call [`MockHarness::fill`] to simulate executions.
#[derive(Debug)]
pub(crate) struct MockHarness {
    pub best_bid_tick: i64,
    pub best_ask_tick: i64,
    pub tick_size: f64,
    pub position: f64,
    pub trades: Vec<PublicTrade>,
    pub ticks: VecDeque<MockTick>,
    pub orders: HashMap<OrderId, RestingOrder>,
    pub cancels: Vec<OrderId>,
    pub submissions: Vec<Submission>,
    pub reject_submissions: bool,
    pub elapsed_ns: i64,
}

impl MockHarness {
    pub fn new(best_bid_tick: i64, best_ask_tick: i64, tick_size: f64) -> Self {
        Self {
            best_bid_tick,
            best_ask_tick,
            tick_size,
            position: 0.0,
            trades: Vec::new(),
            ticks: VecDeque::new(),
            orders: HashMap::new(),
            cancels: Vec::new(),
            submissions: Vec::new(),
            reject_submissions: false,
            elapsed_ns: 0,
        }
    }

    pub fn push_tick(&mut self, best_bid_tick: i64, best_ask_tick: i64, trades: Vec<PublicTrade>) {
        self.ticks.push_back(MockTick {
            best_bid_tick,
            best_ask_tick,
            trades,
        });
    }

    pub fn insert_order(&mut self, order_id: OrderId, side: Side, price: f64, cancellable: bool) {
        self.orders.insert(
            order_id,
            RestingOrder {
                order_id,
                side,
                price,
                qty: 1.0,
                status: OrderStatus::Active,
                cancellable,
            },
        );
    }

    pub fn fill(&mut self, order_id: OrderId) {
        if let Some(order) = self.orders.get_mut(&order_id) {
            if order.is_active() {
                order.status = OrderStatus::Filled;
                match order.side {
                    Side::Buy => self.position += order.qty,
                    Side::Sell => self.position -= order.qty,
                }
            }
        }
    }

    fn submit(
        &mut self,
        side: Side,
        order_id: OrderId,
        price: f64,
        qty: f64,
        time_in_force: TimeInForce,
    ) -> Result<()> {
        if self.reject_submissions {
            return Err(GlftError::OrderRejected {
                order_id,
                reason: "mock rejection".to_string(),
            });
        }
        self.submissions.push(Submission {
            order_id,
            side,
            price,
            qty,
            time_in_force,
        });
        self.orders.insert(
            order_id,
            RestingOrder {
                order_id,
                side,
                price,
                qty,
                status: OrderStatus::Active,
                cancellable: true,
            },
        );
        Ok(())
    }
}

impl ExecutionHarness for MockHarness {
    fn elapse(&mut self, duration_ns: i64) -> bool {
        match self.ticks.pop_front() {
            Some(tick) => {
                self.elapsed_ns += duration_ns;
                self.best_bid_tick = tick.best_bid_tick;
                self.best_ask_tick = tick.best_ask_tick;
                self.trades.extend(tick.trades);
                true
            }
            None => false,
        }
    }

    fn best_bid_tick(&self) -> i64 {
        self.best_bid_tick
    }

    fn best_ask_tick(&self) -> i64 {
        self.best_ask_tick
    }

    fn tick_size(&self) -> f64 {
        self.tick_size
    }

    fn last_trades(&self) -> &[PublicTrade] {
        &self.trades
    }

    fn clear_last_trades(&mut self) {
        self.trades.clear();
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn orders(&self) -> &HashMap<OrderId, RestingOrder> {
        &self.orders
    }

    fn cancel(&mut self, order_id: OrderId) -> bool {
        match self.orders.get_mut(&order_id) {
            Some(order) if order.is_active() && order.cancellable => {
                order.status = OrderStatus::Cancelled;
                self.cancels.push(order_id);
                true
            }
            _ => false,
        }
    }

    fn submit_buy_order(
        &mut self,
        order_id: OrderId,
        price: f64,
        qty: f64,
        time_in_force: TimeInForce,
    ) -> Result<()> {
        self.submit(Side::Buy, order_id, price, qty, time_in_force)
    }

    fn submit_sell_order(
        &mut self,
        order_id: OrderId,
        price: f64,
        qty: f64,
        time_in_force: TimeInForce,
    ) -> Result<()> {
        self.submit(Side::Sell, order_id, price, qty, time_in_force)
    }

    fn clear_inactive_orders(&mut self) {
        self.orders.retain(|_, order| order.is_active());
    }
}
