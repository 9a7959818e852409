//! GLFT market maker stepped against a synthetic random-walk market.
//!
//! Loads `glft.toml` when present (or the path in `GLFT_CONFIG`), otherwise
//! runs on defaults with a shorter calibration window so quoting starts
//! within the generated session. Per-step statistics are written to
//! `GLFT_STATS_CSV_PATH` or `logs/glft/session-<ts>.csv`; set
//! `GLFT_STATS_FORMAT=jsonl` for one JSON object per line instead.

use anyhow::{Context, Result};
use glft_quoter::{
    glft::{
        CsvStatsRecorder, ExecutionHarness, GlftConfig, GlftStrategy, JsonLinesStatsRecorder,
        StatsRecorder,
    },
    OrderId, OrderStatus, PublicTrade, RestingOrder, Side, TimeInForce,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::HashMap,
    fs::{create_dir_all, File},
    io::BufWriter,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::info;

/// Random-walk book with Poisson-like market orders whose depth beyond the
/// touch decays geometrically. Resting orders fill when a trade reaches them.
struct RandomWalkHarness {
    rng: StdRng,
    steps_left: usize,
    best_bid_tick: i64,
    tick_size: f64,
    trades: Vec<PublicTrade>,
    orders: HashMap<OrderId, RestingOrder>,
    position: f64,
    fills: usize,
}

impl RandomWalkHarness {
    fn new(steps: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            steps_left: steps,
            best_bid_tick: 10_000,
            tick_size: 0.01,
            trades: Vec::new(),
            orders: HashMap::new(),
            position: 0.0,
            fills: 0,
        }
    }

    fn print_trade(&mut self, side: Side) {
        let mut depth = 0i64;
        while depth < 20 && self.rng.gen_bool(0.55) {
            depth += 1;
        }
        let tick = match side {
            Side::Buy => self.best_bid_tick + 1 + depth,
            Side::Sell => self.best_bid_tick - depth,
        };
        let price = tick as f64 * self.tick_size;
        self.trades.push(PublicTrade::new(side, price, 1.0));

        for order in self.orders.values_mut() {
            if !order.is_active() {
                continue;
            }
            let hit = match (side, order.side) {
                (Side::Buy, Side::Sell) => order.price <= price,
                (Side::Sell, Side::Buy) => order.price >= price,
                _ => false,
            };
            if hit {
                order.status = OrderStatus::Filled;
                self.fills += 1;
                match order.side {
                    Side::Buy => self.position += order.qty,
                    Side::Sell => self.position -= order.qty,
                }
            }
        }
    }

    fn submit(&mut self, side: Side, order_id: OrderId, price: f64, qty: f64) {
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
    }
}

impl ExecutionHarness for RandomWalkHarness {
    fn elapse(&mut self, _duration_ns: i64) -> bool {
        if self.steps_left == 0 {
            return false;
        }
        self.steps_left -= 1;
        let arrivals = self.rng.gen_range(0..3);
        for _ in 0..arrivals {
            let side = if self.rng.gen_bool(0.5) {
                Side::Buy
            } else {
                Side::Sell
            };
            self.print_trade(side);
        }
        self.best_bid_tick += self.rng.gen_range(-1..=1);
        true
    }

    fn best_bid_tick(&self) -> i64 {
        self.best_bid_tick
    }

    fn best_ask_tick(&self) -> i64 {
        self.best_bid_tick + 1
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
            Some(order) if order.is_active() => {
                order.status = OrderStatus::Cancelled;
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
        _time_in_force: TimeInForce,
    ) -> glft_quoter::Result<()> {
        self.submit(Side::Buy, order_id, price, qty);
        Ok(())
    }

    fn submit_sell_order(
        &mut self,
        order_id: OrderId,
        price: f64,
        qty: f64,
        _time_in_force: TimeInForce,
    ) -> glft_quoter::Result<()> {
        self.submit(Side::Sell, order_id, price, qty);
        Ok(())
    }

    fn clear_inactive_orders(&mut self) {
        self.orders.retain(|_, order| order.is_active());
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config_path =
        PathBuf::from(std::env::var("GLFT_CONFIG").unwrap_or_else(|_| "glft.toml".to_string()));
    let config = load_config(&config_path)?;
    let steps: usize = std::env::var("GLFT_DEMO_STEPS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(config.calibration_window * 5);

    let json_lines = std::env::var("GLFT_STATS_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("jsonl"))
        .unwrap_or(false);
    let stats_path = config.stats_csv_path.clone().unwrap_or_else(|| {
        let session_ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let ext = if json_lines { "jsonl" } else { "csv" };
        PathBuf::from(format!("logs/glft/session-{session_ts}.{ext}"))
    });
    let mut recorder: Box<dyn StatsRecorder> = if json_lines {
        if let Some(parent) = stats_path.parent() {
            create_dir_all(parent)?;
        }
        let file = File::create(&stats_path).context("failed to create stats file")?;
        Box::new(JsonLinesStatsRecorder::new(BufWriter::new(file)))
    } else {
        Box::new(
            CsvStatsRecorder::new(&stats_path).context("failed to initialise stats recorder")?,
        )
    };

    info!(
        steps,
        window = config.calibration_window,
        cadence = config.calibration_cadence,
        stats = %stats_path.display(),
        "starting synthetic backtest"
    );

    let mut harness = RandomWalkHarness::new(steps, 42);
    let mut strategy = GlftStrategy::new(config)?;
    let summary = strategy.run(&mut harness, recorder.as_mut())?;

    info!(
        fills = harness.fills,
        position = harness.position,
        a = summary.final_state.a,
        k = summary.final_state.k,
        volatility = summary.final_state.volatility,
        "backtest complete"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn load_config(path: &Path) -> Result<GlftConfig> {
    if path.exists() {
        return GlftConfig::from_file(path);
    }
    let config = GlftConfig {
        calibration_window: 600,
        calibration_cadence: 50,
        ..GlftConfig::default()
    };
    config.validate()?;
    Ok(config)
}

fn init_tracing() {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .finish(),
    )
    .is_err()
    {
        // Tracing already initialised elsewhere.
    }
}
