use super::{config::HistoryOverflow, types::BookTicks};
use crate::{
    errors::{GlftError, Result},
    types::{PublicTrade, Side},
};

/// Records, for every step, how far from the previous mid market orders
/// reached and how much the mid moved.
///
/// Depth is measured against the mid of the *previous* step so the tracker
/// never looks ahead. A buy printing below that mid (or a sell above it)
/// yields a negative depth; it is stored as-is and later discarded by the
/// histogram.
#[derive(Clone, Debug)]
pub struct ArrivalIntensityTracker {
    arrival_depth: Vec<Option<f64>>,
    mid_price_chg: Vec<Option<f64>>,
    mid_price_tick: Option<f64>,
    capacity: usize,
    overflow: HistoryOverflow,
    retain_on_compact: usize,
    dropped: usize,
}

impl ArrivalIntensityTracker {
    pub fn new(capacity: usize, overflow: HistoryOverflow, retain_on_compact: usize) -> Self {
        Self {
            arrival_depth: Vec::new(),
            mid_price_chg: Vec::new(),
            mid_price_tick: None,
            capacity,
            overflow,
            retain_on_compact: retain_on_compact.min(capacity),
            dropped: 0,
        }
    }

    pub fn record(&mut self, book: &BookTicks, trades: &[PublicTrade]) -> Result<()> {
        self.ensure_capacity()?;

        let depth = self.mid_price_tick.and_then(|mid| {
            trades
                .iter()
                .map(|trade| {
                    let trade_tick = trade.price / book.tick_size;
                    match trade.side {
                        Side::Buy => trade_tick - mid,
                        Side::Sell => mid - trade_tick,
                    }
                })
                .fold(None, |acc: Option<f64>, d| match acc {
                    Some(best) => Some(best.max(d)),
                    None if d.is_nan() => None,
                    None => Some(d),
                })
        });

        let prev_mid = self.mid_price_tick;
        self.mid_price_tick = Some(book.mid_tick);

        self.arrival_depth.push(depth);
        self.mid_price_chg
            .push(prev_mid.map(|prev| book.mid_tick - prev));
        Ok(())
    }

    fn ensure_capacity(&mut self) -> Result<()> {
        if self.arrival_depth.len() < self.capacity {
            return Ok(());
        }
        match self.overflow {
            HistoryOverflow::Fail => Err(GlftError::HistoryCapacityExceeded {
                capacity: self.capacity,
            }),
            HistoryOverflow::Compact => {
                let drop = self.arrival_depth.len() - self.retain_on_compact;
                if drop == 0 {
                    return Err(GlftError::HistoryCapacityExceeded {
                        capacity: self.capacity,
                    });
                }
                self.arrival_depth.drain(..drop);
                self.mid_price_chg.drain(..drop);
                self.dropped += drop;
                tracing::debug!(
                    dropped = drop,
                    retained = self.arrival_depth.len(),
                    "arrival history compacted"
                );
                Ok(())
            }
        }
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.arrival_depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrival_depth.is_empty()
    }

    /// Steps recorded since construction, including compacted ones.
    pub fn steps_recorded(&self) -> usize {
        self.dropped + self.arrival_depth.len()
    }

    pub fn mid_price_tick(&self) -> Option<f64> {
        self.mid_price_tick
    }

    pub fn arrival_depth(&self) -> &[Option<f64>] {
        &self.arrival_depth
    }

    pub fn mid_price_changes(&self) -> &[Option<f64>] {
        &self.mid_price_chg
    }

    /// The most recent `window` samples of both series, or `None` while
    /// fewer than `window` are held.
    pub fn window(&self, window: usize) -> Option<(&[Option<f64>], &[Option<f64>])> {
        let len = self.arrival_depth.len();
        if window == 0 || len < window {
            return None;
        }
        let start = len - window;
        Some((&self.arrival_depth[start..], &self.mid_price_chg[start..]))
    }
}

/// Builds the cumulative arrival table: `out[i]` counts samples whose depth
/// bucket lies strictly beyond bucket `i`, i.e. arrivals that would have
/// executed a quote resting at bucket `i`.
///
/// Depths are bucketed in half ticks with bucket 0 being the closest
/// possible quote to the mid. Samples outside `[0, max_buckets)` are skipped.
/// The result is truncated before the deepest bucket touched, whose count is
/// always zero, and is non-increasing.
pub fn measure_trading_intensity(arrival_depth: &[Option<f64>], max_buckets: usize) -> Vec<u64> {
    let mut hits = vec![0u64; max_buckets];
    let mut max_bucket = 0usize;
    for depth in arrival_depth.iter().flatten() {
        if !depth.is_finite() {
            continue;
        }
        let bucket = (depth / 0.5).round_ties_even() as i64 - 1;
        if bucket < 0 || bucket >= max_buckets as i64 {
            continue;
        }
        let bucket = bucket as usize;
        hits[bucket] += 1;
        max_bucket = max_bucket.max(bucket);
    }

    let mut out = vec![0u64; max_bucket];
    let mut running = 0u64;
    for idx in (0..max_bucket).rev() {
        running += hits[idx + 1];
        out[idx] = running;
    }
    out
}
