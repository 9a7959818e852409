use super::{
    calibration::IntensityCalibrator,
    config::GlftConfig,
    execution::{ExecutionHarness, OrderLifecycleManager},
    intensity::ArrivalIntensityTracker,
    recorder::StatsRecorder,
    spreads::{self, QuoteParams},
    types::{BookTicks, CalibrationState, QuotePair, RunSummary, StepStats},
    volatility::VolatilityEstimator,
};
use crate::{
    errors::{GlftError, Result},
    timings::time_block,
};
use tracing::{debug, info, warn};

/// GLFT market maker driven one fixed-length step at a time.
///
/// Owns the arrival history, the calibrated state and the order manager;
/// the harness only supplies market data and takes order requests.
pub struct GlftStrategy {
    pub config: GlftConfig,
    params: QuoteParams,
    tracker: ArrivalIntensityTracker,
    calibrator: IntensityCalibrator,
    volatility: VolatilityEstimator,
    orders: OrderLifecycleManager,
    state: CalibrationState,
    step: usize,
    warmup_logged: bool,
    summary: RunSummary,
}

impl GlftStrategy {
    /// Builds a strategy from a config; the config is validated first.
    pub fn new(config: GlftConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|err| GlftError::InvalidConfig(format!("{err:#}")))?;
        let params = QuoteParams {
            xi: config.xi,
            gamma: config.gamma,
            delta: config.delta,
        };
        let tracker = ArrivalIntensityTracker::new(
            config.history_capacity,
            config.history_overflow,
            config.calibration_window,
        );
        let calibrator = IntensityCalibrator::new(&config);
        let volatility =
            VolatilityEstimator::new(config.calibration_window, config.volatility_normalization);
        let orders = OrderLifecycleManager::new(config.max_position, config.order_qty);

        Ok(Self {
            config,
            params,
            tracker,
            calibrator,
            volatility,
            orders,
            state: CalibrationState::default(),
            step: 0,
            warmup_logged: false,
            summary: RunSummary::default(),
        })
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn tracker(&self) -> &ArrivalIntensityTracker {
        &self.tracker
    }

    /// Steps processed so far.
    pub fn steps(&self) -> usize {
        self.step
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            steps: self.step,
            final_state: self.state,
            ..self.summary
        }
    }

    /// Processes the market state the harness is currently at: records
    /// arrivals, refits on cadence, requotes and reconciles resting orders.
    pub fn step<H>(&mut self, harness: &mut H) -> Result<StepStats>
    where
        H: ExecutionHarness + ?Sized,
    {
        let step = self.step;
        let book = BookTicks::new(
            harness.best_bid_tick(),
            harness.best_ask_tick(),
            harness.tick_size(),
        );

        self.tracker.record(&book, harness.last_trades())?;
        harness.clear_last_trades();

        if self.calibrator.is_due(step, self.tracker.len()) {
            time_block("glft.calibrate", || self.calibrate(step));
        }

        let position = harness.position();
        let quote = self.quote(step, &book, position)?;

        let outcome = self.orders.reconcile(harness, &quote)?;
        self.summary.orders_cancelled += outcome.cancelled;
        self.summary.orders_submitted += outcome.submitted;

        self.step += 1;
        Ok(StepStats {
            step,
            half_spread: quote.half_spread,
            skew: quote.skew,
            volatility: self.state.volatility,
            a: self.state.a,
            k: self.state.k,
            bid_price: quote.bid_price,
            ask_price: quote.ask_price,
            position,
        })
    }

    /// Steps until the harness runs out of data, handing every step's
    /// statistics to `recorder`, then runs the end-of-data calibration.
    pub fn run<H, R>(&mut self, harness: &mut H, recorder: &mut R) -> Result<RunSummary>
    where
        H: ExecutionHarness + ?Sized,
        R: StatsRecorder + ?Sized,
    {
        let step_ns = self.config.step_duration_ns();
        while harness.elapse(step_ns) {
            let stats = time_block("glft.step", || self.step(&mut *harness))?;
            recorder.record(&stats)?;
        }
        self.finish();
        recorder.flush()?;

        let summary = self.summary();
        info!(
            steps = summary.steps,
            calibrations = summary.calibrations,
            failed_calibrations = summary.failed_calibrations,
            orders_submitted = summary.orders_submitted,
            orders_cancelled = summary.orders_cancelled,
            "run finished"
        );
        Ok(summary)
    }

    /// One last refit over the final window, regardless of cadence.
    pub fn finish(&mut self) -> CalibrationState {
        if self.tracker.len() >= self.calibrator.window() && self.step > 0 {
            let last = self.step - 1;
            if !self.calibrator.is_due(last, self.tracker.len()) {
                self.calibrate(last);
            }
        }
        self.state
    }

    // (A, k) and volatility are committed together; a failed fit leaves the
    // whole state as it was.
    fn calibrate(&mut self, step: usize) {
        match self.calibrator.fit(self.tracker.arrival_depth()) {
            Ok(fit) => {
                self.state.a = fit.a;
                self.state.k = fit.k;
                if let Some(volatility) = self.volatility.estimate(self.tracker.mid_price_changes())
                {
                    self.state.volatility = volatility;
                }
                self.state.calibrated_at = Some(step);
                self.summary.calibrations += 1;
                self.log_calibration(step);
            }
            Err(err) => {
                self.summary.failed_calibrations += 1;
                warn!(step, "calibration skipped, keeping previous state: {}", err);
            }
        }

        if !self.warmup_logged && self.state.is_calibrated() {
            self.warmup_logged = true;
            info!(
                step,
                window = self.calibrator.window(),
                "warm-up complete, quoting enabled"
            );
        }
    }

    fn log_calibration(&self, step: usize) {
        let s = &self.state;
        match spreads::compute_coeff(
            self.params.xi,
            self.params.gamma,
            self.params.delta,
            s.a,
            s.k,
        ) {
            Ok(coeff) => info!(
                step,
                a = s.a,
                k = s.k,
                c1 = coeff.c1,
                c2 = coeff.c2,
                half_spread = spreads::half_spread(&coeff, self.params.delta, s.volatility),
                skew = spreads::skew(&coeff, s.volatility),
                volatility = s.volatility,
                "calibrated"
            ),
            Err(err) => info!(step, a = s.a, k = s.k, "calibrated with unusable fit: {}", err),
        }
    }

    fn quote(&self, step: usize, book: &BookTicks, position: f64) -> Result<QuotePair> {
        if !self.volatility.is_warmed_up(self.tracker.steps_recorded()) {
            return Ok(QuotePair::suppressed());
        }
        match spreads::compute_quote(&self.params, &self.state, book, position) {
            Ok(quote) => Ok(quote),
            Err(err) if err.is_recoverable() => {
                debug!(step, "quoting suppressed: {}", err);
                Ok(QuotePair::suppressed())
            }
            Err(err) => Err(err),
        }
    }
}
