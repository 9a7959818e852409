use super::types::{BookTicks, CalibrationState, Coefficients, QuotePair};
use crate::errors::{GlftError, Result};

/// Closed-form GLFT coefficients.
///
/// ```text
/// c1 = 1/(ξδ) · ln(1 + ξδ/k)
/// c2 = sqrt( γ/(2Aδk) · (1 + ξδ/k)^(k/(ξδ) + 1) )
/// ```
#[allow(non_snake_case)]
pub fn compute_coeff(xi: f64, gamma: f64, delta: f64, A: f64, k: f64) -> Result<Coefficients> {
    if !(A.is_finite() && k.is_finite() && A > 0.0 && k > 0.0) {
        return Err(GlftError::InvalidCalibration { a: A, k });
    }
    let xi_delta = xi * delta;
    let inv_k = 1.0 / k;
    let c1 = (1.0 / xi_delta) * (1.0 + xi_delta * inv_k).ln();
    let c2 = ((gamma / (2.0 * A * delta * k)) * (1.0 + xi_delta * inv_k).powf(k / xi_delta + 1.0))
        .sqrt();
    Ok(Coefficients { c1, c2 })
}

pub fn half_spread(coeff: &Coefficients, delta: f64, volatility: f64) -> f64 {
    coeff.c1 + delta / 2.0 * coeff.c2 * volatility
}

pub fn skew(coeff: &Coefficients, volatility: f64) -> f64 {
    coeff.c2 * volatility
}

/// Quote parameters that stay fixed for a run.
#[derive(Clone, Copy, Debug)]
pub struct QuoteParams {
    pub xi: f64,
    pub gamma: f64,
    pub delta: f64,
}

/// Bid/ask prices for `position` around `book.mid_tick`.
///
/// Prices are clamped so the bid never improves on the best bid and the ask
/// never improves on the best ask; a post-only quote can therefore never be
/// computed on the wrong side of the book. A side whose price is not finite
/// (e.g. volatility still unknown) comes back as NaN and must not be quoted.
pub fn compute_quote(
    params: &QuoteParams,
    state: &CalibrationState,
    book: &BookTicks,
    position: f64,
) -> Result<QuotePair> {
    let coeff = compute_coeff(params.xi, params.gamma, params.delta, state.a, state.k)?;
    let half_spread = half_spread(&coeff, params.delta, state.volatility);
    let skew = skew(&coeff, state.volatility);

    let bid_depth = half_spread + skew * position;
    let ask_depth = half_spread - skew * position;

    let bid_tick = (book.mid_tick - bid_depth)
        .round_ties_even()
        .min(book.best_bid_tick as f64);
    let ask_tick = (book.mid_tick + ask_depth)
        .round_ties_even()
        .max(book.best_ask_tick as f64);

    Ok(QuotePair {
        half_spread,
        skew,
        bid_price: side_price(bid_tick, bid_depth, book.tick_size),
        ask_price: side_price(ask_tick, ask_depth, book.tick_size),
    })
}

// f64::min/max drop NaN operands, so a NaN depth would otherwise collapse
// onto the touch instead of suppressing the side.
fn side_price(tick: f64, depth: f64, tick_size: f64) -> f64 {
    if depth.is_finite() {
        tick * tick_size
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn state(a: f64, k: f64, volatility: f64) -> CalibrationState {
        CalibrationState {
            a,
            k,
            volatility,
            calibrated_at: Some(0),
        }
    }

    const PARAMS: QuoteParams = QuoteParams {
        xi: 0.1,
        gamma: 0.1,
        delta: 1.0,
    };

    #[test]
    fn test_reference_quote() {
        let book = BookTicks::new(10_000, 10_001, 0.01);
        assert_eq!(book.mid_tick, 10_000.5);
        let quote = compute_quote(&PARAMS, &state(1.0, 2.0, 0.5), &book, 0.0).unwrap();

        // c1 = 10·ln(1.05), c2 = sqrt(0.025 · 1.05^21)
        let c1 = 10.0 * 1.05_f64.ln();
        let c2 = (0.025 * 1.05_f64.powf(21.0)).sqrt();
        assert!((c1 - 0.487_901_641_694_321).abs() < 1e-12);
        assert!((c2 - 0.263_911_092_529_361).abs() < 1e-9);
        assert!((quote.half_spread - (c1 + 0.25 * c2)).abs() < 1e-12);
        assert!((quote.half_spread - 0.553_879_414_827).abs() < 1e-9);
        assert!((quote.skew - 0.131_955_546_265).abs() < 1e-9);
        // mid ± 0.5539 rounds to 9_999.946.. -> 10_000 and 10_001.05.. -> 10_001
        assert!((quote.bid_price - 100.00).abs() < 1e-9);
        assert!((quote.ask_price - 100.01).abs() < 1e-9);
    }

    #[test]
    fn test_inventory_skews_quotes_away_from_position() {
        let book = BookTicks::new(10_000, 10_001, 0.01);
        let s = state(1.0, 2.0, 20.0);
        let flat = compute_quote(&PARAMS, &s, &book, 0.0).unwrap();
        let long = compute_quote(&PARAMS, &s, &book, 3.0).unwrap();
        let short = compute_quote(&PARAMS, &s, &book, -3.0).unwrap();
        assert!(long.bid_price < flat.bid_price);
        assert!(long.ask_price <= flat.ask_price);
        assert!(short.ask_price > flat.ask_price);
        assert!(short.bid_price >= flat.bid_price);
    }

    #[test]
    fn test_quotes_never_cross_the_touch() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2_000 {
            let bid = rng.gen_range(1_000..100_000);
            let ask = bid + rng.gen_range(1..5);
            let book = BookTicks::new(bid, ask, 0.01);
            let s = state(
                rng.gen_range(0.01..50.0),
                rng.gen_range(0.01..10.0),
                rng.gen_range(0.0..30.0),
            );
            let position = rng.gen_range(-50.0..50.0);
            let quote = compute_quote(&PARAMS, &s, &book, position).unwrap();
            if let Some(bid_price) = quote.bid() {
                assert!(bid_price <= bid as f64 * 0.01 + 1e-9);
            }
            if let Some(ask_price) = quote.ask() {
                assert!(ask_price >= ask as f64 * 0.01 - 1e-9);
            }
        }
    }

    #[test]
    fn test_unknown_volatility_suppresses_both_sides() {
        let book = BookTicks::new(10_000, 10_001, 0.01);
        let quote = compute_quote(&PARAMS, &state(1.0, 2.0, f64::NAN), &book, 0.0).unwrap();
        assert!(quote.bid().is_none());
        assert!(quote.ask().is_none());
    }

    #[test]
    fn test_invalid_calibration_is_rejected() {
        let book = BookTicks::new(10_000, 10_001, 0.01);
        for (a, k) in [(0.0, 1.0), (1.0, -0.5), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            let err = compute_quote(&PARAMS, &state(a, k, 1.0), &book, 0.0).unwrap_err();
            assert!(matches!(err, GlftError::InvalidCalibration { .. }));
        }
    }
}
