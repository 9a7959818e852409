#[cfg(feature = "timings")]
use std::time::Instant;

#[cfg(feature = "timings")]
pub(crate) fn time_block<T, F>(label: &'static str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();
    tracing::info!(target: "timings", %label, elapsed_us = elapsed.as_secs_f64() * 1e6);
    value
}

#[cfg(not(feature = "timings"))]
pub(crate) fn time_block<T, F>(_: &'static str, f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}
