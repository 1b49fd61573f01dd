//! Exponential moving average over a raw value series.
//!
//! k = 2/(n+1); seeded with the first observation, then
//! ema[i] = x[i]*k + ema[i-1]*(1-k). Series shorter than the period are
//! treated as insufficient data and come back all-NaN, so consumers
//! check-and-skip instead of handling a separate error path.

pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return vec![f64::NAN; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);

    for &v in &values[1..] {
        prev = v * k + prev * (1.0 - k);
        out.push(prev);
    }

    out
}
