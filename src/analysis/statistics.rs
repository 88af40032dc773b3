//! Window statistics over gapped series.
//!
//! Every function takes a slice of `Option<f64>` cells (one per calendar step)
//! and returns a vector of the same length. A windowed result is defined only
//! when every cell in its window is defined, so the first `window - 1` outputs
//! are always `None`.

/// First difference: `x[t] - x[t-1]`.
pub fn diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 {
            out.push(None);
            continue;
        }
        out.push(match (values[i], values[i - 1]) {
            (Some(cur), Some(prev)) => Some(cur - prev),
            _ => None,
        });
    }
    out
}

/// Applies `reduce` to each full trailing window of length `window`.
fn rolling<F>(values: &[Option<f64>], window: usize, reduce: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for end in (window - 1)..values.len() {
        buf.clear();
        buf.extend(values[end + 1 - window..=end].iter().flatten().copied());
        if buf.len() == window {
            out[end] = Some(reduce(&buf));
        }
    }
    out
}

pub fn rolling_max(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn rolling_min(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Trailing simple moving average.
pub fn moving_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Carry the last defined cell forward over gaps. Cells before the first
/// defined one stay `None`.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

/// Fractional change against the cell `periods` steps earlier.
/// Undefined when either side is missing or the ratio is not a number.
pub fn pct_change(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, cur)| {
            if i < periods {
                return None;
            }
            match (cur, values[i - periods]) {
                (Some(cur), Some(prev)) => Some(cur / prev - 1.0).filter(|v| !v.is_nan()),
                _ => None,
            }
        })
        .collect()
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(vals: &[f64]) -> Vec<Option<f64>> {
        vals.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_diff() {
        let d = diff(&[Some(1.0), Some(3.0), None, Some(4.0), Some(2.0)]);
        assert_eq!(d, vec![None, Some(2.0), None, None, Some(-2.0)]);
    }

    #[test]
    fn test_rolling_max_warm_up() {
        let out = rolling_max(&some(&[1.0, 5.0, 2.0, 3.0]), 3);
        assert_eq!(out, vec![None, None, Some(5.0), Some(5.0)]);
    }

    #[test]
    fn test_rolling_min_gap_in_window() {
        let out = rolling_min(&[Some(4.0), Some(2.0), None, Some(3.0), Some(1.0), Some(6.0)], 2);
        assert_eq!(out, vec![None, Some(2.0), None, None, Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_moving_average() {
        let out = moving_average(&[None, Some(10.0), Some(20.0), Some(30.0), Some(40.0)], 3);
        assert_eq!(out, vec![None, None, None, Some(20.0), Some(30.0)]);
    }

    #[test]
    fn test_window_longer_than_series() {
        assert_eq!(rolling_max(&some(&[1.0, 2.0]), 24), vec![None, None]);
        assert_eq!(moving_average(&some(&[1.0]), 0), vec![None]);
    }

    #[test]
    fn test_pct_change() {
        let out = pct_change(&some(&[100.0, 110.0, 121.0]), 1);
        assert_eq!(out[0], None);
        assert!((out[1].unwrap() - 0.1).abs() < 1e-12);
        assert!((out[2].unwrap() - 0.1).abs() < 1e-12);

        let zero = pct_change(&some(&[0.0, 0.0]), 1);
        assert_eq!(zero, vec![None, None]); // 0/0
    }

    #[test]
    fn test_forward_fill() {
        let out = forward_fill(&[None, Some(1.0), None, None, Some(4.0), None]);
        assert_eq!(out, vec![None, Some(1.0), Some(1.0), Some(1.0), Some(4.0), Some(4.0)]);
    }

    #[test]
    fn test_quantile_interpolates() {
        let q = quantile(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.2).unwrap();
        assert!((q - 1.8).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.2), Some(7.0));
        assert_eq!(quantile(&[], 0.2), None);
    }
}
