use crate::core::timeseries::{self, AlignedRow};
use crate::models::DataPoint;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

pub mod category_file;
pub mod claims;
pub mod diffusion;
pub mod peak;
pub mod registry;

pub trait CalculatedIndicator {
    /// Short label for logs (e.g. "ratio_to_peak")
    fn slug(&self) -> &str;

    /// Number of input series the formula needs.
    fn min_inputs(&self) -> usize {
        1
    }

    /// Derive the output series from aligned inputs. Points where the
    /// formula is undefined are dropped from the result.
    fn calculate(&self, inputs: &[Vec<DataPoint>]) -> Result<Vec<DataPoint>>;
}

/// Shared input validation: enough inputs, and at least one observation.
pub(crate) fn check_inputs(slug: &str, inputs: &[Vec<DataPoint>], min: usize) -> Result<()> {
    if inputs.len() < min {
        return Err(anyhow!(
            "{} requires {} input series, got {}",
            slug,
            min,
            inputs.len()
        ));
    }
    if inputs.iter().all(|s| s.is_empty()) {
        return Err(anyhow!("{}: no observations in input", slug));
    }
    Ok(())
}

/// Split aligned rows into the timestamp index and per-series columns.
pub(crate) fn columns(rows: &[AlignedRow]) -> (Vec<DateTime<Utc>>, Vec<Vec<Option<f64>>>) {
    let timestamps = rows.iter().map(|r| r.timestamp).collect();
    let width = rows.first().map(|r| r.values.len()).unwrap_or(0);
    let cols = (0..width)
        .map(|i| rows.iter().map(|r| r.values[i]).collect())
        .collect();
    (timestamps, cols)
}

/// The level a peak/trough transform works on: the single input, or the
/// ratio of the first input to the second.
pub(crate) fn level_series(inputs: &[Vec<DataPoint>]) -> (Vec<DateTime<Utc>>, Vec<Option<f64>>) {
    let rows = timeseries::align_outer(inputs);
    let (timestamps, cols) = columns(&rows);

    let level = match cols.as_slice() {
        [single] => single.clone(),
        [num, den, ..] => num
            .iter()
            .zip(den)
            .map(|(n, d)| match (n, d) {
                (Some(n), Some(d)) => Some(n / d).filter(|r| r.is_finite()),
                _ => None,
            })
            .collect(),
        [] => Vec::new(),
    };

    (timestamps, level)
}
