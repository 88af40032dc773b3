use super::{check_inputs, level_series, CalculatedIndicator};
use crate::analysis::statistics::rolling_min;
use crate::core::timeseries::collect_defined;
use crate::models::DataPoint;
use anyhow::Result;

/// Percent above the trailing `window`-period low, inverted so that the low
/// itself reads 100: `100 - 100 * (level / low - 1)`.
///
/// Used on continuing claims, where a rising level is the bad direction.
pub struct InvertedAboveTrough {
    pub window: usize,
}

impl CalculatedIndicator for InvertedAboveTrough {
    fn slug(&self) -> &str {
        "inverted_above_trough"
    }

    fn calculate(&self, inputs: &[Vec<DataPoint>]) -> Result<Vec<DataPoint>> {
        check_inputs(self.slug(), inputs, self.min_inputs())?;

        let (timestamps, level) = level_series(&inputs[..1]);
        let trough = rolling_min(&level, self.window);

        let out: Vec<Option<f64>> = level
            .iter()
            .zip(&trough)
            .map(|(v, low)| {
                let (v, low) = ((*v)?, (*low)?);
                Some(100.0 - 100.0 * (v / low - 1.0))
            })
            .collect();

        Ok(collect_defined(&timestamps, &out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn weekly(values: &[f64]) -> Vec<DataPoint> {
        let start = NaiveDate::from_ymd_opt(2015, 1, 3).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::on(start + Duration::weeks(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_exactly_100_at_trailing_low() {
        let mut values: Vec<f64> = (0..156).map(|i| 2_000_000.0 - i as f64 * 1_000.0).collect();
        values.push(1_700_000.0);
        let out = InvertedAboveTrough { window: 156 }.calculate(&[weekly(&values)]).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, 100.0);
        assert_eq!(out[1].value, 100.0);
    }

    #[test]
    fn test_above_low_reads_below_100() {
        let out = InvertedAboveTrough { window: 3 }
            .calculate(&[weekly(&[100.0, 110.0, 120.0, 125.0])])
            .unwrap();

        assert_eq!(out.len(), 2);
        assert!((out[0].value - 80.0).abs() < 1e-9); // 20% above the low
        assert!((out[1].value - (100.0 - 100.0 * (125.0 / 110.0 - 1.0))).abs() < 1e-9);
    }
}
