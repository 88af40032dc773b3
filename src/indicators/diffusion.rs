use super::{check_inputs, columns, CalculatedIndicator};
use crate::analysis::statistics::{diff, forward_fill, moving_average, pct_change};
use crate::core::timeseries::{align_outer, collect_defined};
use crate::models::DataPoint;
use anyhow::Result;

/// Share of series rising month over month, smoothed.
///
/// The denominator is the full series count: a series with no observation on
/// a step counts as "not rising" rather than being excluded.
pub struct BreadthDiffusion {
    pub smoothing: usize,
}

impl CalculatedIndicator for BreadthDiffusion {
    fn slug(&self) -> &str {
        "breadth_diffusion"
    }

    fn calculate(&self, inputs: &[Vec<DataPoint>]) -> Result<Vec<DataPoint>> {
        check_inputs(self.slug(), inputs, self.min_inputs())?;

        let rows = align_outer(inputs);
        let (timestamps, cols) = columns(&rows);
        let changes: Vec<Vec<Option<f64>>> = cols.iter().map(|c| diff(c)).collect();
        let total = changes.len() as f64;

        let breadth: Vec<Option<f64>> = (0..timestamps.len())
            .map(|t| {
                // No prior month on the first step. Scoring it as 0% instead
                // would start the 3-month mean one row earlier.
                if t == 0 {
                    return None;
                }
                let rising = changes
                    .iter()
                    .filter(|c| matches!(c[t], Some(d) if d > 0.0))
                    .count();
                Some(rising as f64 / total * 100.0)
            })
            .collect();

        let smoothed = moving_average(&breadth, self.smoothing);
        Ok(collect_defined(&timestamps, &smoothed))
    }
}

/// Share of categories with positive growth over `periods` steps, smoothed.
///
/// Each category is forward-filled over gaps before growth is taken.
/// Categories without a defined growth value on a step are left out of that
/// step's denominator; a step where no category is defined is undefined.
pub struct CategoryDiffusion {
    pub periods: usize,
    pub smoothing: usize,
}

impl CalculatedIndicator for CategoryDiffusion {
    fn slug(&self) -> &str {
        "category_diffusion"
    }

    fn calculate(&self, inputs: &[Vec<DataPoint>]) -> Result<Vec<DataPoint>> {
        check_inputs(self.slug(), inputs, self.min_inputs())?;

        let rows = align_outer(inputs);
        let (timestamps, cols) = columns(&rows);
        // Gaps inside a category carry the previous month forward
        let growth: Vec<Vec<Option<f64>>> = cols
            .iter()
            .map(|c| pct_change(&forward_fill(c), self.periods))
            .collect();

        let breadth: Vec<Option<f64>> = (0..timestamps.len())
            .map(|t| {
                let defined: Vec<f64> = growth.iter().filter_map(|g| g[t]).collect();
                if defined.is_empty() {
                    return None;
                }
                let positive = defined.iter().filter(|g| **g > 0.0).count();
                Some(positive as f64 / defined.len() as f64 * 100.0)
            })
            .collect();

        let smoothed = moving_average(&breadth, self.smoothing);
        Ok(collect_defined(&timestamps, &smoothed))
    }
}
