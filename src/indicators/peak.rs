use super::{check_inputs, level_series, CalculatedIndicator};
use crate::analysis::statistics::rolling_max;
use crate::core::timeseries::collect_defined;
use crate::models::DataPoint;
use anyhow::Result;

/// Level minus its trailing `window`-period high. Zero at a new high,
/// negative otherwise.
pub struct DistanceFromPeak {
    pub window: usize,
}

impl CalculatedIndicator for DistanceFromPeak {
    fn slug(&self) -> &str {
        "distance_from_peak"
    }

    fn calculate(&self, inputs: &[Vec<DataPoint>]) -> Result<Vec<DataPoint>> {
        check_inputs(self.slug(), inputs, self.min_inputs())?;

        let (timestamps, level) = level_series(inputs);
        let peak = rolling_max(&level, self.window);

        let out: Vec<Option<f64>> = level
            .iter()
            .zip(&peak)
            .map(|(v, p)| Some((*v)? - (*p)?))
            .collect();

        Ok(collect_defined(&timestamps, &out))
    }
}

/// Level divided by its trailing `window`-period high.
///
/// With two inputs the level is the ratio of the first to the second,
/// e.g. new orders to inventories.
pub struct RatioToPeak {
    pub window: usize,
    pub inputs: usize,
}

impl RatioToPeak {
    pub fn of_level(window: usize) -> Self {
        Self { window, inputs: 1 }
    }

    pub fn of_ratio(window: usize) -> Self {
        Self { window, inputs: 2 }
    }
}

impl CalculatedIndicator for RatioToPeak {
    fn slug(&self) -> &str {
        "ratio_to_peak"
    }

    fn min_inputs(&self) -> usize {
        self.inputs
    }

    fn calculate(&self, inputs: &[Vec<DataPoint>]) -> Result<Vec<DataPoint>> {
        check_inputs(self.slug(), inputs, self.min_inputs())?;

        let (timestamps, level) = level_series(&inputs[..self.inputs]);
        let peak = rolling_max(&level, self.window);

        let out: Vec<Option<f64>> = level
            .iter()
            .zip(&peak)
            .map(|(v, p)| Some((*v)? / (*p)?))
            .collect();

        Ok(collect_defined(&timestamps, &out))
    }
}
