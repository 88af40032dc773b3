use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use crate::models::DataPoint;

pub mod fred;

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    /// Observations of `series_id` dated within `[start, end]`, ascending,
    /// missing values omitted.
    async fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>>;
}
