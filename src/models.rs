use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl DataPoint {
    /// Observation stamped at midnight UTC of `date`.
    pub fn on(date: NaiveDate, value: f64) -> Self {
        Self {
            timestamp: midnight_utc(date),
            value,
        }
    }
}

pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// A transformed series ready to be bound to a dashboard cell.
#[derive(Debug, Serialize, Clone)]
pub struct DerivedIndicator {
    pub slug: String,
    pub title: String,
    pub trace_name: String,
    pub points: Vec<DataPoint>,
    pub x_range: (DateTime<Utc>, DateTime<Utc>),
    pub y_range: (f64, f64),
}

impl DerivedIndicator {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|dp| dp.value).collect()
    }
}

/// Binding of a derived indicator to a (row, col) cell, both 1-based.
#[derive(Debug, Serialize, Clone)]
pub struct PanelSpec {
    pub row: usize,
    pub col: usize,
    pub indicator: DerivedIndicator,
}
