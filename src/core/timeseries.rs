use crate::models::DataPoint;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::BTreeSet;

/// One row of several series aligned on a shared calendar index.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub timestamp: DateTime<Utc>,
    pub values: Vec<Option<f64>>,
}

/// Aligns multiple time series on the union of their timestamps (outer join).
/// A series without an observation on a given date contributes `None`.
pub fn align_outer(series_list: &[Vec<DataPoint>]) -> Vec<AlignedRow> {
    if series_list.is_empty() {
        return Vec::new();
    }

    let all_timestamps: BTreeSet<DateTime<Utc>> = series_list
        .iter()
        .flat_map(|s| s.iter().map(|dp| dp.timestamp))
        .collect();

    let mut iters: Vec<_> = series_list.iter().map(|s| s.iter().peekable()).collect();
    let mut result = Vec::with_capacity(all_timestamps.len());

    for ts in all_timestamps {
        let mut values = vec![None; series_list.len()];

        for (i, iter) in iters.iter_mut().enumerate() {
            // Inputs are sorted; anything older than `ts` was a duplicate stamp.
            while let Some(dp) = iter.peek() {
                if dp.timestamp < ts {
                    iter.next();
                } else if dp.timestamp == ts {
                    values[i] = Some(dp.value).filter(|v| !v.is_nan());
                    iter.next();
                } else {
                    break;
                }
            }
        }

        result.push(AlignedRow { timestamp: ts, values });
    }

    result
}

/// Pairs timestamps with computed cells, dropping undefined ones.
pub fn collect_defined(
    timestamps: &[DateTime<Utc>],
    values: &[Option<f64>],
) -> Vec<DataPoint> {
    timestamps
        .iter()
        .zip(values)
        .filter_map(|(ts, v)| match v {
            Some(value) if value.is_finite() => Some(DataPoint {
                timestamp: *ts,
                value: *value,
            }),
            _ => None,
        })
        .collect()
}

/// Keeps observations inside `[start, end]` (inclusive, by calendar day).
pub fn clip_to_window(points: Vec<DataPoint>, start: NaiveDate, end: NaiveDate) -> Vec<DataPoint> {
    points
        .into_iter()
        .filter(|dp| {
            let d = dp.timestamp.date_naive();
            d >= start && d <= end
        })
        .collect()
}

/// Last calendar day of the month containing `ts`, at the same time of day.
pub fn month_end(ts: DateTime<Utc>) -> DateTime<Utc> {
    let date = ts.date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let next_first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date);
    let offset = next_first.signed_duration_since(date) - Duration::days(1);
    ts + offset
}

/// Start of a lookback window of `years` ending on `as_of` (365-day years).
pub fn lookback_start(as_of: NaiveDate, years: u32) -> NaiveDate {
    as_of - Duration::days(365 * i64::from(years))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dp(date: &str, value: f64) -> DataPoint {
        DataPoint::on(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), value)
    }

    #[test]
    fn test_align_outer_fills_gaps_with_none() {
        let a = vec![dp("2023-01-01", 1.0), dp("2023-02-01", 2.0)];
        let b = vec![dp("2023-02-01", 20.0), dp("2023-03-01", 30.0)];

        let rows = align_outer(&[a, b]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].values, vec![Some(1.0), None]);
        assert_eq!(rows[1].values, vec![Some(2.0), Some(20.0)]);
        assert_eq!(rows[2].values, vec![None, Some(30.0)]);
    }

    #[test]
    fn test_align_outer_empty() {
        assert!(align_outer(&[]).is_empty());
    }

    #[test]
    fn test_collect_defined_drops_missing_and_nan() {
        let ts: Vec<_> = ["2023-01-01", "2023-02-01", "2023-03-01"]
            .iter()
            .map(|d| dp(d, 0.0).timestamp)
            .collect();
        let out = collect_defined(&ts, &[None, Some(f64::NAN), Some(3.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 3.0);
        assert_eq!(out[0].timestamp, ts[2]);
    }

    #[test]
    fn test_month_end() {
        assert_eq!(month_end(dp("2020-02-01", 0.0).timestamp), dp("2020-02-29", 0.0).timestamp);
        assert_eq!(month_end(dp("2019-12-01", 0.0).timestamp), dp("2019-12-31", 0.0).timestamp);
        assert_eq!(month_end(dp("2021-04-01", 0.0).timestamp), dp("2021-04-30", 0.0).timestamp);
    }

    #[test]
    fn test_lookback_start() {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(lookback_start(as_of, 1), NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }
}
