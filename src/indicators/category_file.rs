//! Reader for the monthly spending-by-category table.
//!
//! The file is a delimited export with a 4-line preamble followed by rows of
//! `Line, Description, v(1959-JAN), v(1959-FEB), ...`. There is no header row;
//! column dates are implied by position starting at January 1959.

use crate::error::{DashboardError, Result};
use crate::models::DataPoint;
use chrono::NaiveDate;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

pub const PREAMBLE_LINES: usize = 4;
pub const FIRST_YEAR: i32 = 1959;
pub const LAST_YEAR: i32 = 2025;

const LABEL_COLUMNS: usize = 2;
const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// One category's monthly observations, missing months dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub description: String,
    pub points: Vec<DataPoint>,
}

/// `YYYY-MON` labels for every month of the covered year range.
pub fn date_labels() -> Vec<String> {
    (FIRST_YEAR..=LAST_YEAR)
        .flat_map(|year| MONTHS.iter().map(move |m| format!("{}-{}", year, m)))
        .collect()
}

/// Parse a `YYYY-MON` label to the first day of that month.
pub fn parse_label(label: &str) -> Option<NaiveDate> {
    let (year, month) = label.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month = MONTHS.iter().position(|m| *m == month)? as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn load_category_series(path: &Path) -> Result<Vec<CategorySeries>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        DashboardError::CategoryFile(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_category_series(&text)
}

/// Parse the table into one series per category, ordered by description.
pub fn parse_category_series(text: &str) -> Result<Vec<CategorySeries>> {
    let body: String = text
        .split_inclusive('\n')
        .skip(PREAMBLE_LINES)
        .collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }

    // The first row fixes the table width; shorter rows are padded, longer
    // ones are malformed.
    let width = records
        .first()
        .map(|r| r.len())
        .ok_or_else(|| DashboardError::CategoryFile("no rows after preamble".to_string()))?;
    if width < LABEL_COLUMNS {
        return Err(DashboardError::CategoryFile(format!(
            "expected at least {} columns, found {}",
            LABEL_COLUMNS, width
        )));
    }

    let labels = date_labels();
    let date_cols = labels.len().min(width - LABEL_COLUMNS);
    let dates: Vec<NaiveDate> = labels[..date_cols]
        .iter()
        .filter_map(|l| parse_label(l))
        .collect();

    let mut table: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();

    for (row, record) in records.iter().enumerate() {
        if record.len() > width {
            return Err(DashboardError::CategoryFile(format!(
                "row {}: expected {} fields, saw {}",
                row + PREAMBLE_LINES + 1,
                width,
                record.len()
            )));
        }

        let description = record.get(1).unwrap_or("").trim();
        if description.is_empty() {
            continue;
        }

        let cells = record.iter().skip(LABEL_COLUMNS).take(date_cols);
        for (date, cell) in dates.iter().zip(cells) {
            let Some(value) = parse_value(cell) else {
                continue;
            };
            let by_date = table.entry(description.to_string()).or_default();
            match by_date.entry(*date) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(_) => {
                    return Err(DashboardError::CategoryFile(format!(
                        "duplicate category '{}' for {}",
                        description, date
                    )));
                }
            }
        }
    }

    Ok(table
        .into_iter()
        .map(|(description, by_date)| CategorySeries {
            description,
            points: by_date
                .into_iter()
                .map(|(date, value)| DataPoint::on(date, value))
                .collect(),
        })
        .collect())
}

fn parse_value(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PREAMBLE: &str = "Table 2.4.5U\nPersonal Consumption Expenditures by Type of Product\n[Millions of dollars]\nSeasonally adjusted at annual rates\n";

    #[test]
    fn test_date_labels() {
        let labels = date_labels();
        assert_eq!(labels.len(), (LAST_YEAR - FIRST_YEAR + 1) as usize * 12);
        assert_eq!(labels[0], "1959-JAN");
        assert_eq!(labels[13], "1960-FEB");
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("1961-SEP"), NaiveDate::from_ymd_opt(1961, 9, 1));
        assert_eq!(parse_label("1961-Sep"), None);
        assert_eq!(parse_label("garbage"), None);
    }

    #[test]
    fn test_parse_wide_table() {
        let text = format!(
            "{}1,Food, 10 ,11,12\n2,  ,1,2,3\n3,Clothing,(D),5,6\n4,Energy,7,8\n",
            PREAMBLE
        );
        let series = parse_category_series(&text).unwrap();

        let names: Vec<&str> = series.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(names, vec!["Clothing", "Energy", "Food"]);

        let clothing = &series[0];
        assert_eq!(clothing.points.len(), 2);
        assert_eq!(
            clothing.points[0].timestamp.date_naive(),
            NaiveDate::from_ymd_opt(1959, 2, 1).unwrap()
        );

        // Short row padded with missing values
        assert_eq!(series[1].points.len(), 2);
        assert_eq!(series[2].points[0].value, 10.0);
    }

    #[test]
    fn test_extra_columns_truncated_to_label_range() {
        let labels = date_labels().len();
        let values = vec!["1"; labels + 3].join(",");
        let text = format!("{}1,Food,{}\n", PREAMBLE, values);
        let series = parse_category_series(&text).unwrap();
        assert_eq!(series[0].points.len(), labels);
    }

    #[test]
    fn test_rejects_ragged_and_duplicate_rows() {
        let ragged = format!("{}1,Food,1\n2,Energy,1,2,3\n", PREAMBLE);
        assert!(parse_category_series(&ragged).is_err());

        let dup = format!("{}1,Food,1,2\n2,Food,3,4\n", PREAMBLE);
        assert!(parse_category_series(&dup).is_err());

        let narrow = format!("{}only-one-column\n", PREAMBLE);
        assert!(parse_category_series(&narrow).is_err());

        assert!(parse_category_series(PREAMBLE).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_category_series(&dir.path().join("pce_spend.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::CategoryFile(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}1,Food,1,2,3\n", PREAMBLE).unwrap();
        let series = load_category_series(file.path()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points.len(), 3);
    }
}
