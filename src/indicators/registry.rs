use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::indicators::claims::InvertedAboveTrough;
use crate::indicators::diffusion::{BreadthDiffusion, CategoryDiffusion};
use crate::indicators::peak::{DistanceFromPeak, RatioToPeak};
use crate::indicators::CalculatedIndicator;

// ============================================================================
// CONSTANTS
// ============================================================================

pub const DASHBOARD_TITLE: &str = "US Leading Economic Indicators Dashboard";
pub const GRID_ROWS: usize = 4;
pub const GRID_COLS: usize = 2;

/// NBER recession flag, monthly, 1 = recession.
pub const RECESSION_SERIES: &str = "USREC";
pub const RECESSION_LOOKBACK_YEARS: u32 = 100;

/// Every panel's x axis runs out to this date.
pub fn axis_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2040, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Payroll employment by industry (CES supersectors and major components).
pub const PAYROLL_SERIES: &[(&str, &str)] = &[
    ("Total Nonfarm", "PAYEMS"),
    ("Total Private", "USPRIV"),
    ("Goods-Producing", "USGOOD"),
    ("Service-Providing", "SRVPRD"),
    ("Mining and Logging", "USMINE"),
    ("Construction", "USCONS"),
    ("Manufacturing", "MANEMP"),
    ("Durable Goods", "DMANEMP"),
    ("Nondurable Goods", "NDMANEMP"),
    ("Trade, Transportation, and Utilities", "USTPU"),
    ("Wholesale Trade", "USWTRADE"),
    ("Retail Trade", "USTRADE"),
    ("Transportation and Warehousing", "CES4348400001"),
    ("Utilities", "CES4422000001"),
    ("Information", "USINFO"),
    ("Financial Activities", "USFIRE"),
    ("Professional and Business Services", "USPBS"),
    ("Education and Health Services", "USEHS"),
    ("Leisure and Hospitality", "USLAH"),
    ("Other Services", "USSERV"),
    ("Government", "USGOVT"),
];

// ============================================================================
// ENUMS
// ============================================================================

/// Whether a failure deriving the indicator aborts the whole dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Requirement {
    /// Failure aborts generation; nothing is written.
    Required,
    /// Failure is logged and the panel left empty.
    Optional,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InputSource {
    /// FRED series fetched over the trailing `lookback_years`.
    Fred {
        series: Vec<&'static str>,
        lookback_years: u32,
    },
    /// The local spending-by-category table.
    CategoryFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TransformKind {
    /// Share of inputs rising month over month, `smoothing`-period mean.
    Breadth { smoothing: usize },
    /// Level minus its trailing high.
    DistanceFromPeak { window: usize },
    /// Level (or ratio of two inputs) over its trailing high.
    RatioToPeak { window: usize, inputs: usize },
    /// `100 - 100 * (level / trailing low - 1)`.
    InvertedTrough { window: usize },
    /// Share of categories with positive `periods`-step growth, smoothed.
    CategoryBreadth { periods: usize, smoothing: usize },
}

impl TransformKind {
    pub fn calculator(&self) -> Box<dyn CalculatedIndicator + Send + Sync> {
        match *self {
            TransformKind::Breadth { smoothing } => Box::new(BreadthDiffusion { smoothing }),
            TransformKind::DistanceFromPeak { window } => Box::new(DistanceFromPeak { window }),
            TransformKind::RatioToPeak { window, inputs } => Box::new(RatioToPeak { window, inputs }),
            TransformKind::InvertedTrough { window } => Box::new(InvertedAboveTrough { window }),
            TransformKind::CategoryBreadth { periods, smoothing } => {
                Box::new(CategoryDiffusion { periods, smoothing })
            }
        }
    }
}

// ============================================================================
// SPEC STRUCT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSpec {
    pub slug: &'static str,
    /// Panel (subplot) title
    pub title: &'static str,
    /// Hover name of the primary trace
    pub trace_name: &'static str,
    pub source: InputSource,
    pub transform: TransformKind,
    pub y_range: (f64, f64),
    /// 1-based (row, col)
    pub position: (usize, usize),
    pub requirement: Requirement,
}

// ============================================================================
// STATIC INDICATOR REGISTRY (processing order)
// ============================================================================

static INDICATORS: Lazy<Vec<IndicatorSpec>> = Lazy::new(|| {
    vec![
        IndicatorSpec {
            slug: "payrolls_diffusion",
            title: "Payrolls Diffusion Index (3mma)",
            trace_name: "Payrolls Diffusion Index (3mma)",
            source: InputSource::Fred {
                series: PAYROLL_SERIES.iter().map(|(_, id)| *id).collect(),
                lookback_years: 100,
            },
            transform: TransformKind::Breadth { smoothing: 3 },
            y_range: (0.0, 100.0),
            position: (1, 1),
            requirement: Requirement::Required,
        },
        IndicatorSpec {
            slug: "epop_from_high",
            title: "EPOP from 24-month high",
            trace_name: "EPOP from 24-month high",
            source: InputSource::Fred {
                series: vec!["EMRATIO"],
                lookback_years: 100,
            },
            transform: TransformKind::DistanceFromPeak { window: 24 },
            y_range: (-4.0, 0.0),
            position: (1, 2),
            requirement: Requirement::Required,
        },
        IndicatorSpec {
            slug: "continuing_claims_inverted",
            title: "Continuing Claims (inverted)",
            trace_name: "% Above 3-year Lows in Continuing Claims (inverted)",
            source: InputSource::Fred {
                series: vec!["CCSA"],
                lookback_years: 100,
            },
            transform: TransformKind::InvertedTrough { window: 156 },
            y_range: (0.0, 100.0),
            position: (2, 1),
            requirement: Requirement::Required,
        },
        IndicatorSpec {
            slug: "new_orders_from_high",
            title: "New Orders from 24-month highs",
            trace_name: "New Orders from 24 highs",
            source: InputSource::Fred {
                series: vec!["NEWORDER"],
                lookback_years: 50,
            },
            transform: TransformKind::RatioToPeak { window: 24, inputs: 1 },
            y_range: (0.65, 1.0),
            position: (2, 2),
            requirement: Requirement::Required,
        },
        IndicatorSpec {
            slug: "building_permits_from_high",
            title: "Building Permits as % of 24-Month High",
            trace_name: "Building Permits as % of 24-Month High",
            source: InputSource::Fred {
                series: vec!["PERMIT"],
                lookback_years: 50,
            },
            transform: TransformKind::RatioToPeak { window: 24, inputs: 1 },
            y_range: (0.4, 1.0),
            position: (3, 1),
            requirement: Requirement::Required,
        },
        IndicatorSpec {
            slug: "mfg_orders_to_inventories",
            title: "Mfg Orders to Inventories from 24-Month High",
            trace_name: "Mfg Orders to Inventories from 24-Month High",
            source: InputSource::Fred {
                series: vec!["AMTMNO", "AMTMTI"],
                lookback_years: 50,
            },
            transform: TransformKind::RatioToPeak { window: 24, inputs: 2 },
            y_range: (0.7, 1.0),
            position: (3, 2),
            requirement: Requirement::Required,
        },
        IndicatorSpec {
            slug: "pce_category_diffusion",
            title: "Diffusion Index of PCE Spending Categories (yoy growth)",
            trace_name: "Diffusion Index of PCE Spending Categories (yoy growth)",
            source: InputSource::CategoryFile,
            transform: TransformKind::CategoryBreadth { periods: 12, smoothing: 3 },
            y_range: (0.0, 100.0),
            position: (4, 1),
            requirement: Requirement::Optional,
        },
    ]
});

/// HashMap for O(1) slug -> index lookup
static INDICATOR_MAP: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    INDICATORS
        .iter()
        .enumerate()
        .map(|(idx, ind)| (ind.slug, idx))
        .collect()
});

// ============================================================================
// REGISTRY STRUCT & IMPL
// ============================================================================

pub struct Registry;

impl Registry {
    /// All indicators in processing order
    pub fn all() -> &'static [IndicatorSpec] {
        &INDICATORS
    }

    /// O(1) lookup by slug
    pub fn get(slug: &str) -> Option<&'static IndicatorSpec> {
        INDICATOR_MAP.get(slug).and_then(|&idx| INDICATORS.get(idx))
    }

    pub fn at(row: usize, col: usize) -> Option<&'static IndicatorSpec> {
        INDICATORS.iter().find(|i| i.position == (row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_positions_unique_and_in_grid() {
        let positions: HashSet<_> = Registry::all().iter().map(|i| i.position).collect();
        assert_eq!(positions.len(), Registry::all().len());
        assert!(Registry::all().iter().all(|i| {
            let (r, c) = i.position;
            (1..=GRID_ROWS).contains(&r) && (1..=GRID_COLS).contains(&c)
        }));
        assert!(Registry::at(4, 2).is_none());
    }

    #[test]
    fn test_only_file_indicator_is_optional() {
        for spec in Registry::all() {
            let expected = match spec.source {
                InputSource::CategoryFile => Requirement::Optional,
                InputSource::Fred { .. } => Requirement::Required,
            };
            assert_eq!(spec.requirement, expected, "{}", spec.slug);
        }
    }

    #[test]
    fn test_input_counts_match_transforms() {
        for spec in Registry::all() {
            if let InputSource::Fred { series, .. } = &spec.source {
                assert!(series.len() >= spec.transform.calculator().min_inputs(), "{}", spec.slug);
            }
        }
        assert_eq!(
            Registry::get("payrolls_diffusion").map(|s| match &s.source {
                InputSource::Fred { series, .. } => series.len(),
                InputSource::CategoryFile => 0,
            }),
            Some(21)
        );
    }

    #[test]
    fn test_y_bounds_ordered() {
        assert!(Registry::all().iter().all(|i| i.y_range.0 < i.y_range.1));
    }
}
