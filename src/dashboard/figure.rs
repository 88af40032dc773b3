//! Serializable subset of the Plotly figure schema.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    pub name: String,
    pub line: Line,
    pub showlegend: bool,
    pub xaxis: String,
    pub yaxis: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: String,
    pub yref: String,
    pub x0: String,
    pub x1: String,
    pub y0: f64,
    pub y1: f64,
    pub fillcolor: &'static str,
    pub opacity: f64,
    pub line: ShapeLine,
    pub layer: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShapeLine {
    pub width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub text: String,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x: f64,
    pub y: f64,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
    pub showarrow: bool,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisRange {
    Dates(String, String),
    Numbers(f64, f64),
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub domain: [f64; 2],
    pub anchor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<AxisRange>,
    pub showgrid: bool,
    pub gridwidth: f64,
    pub gridcolor: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    pub x: f64,
    pub xanchor: &'static str,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub t: u32,
    pub l: u32,
    pub r: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub height: u32,
    pub showlegend: bool,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub margin: Margin,
    pub annotations: Vec<Annotation>,
    pub shapes: Vec<Shape>,
    /// `xaxis`, `yaxis`, `xaxis2`, ... keyed as Plotly expects
    #[serde(flatten)]
    pub axes: BTreeMap<String, Axis>,
}

/// Subplot geometry in paper coordinates, row 1 at the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            horizontal_spacing: 0.1,
            vertical_spacing: 0.1,
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (1..=self.rows).contains(&row) && (1..=self.cols).contains(&col)
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (1..=self.rows).flat_map(move |r| (1..=self.cols).map(move |c| (r, c)))
    }

    /// 1-based axis number of a cell, row-major.
    pub fn axis_index(&self, row: usize, col: usize) -> usize {
        (row - 1) * self.cols + col
    }

    pub fn x_domain(&self, col: usize) -> [f64; 2] {
        let width = (1.0 - self.horizontal_spacing * (self.cols - 1) as f64) / self.cols as f64;
        let left = (col - 1) as f64 * (width + self.horizontal_spacing);
        [left, left + width]
    }

    pub fn y_domain(&self, row: usize) -> [f64; 2] {
        let height = (1.0 - self.vertical_spacing * (self.rows - 1) as f64) / self.rows as f64;
        let top = 1.0 - (row - 1) as f64 * (height + self.vertical_spacing);
        [top - height, top]
    }
}

/// Trace/shape reference ("x", "x2", ...) for an axis number.
pub fn axis_ref(prefix: &str, index: usize) -> String {
    if index == 1 {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, index)
    }
}

/// Layout key ("xaxis", "xaxis2", ...) for an axis number.
pub fn axis_key(prefix: &str, index: usize) -> String {
    axis_ref(&format!("{}axis", prefix), index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    #[test]
    fn test_grid_domains() {
        let grid = Grid::new(4, 2);
        assert!(close(grid.x_domain(1), [0.0, 0.45]));
        assert!(close(grid.x_domain(2), [0.55, 1.0]));
        assert!(close(grid.y_domain(1), [0.825, 1.0]));
        assert!(close(grid.y_domain(4), [0.0, 0.175]));
    }

    #[test]
    fn test_axis_naming() {
        let grid = Grid::new(4, 2);
        assert_eq!(grid.axis_index(1, 1), 1);
        assert_eq!(grid.axis_index(3, 2), 6);
        assert_eq!(axis_ref("x", 1), "x");
        assert_eq!(axis_ref("y", 6), "y6");
        assert_eq!(axis_key("x", 1), "xaxis");
        assert_eq!(axis_key("y", 8), "yaxis8");
        assert_eq!(grid.cells().count(), 8);
    }

    #[test]
    fn test_axis_range_serializes_as_array() {
        let dates = serde_json::to_value(AxisRange::Dates("2000-01-01".into(), "2040-12-31".into())).unwrap();
        assert_eq!(dates, serde_json::json!(["2000-01-01", "2040-12-31"]));
        let nums = serde_json::to_value(AxisRange::Numbers(0.65, 1.0)).unwrap();
        assert_eq!(nums, serde_json::json!([0.65, 1.0]));
    }
}
