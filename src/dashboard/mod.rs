pub mod figure;
pub mod html;

use crate::analysis::statistics::quantile;
use crate::core::timeseries::month_end;
use crate::error::{DashboardError, Result};
use crate::models::{DataPoint, DerivedIndicator, PanelSpec};
use chrono::{DateTime, Utc};
use figure::{
    axis_key, axis_ref, Annotation, Axis, AxisRange, Figure, Font, Grid, Layout, Line, Margin,
    Shape, ShapeLine, Title, Trace,
};
use std::collections::BTreeMap;

const REFERENCE_QUANTILE: f64 = 0.2;
const HEIGHT: u32 = 1600;
const GRID_COLOR: &str = "LightGray";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A cell reserved for an indicator that could not be derived. It keeps its
/// subplot title and gridlines but carries no traces.
#[derive(Debug, Clone, PartialEq)]
pub struct UnavailablePanel {
    pub row: usize,
    pub col: usize,
    pub title: String,
}

/// The assembled grid: populated panels, the shared recession flags, and
/// the render timestamp.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub grid: Grid,
    pub panels: Vec<PanelSpec>,
    pub unavailable: Vec<UnavailablePanel>,
    pub recessions: Vec<DataPoint>,
    pub generated_at: DateTime<Utc>,
}

impl Dashboard {
    pub fn new(
        title: impl Into<String>,
        grid: Grid,
        recessions: Vec<DataPoint>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            grid,
            panels: Vec::new(),
            unavailable: Vec::new(),
            recessions,
            generated_at,
        }
    }

    fn check_free(&self, row: usize, col: usize) -> Result<()> {
        if !self.grid.contains(row, col) {
            return Err(DashboardError::Layout(format!(
                "cell ({}, {}) is outside the {}x{} grid",
                row, col, self.grid.rows, self.grid.cols
            )));
        }
        if self.is_titled(row, col) {
            return Err(DashboardError::Layout(format!("cell ({}, {}) is already used", row, col)));
        }
        Ok(())
    }

    pub fn add_panel(&mut self, row: usize, col: usize, indicator: DerivedIndicator) -> Result<()> {
        self.check_free(row, col)?;
        self.panels.push(PanelSpec { row, col, indicator });
        Ok(())
    }

    /// Keep the cell titled when its indicator failed.
    pub fn mark_unavailable(&mut self, row: usize, col: usize, title: impl Into<String>) -> Result<()> {
        self.check_free(row, col)?;
        self.unavailable.push(UnavailablePanel { row, col, title: title.into() });
        Ok(())
    }

    pub fn panel_at(&self, row: usize, col: usize) -> Option<&PanelSpec> {
        self.panels.iter().find(|p| p.row == row && p.col == col)
    }

    fn is_titled(&self, row: usize, col: usize) -> bool {
        self.panel_at(row, col).is_some()
            || self.unavailable.iter().any(|p| p.row == row && p.col == col)
    }

    /// Cells with neither a panel nor a reserved title.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.grid
            .cells()
            .filter(|(r, c)| !self.is_titled(*r, *c))
            .collect()
    }

    /// Month starts flagged as recession.
    fn recession_months(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.recessions
            .iter()
            .filter(|dp| dp.value == 1.0)
            .map(|dp| dp.timestamp)
    }

    pub fn to_figure(&self) -> Figure {
        let mut axes = BTreeMap::new();
        for (row, col) in self.grid.cells() {
            let idx = self.grid.axis_index(row, col);
            axes.insert(axis_key("x", idx), grid_axis(self.grid.x_domain(col), axis_ref("y", idx)));
            axes.insert(axis_key("y", idx), grid_axis(self.grid.y_domain(row), axis_ref("x", idx)));
        }

        let mut layout = Layout {
            title: Title {
                text: self.title.clone(),
                x: 0.5,
                xanchor: "center",
                font: Font { size: 24, color: None },
            },
            height: HEIGHT,
            showlegend: false,
            paper_bgcolor: "white",
            plot_bgcolor: "white",
            margin: Margin { t: 100, l: 50, r: 50, b: 50 },
            annotations: Vec::new(),
            shapes: Vec::new(),
            axes,
        };
        let mut data = Vec::new();

        for panel in &self.panels {
            self.render_panel(panel, &mut data, &mut layout);
        }
        for reserved in &self.unavailable {
            let title = self.subplot_title(reserved.row, reserved.col, &reserved.title);
            layout.annotations.push(title);
        }

        layout.annotations.push(Annotation {
            text: format!("Last Updated: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC")),
            xref: "paper",
            yref: "paper",
            x: 0.5,
            y: -0.02,
            xanchor: "center",
            yanchor: "top",
            showarrow: false,
            font: Font { size: 12, color: Some("gray") },
        });

        Figure { data, layout }
    }

    fn render_panel(&self, panel: &PanelSpec, data: &mut Vec<Trace>, layout: &mut Layout) {
        let ind = &panel.indicator;
        let idx = self.grid.axis_index(panel.row, panel.col);
        let (xref, yref) = (axis_ref("x", idx), axis_ref("y", idx));
        let x: Vec<String> = ind
            .points
            .iter()
            .map(|dp| dp.timestamp.format(DATE_FORMAT).to_string())
            .collect();

        data.push(Trace {
            kind: "scatter",
            x: x.clone(),
            y: ind.values(),
            mode: "lines",
            name: ind.trace_name.clone(),
            line: Line { color: "blue", dash: None },
            showlegend: false,
            xaxis: xref.clone(),
            yaxis: yref.clone(),
        });

        if let Some(reference) = quantile(&ind.values(), REFERENCE_QUANTILE) {
            data.push(Trace {
                kind: "scatter",
                y: vec![reference; x.len()],
                x,
                mode: "lines",
                name: "20% quantile".to_string(),
                line: Line { color: "gray", dash: Some("dash") },
                showlegend: false,
                xaxis: xref.clone(),
                yaxis: yref.clone(),
            });
        }

        let (y0, y1) = ind.y_range;
        for start in self.recession_months() {
            layout.shapes.push(Shape {
                kind: "rect",
                xref: xref.clone(),
                yref: yref.clone(),
                x0: start.format(DATE_FORMAT).to_string(),
                x1: month_end(start).format(DATE_FORMAT).to_string(),
                y0,
                y1,
                fillcolor: "lightgray",
                opacity: 0.7,
                line: ShapeLine { width: 0.0 },
                layer: "below",
            });
        }

        if let Some(axis) = layout.axes.get_mut(&axis_key("x", idx)) {
            axis.range = Some(AxisRange::Dates(
                ind.x_range.0.format(DATE_FORMAT).to_string(),
                ind.x_range.1.format(DATE_FORMAT).to_string(),
            ));
        }
        if let Some(axis) = layout.axes.get_mut(&axis_key("y", idx)) {
            axis.range = Some(AxisRange::Numbers(y0, y1));
        }

        layout.annotations.push(self.subplot_title(panel.row, panel.col, &ind.title));
    }

    /// Title centred above the cell.
    fn subplot_title(&self, row: usize, col: usize, text: &str) -> Annotation {
        let xd = self.grid.x_domain(col);
        let yd = self.grid.y_domain(row);
        Annotation {
            text: text.to_string(),
            xref: "paper",
            yref: "paper",
            x: (xd[0] + xd[1]) / 2.0,
            y: yd[1],
            xanchor: "center",
            yanchor: "bottom",
            showarrow: false,
            font: Font { size: 16, color: None },
        }
    }
}

fn grid_axis(domain: [f64; 2], anchor: String) -> Axis {
    Axis {
        domain,
        anchor,
        range: None,
        showgrid: true,
        gridwidth: 1.0,
        gridcolor: GRID_COLOR,
    }
}
