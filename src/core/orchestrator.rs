use crate::config::Settings;
use crate::core::timeseries::{clip_to_window, lookback_start};
use crate::dashboard::figure::Grid;
use crate::dashboard::{html, Dashboard};
use crate::error::{DashboardError, Result};
use crate::fetcher::DataSource;
use crate::indicators::category_file::load_category_series;
use crate::indicators::registry::{
    axis_end, IndicatorSpec, InputSource, Registry, Requirement, DASHBOARD_TITLE, GRID_COLS,
    GRID_ROWS, RECESSION_LOOKBACK_YEARS, RECESSION_SERIES,
};
use crate::models::{midnight_utc, DataPoint, DerivedIndicator};
use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

/// Fetch one series over the trailing `years`, ending on `as_of`.
pub async fn fetch_lookback(
    source: &dyn DataSource,
    series_id: &str,
    years: u32,
    as_of: NaiveDate,
) -> Result<Vec<DataPoint>> {
    let start = lookback_start(as_of, years);
    let data = source
        .fetch_series(series_id, start, as_of)
        .await
        .map_err(|e| DashboardError::Fetch {
            series_id: series_id.to_string(),
            source: e,
        })?;

    Ok(clip_to_window(data, start, as_of))
}

/// Resolve inputs for `spec` and apply its transform.
pub async fn derive_indicator(
    source: &dyn DataSource,
    spec: &IndicatorSpec,
    settings: &Settings,
    as_of: NaiveDate,
) -> Result<DerivedIndicator> {
    let inputs: Vec<Vec<DataPoint>> = match &spec.source {
        InputSource::Fred { series, lookback_years } => {
            // One request at a time, in declaration order
            let mut inputs = Vec::with_capacity(series.len());
            for series_id in series {
                inputs.push(fetch_lookback(source, series_id, *lookback_years, as_of).await?);
            }
            inputs
        }
        InputSource::CategoryFile => load_category_series(&settings.category_file)?
            .into_iter()
            .map(|c| c.points)
            .collect(),
    };

    let calculator = spec.transform.calculator();
    let points = calculator
        .calculate(&inputs)
        .map_err(|e| DashboardError::Transform {
            slug: spec.slug.to_string(),
            msg: e.to_string(),
        })?;

    // A window longer than the data leaves nothing to plot; the axis then
    // starts at the first raw observation.
    let x_start = points
        .first()
        .map(|dp| dp.timestamp)
        .or_else(|| inputs.iter().filter_map(|s| s.first()).map(|dp| dp.timestamp).min())
        .ok_or_else(|| DashboardError::Transform {
            slug: spec.slug.to_string(),
            msg: "no observations".to_string(),
        })?;

    if points.is_empty() {
        warn!(slug = spec.slug, "Transform produced no defined values; panel will be blank");
    }

    Ok(DerivedIndicator {
        slug: spec.slug.to_string(),
        title: spec.title.to_string(),
        trace_name: spec.trace_name.to_string(),
        points,
        x_range: (x_start, midnight_utc(axis_end())),
        y_range: spec.y_range,
    })
}

/// Build the dashboard from the registry.
pub async fn build_dashboard(
    source: &dyn DataSource,
    settings: &Settings,
    as_of: NaiveDate,
    generated_at: DateTime<Utc>,
) -> Result<Dashboard> {
    build_dashboard_from(Registry::all(), source, settings, as_of, generated_at).await
}

/// Derive each indicator in order and place it on the grid.
///
/// A `Required` indicator's failure is returned immediately; an `Optional`
/// one is logged and its cell keeps the title with no data.
pub async fn build_dashboard_from(
    specs: &[IndicatorSpec],
    source: &dyn DataSource,
    settings: &Settings,
    as_of: NaiveDate,
    generated_at: DateTime<Utc>,
) -> Result<Dashboard> {
    info!("Fetching recession indicator ({})", RECESSION_SERIES);
    let recessions = fetch_lookback(source, RECESSION_SERIES, RECESSION_LOOKBACK_YEARS, as_of).await?;

    let mut dashboard = Dashboard::new(
        DASHBOARD_TITLE,
        Grid::new(GRID_ROWS, GRID_COLS),
        recessions,
        generated_at,
    );

    for (i, spec) in specs.iter().enumerate() {
        info!("Processing Chart {}: {}...", i + 1, spec.title);

        let (row, col) = spec.position;
        match derive_indicator(source, spec, settings, as_of).await {
            Ok(indicator) => dashboard.add_panel(row, col, indicator)?,
            Err(e) if spec.requirement == Requirement::Optional => {
                warn!(slug = spec.slug, "Could not process {}: {}", spec.title, e);
                dashboard.mark_unavailable(row, col, spec.title)?;
                if spec.source == InputSource::CategoryFile {
                    warn!(
                        "Make sure {} is in the working directory",
                        settings.category_file.display()
                    );
                }
            }
            Err(e) => return Err(e),
        }
    }

    Ok(dashboard)
}

/// Build the dashboard and write it to `settings.output_path`.
/// Nothing is written when a required indicator fails.
pub async fn generate(
    source: &dyn DataSource,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    info!("Creating US Leading Indicators Dashboard...");
    let dashboard = build_dashboard(source, settings, now.date_naive(), now).await?;

    let page = html::render_html(&dashboard.to_figure(), &settings.plotly_js)?;
    html::write_html(&settings.output_path, &page)?;

    info!(
        panels = dashboard.panels.len(),
        "Dashboard saved to {}",
        settings.output_path.display()
    );
    Ok(settings.output_path.clone())
}
