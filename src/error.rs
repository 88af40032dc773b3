use thiserror::Error;

/// Errors surfaced by dashboard generation.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A provider call failed for a series.
    #[error("fetch failed for {series_id}: {source}")]
    Fetch {
        series_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The category spending file could not be read or reshaped.
    #[error("category file: {0}")]
    CategoryFile(String),

    /// A transform could not produce a series from its inputs.
    #[error("{slug}: {msg}")]
    Transform { slug: String, msg: String },

    /// A panel was placed outside the grid or on an occupied cell.
    #[error("layout: {0}")]
    Layout(String),

    /// Figure serialization failed.
    #[error("render failed: {0}")]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        DashboardError::CategoryFile(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
