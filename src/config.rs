use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "index.html";
pub const DEFAULT_CATEGORY_FILE: &str = "pce_spend.csv";
pub const PLOTLY_CDN_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Where the page gets Plotly.js from.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotlyJs {
    /// `<script src=...>` pointing at the CDN bundle
    Cdn,
    /// Contents of a local bundle inlined into the page
    Inline(PathBuf),
}

/// Runtime settings. Everything has a compiled-in default; the environment
/// (and a `.env` file) may override the file locations and the FRED key.
#[derive(Debug, Clone)]
pub struct Settings {
    pub fred_api_key: Option<String>,
    pub fred_base_url: Option<String>,
    pub output_path: PathBuf,
    pub category_file: PathBuf,
    pub plotly_js: PlotlyJs,
    pub throttle: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            fred_base_url: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            category_file: PathBuf::from(DEFAULT_CATEGORY_FILE),
            plotly_js: PlotlyJs::Cdn,
            throttle: true,
        }
    }
}

impl Settings {
    /// Load from process environment, reading `.env` first if present.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            fred_api_key: get("FRED_API_KEY"),
            fred_base_url: get("FRED_BASE_URL"),
            output_path: get("DASHBOARD_OUTPUT").map(PathBuf::from).unwrap_or(defaults.output_path),
            category_file: get("PCE_SPEND_FILE").map(PathBuf::from).unwrap_or(defaults.category_file),
            plotly_js: get("PLOTLY_JS_PATH")
                .map(|p| PlotlyJs::Inline(PathBuf::from(p)))
                .unwrap_or(PlotlyJs::Cdn),
            throttle: get("FRED_THROTTLE").map(|v| v != "0").unwrap_or(true),
        }
    }
}
