use async_trait::async_trait;
use crate::core::rate_limiter::RateLimiter;
use crate::models::DataPoint;
use super::DataSource;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};

pub const API_BASE_URL: &str = "https://api.stlouisfed.org";
pub const GRAPH_BASE_URL: &str = "https://fred.stlouisfed.org";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// FRED client. With an API key it uses the JSON observations API; without
/// one it falls back to the public `fredgraph.csv` download.
pub struct FredFetcher {
    api_key: Option<String>,
    client: Client,
    base_url: Option<String>,
    throttle: bool,
}

impl FredFetcher {
    pub fn new(api_key: Option<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("LeadingIndicators/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        // Sanitize the API key (trim whitespace, lowercase)
        let api_key = api_key
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());

        if let Some(key) = &api_key {
            if key.len() != 32 {
                warn!("FRED API key length is {}, not 32; requests will likely fail", key.len());
            }
        }

        Self { api_key, client, base_url: None, throttle: true }
    }

    /// Point both endpoints at another host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_throttle(mut self, throttle: bool) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_json(
        &self,
        api_key: &str,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>> {
        let base = self.base_url.as_deref().unwrap_or(API_BASE_URL);
        let url = format!("{}/fred/series/observations", base);
        debug!(series_id, %start, %end, "FRED observations request (key length {})", api_key.len());

        let start = start.format(DATE_FORMAT).to_string();
        let end = end.format(DATE_FORMAT).to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("FRED API Error: {} - Body: {}", status, error_text));
        }

        let json: Value = resp.json().await?;
        Self::parse_observations(&json)
    }

    async fn fetch_csv(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>> {
        let base = self.base_url.as_deref().unwrap_or(GRAPH_BASE_URL);
        let url = format!("{}/graph/fredgraph.csv", base);
        debug!(series_id, %start, %end, "FRED graph CSV request");

        let start_str = start.format(DATE_FORMAT).to_string();
        let end_str = end.format(DATE_FORMAT).to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("id", series_id),
                ("cosd", start_str.as_str()),
                ("coed", end_str.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("FRED graph Error: {} - Body: {}", status, error_text));
        }

        let body = resp.text().await?;
        let points = Self::parse_graph_csv(&body)?;
        Ok(points
            .into_iter()
            .filter(|dp| {
                let d = dp.timestamp.date_naive();
                d >= start && d <= end
            })
            .collect())
    }

    fn parse_observations(json: &Value) -> Result<Vec<DataPoint>> {
        let observations = json["observations"]
            .as_array()
            .ok_or_else(|| anyhow!("No observations found in FRED response"))?;

        let mut data_points = Vec::new();

        for obs in observations {
            // "date": "2023-01-01", "value": "123.45"
            if let (Some(date_str), Some(value_str)) = (obs["date"].as_str(), obs["value"].as_str()) {
                if let Some(value) = parse_value(value_str) {
                    let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)?;
                    data_points.push(DataPoint::on(date, value));
                }
            }
        }

        data_points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(data_points)
    }

    /// `observation_date,SERIES` (older downloads use `DATE`) followed by one
    /// row per observation.
    fn parse_graph_csv(body: &str) -> Result<Vec<DataPoint>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.len() < 2 {
            return Err(anyhow!("Unexpected FRED CSV header: {:?}", headers));
        }

        let mut data_points = Vec::new();
        for record in reader.records() {
            let record = record?;
            let (Some(date_str), Some(value_str)) = (record.get(0), record.get(1)) else {
                continue;
            };
            if let Some(value) = parse_value(value_str) {
                let date = NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)?;
                data_points.push(DataPoint::on(date, value));
            }
        }

        data_points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(data_points)
    }
}

/// FRED marks missing observations with "." (and the CSV export with blanks).
fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "." {
        return None;
    }
    raw.parse::<f64>().ok()
}

#[async_trait]
impl DataSource for FredFetcher {
    fn name(&self) -> &str {
        "fred"
    }

    async fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>> {
        if self.throttle {
            RateLimiter::wait(self.name()).await;
        }

        match &self.api_key {
            Some(key) => self.fetch_json(key, series_id, start, end).await,
            None => self.fetch_csv(series_id, start, end).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_valid_response() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "123.45" },
                { "date": "2023-01-02", "value": "124.56" }
            ]
        });

        let points = FredFetcher::parse_observations(&json_data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 123.45);
        assert_eq!(points[1].value, 124.56);
    }

    #[test]
    fn test_parse_missing_value() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "." },
                { "date": "2023-01-02", "value": "100.0" }
            ]
        });

        let points = FredFetcher::parse_observations(&json_data).unwrap();
        assert_eq!(points.len(), 1); // "." should be skipped
        assert_eq!(points[0].value, 100.0);
    }

    #[test]
    fn test_parse_invalid_format() {
        let json_data = json!({ "error": "bad request" });
        let result = FredFetcher::parse_observations(&json_data);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_graph_csv() {
        let body = "observation_date,USREC\n2020-01-01,0\n2020-02-01,.\n2020-03-01,1\n2020-04-01,\n";
        let points = FredFetcher::parse_graph_csv(body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].timestamp.date_naive(), date("2020-03-01"));
        assert_eq!(points[1].value, 1.0);
    }

    #[test]
    fn test_parse_graph_csv_bad_header() {
        assert!(FredFetcher::parse_graph_csv("DATE\n2020-01-01\n").is_err());
    }

    #[test]
    fn test_empty_key_means_keyless() {
        assert!(!FredFetcher::new(Some("   ".to_string())).has_api_key());
        assert!(FredFetcher::new(Some("ABC".to_string())).has_api_key());
    }

    #[tokio::test]
    async fn test_fetch_with_api_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/fred/series/observations")
                    .query_param("series_id", "PERMIT")
                    .query_param("api_key", "abcdefabcdefabcdefabcdefabcdefab")
                    .query_param("observation_start", "2020-01-01")
                    .query_param("observation_end", "2020-12-31");
                then.status(200).json_body(json!({
                    "observations": [
                        { "date": "2020-02-01", "value": "1400" },
                        { "date": "2020-01-01", "value": "1500" }
                    ]
                }));
            })
            .await;

        let fetcher = FredFetcher::new(Some(" ABCDEFABCDEFABCDEFABCDEFABCDEFAB ".to_string()))
            .with_base_url(server.base_url())
            .with_throttle(false);
        let points = fetcher
            .fetch_series("PERMIT", date("2020-01-01"), date("2020-12-31"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 1500.0); // sorted ascending
    }

    #[tokio::test]
    async fn test_fetch_keyless_csv_clips_window() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/graph/fredgraph.csv")
                    .query_param("id", "EMRATIO");
                then.status(200)
                    .body("DATE,EMRATIO\n2019-12-01,61.0\n2020-01-01,61.2\n2020-02-01,61.1\n");
            })
            .await;

        let fetcher = FredFetcher::new(None)
            .with_base_url(server.base_url())
            .with_throttle(false);
        let points = fetcher
            .fetch_series("EMRATIO", date("2020-01-01"), date("2020-06-30"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 61.2);
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/graph/fredgraph.csv");
                then.status(404).body("Series does not exist.");
            })
            .await;

        let fetcher = FredFetcher::new(None)
            .with_base_url(server.base_url())
            .with_throttle(false);
        let err = fetcher
            .fetch_series("NOPE", date("2020-01-01"), date("2020-06-30"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
