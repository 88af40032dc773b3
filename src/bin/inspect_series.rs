use leading_indicators_lib::config::Settings;
use leading_indicators_lib::core::orchestrator::fetch_lookback;
use leading_indicators_lib::indicators::registry::{InputSource, Registry, RECESSION_SERIES};

const LOOKBACK_YEARS: u32 = 5;

/// Fetch each series named on the command line (default: every dashboard
/// input) and print a one-line summary per series.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    leading_indicators_lib::init_tracing();
    let settings = Settings::from_env();
    let fetcher = leading_indicators_lib::fred_fetcher(&settings);

    let mut series: Vec<String> = std::env::args().skip(1).collect();
    if series.is_empty() {
        series.push(RECESSION_SERIES.to_string());
        for spec in Registry::all() {
            if let InputSource::Fred { series: ids, .. } = &spec.source {
                series.extend(ids.iter().map(|id| id.to_string()));
            }
        }
    }

    let as_of = chrono::Utc::now().date_naive();

    println!("{:<15} | {:<8} | {:<12} | {:<12} | {:<12}", "Series", "Count", "First", "Last", "Last Val");
    println!("{}", "-".repeat(72));

    for id in &series {
        match fetch_lookback(&fetcher, id, LOOKBACK_YEARS, as_of).await {
            Ok(points) => {
                let first = points.first().map(|dp| dp.timestamp.format("%Y-%m-%d").to_string());
                let last = points.last();
                println!(
                    "{:<15} | {:<8} | {:<12} | {:<12} | {}",
                    id,
                    points.len(),
                    first.unwrap_or_else(|| "N/A".to_string()),
                    last.map(|dp| dp.timestamp.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "N/A".to_string()),
                    last.map(|dp| format!("{:.4}", dp.value)).unwrap_or_else(|| "-".to_string()),
                );
            }
            Err(e) => println!("{:<15} | ERROR: {}", id, e),
        }
    }

    Ok(())
}
