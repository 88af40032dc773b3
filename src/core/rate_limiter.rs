use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

pub struct RateLimiter;

impl RateLimiter {
    /// Wait appropriate duration before a request to the given source
    pub async fn wait(source: &str) {
        let delay = match source.to_uppercase().as_str() {
            // FRED allows 120 requests/minute per key; the public graph
            // endpoint is stricter, so stay well under either.
            "FRED" => {
                let mut rng = rand::thread_rng();
                rng.gen_range(500..1000)
            }
            _ => 100,
        };
        sleep(Duration::from_millis(delay)).await;
    }
}
