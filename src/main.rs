#[tokio::main]
async fn main() -> anyhow::Result<()> {
    leading_indicators_lib::run().await
}
