#[tokio::main]
async fn main() -> anyhow::Result<()> {
    aasrah_client::run().await
}
