#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scriptlens_server::start().await
}
