#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tabletalk_server::start().await
}
