#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scrumflow_notify::run().await
}
