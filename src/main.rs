use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lane_affinity::app::run()
        .await
        .context("lane-affinity exited with error")
}
