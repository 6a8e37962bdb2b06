use std::time::Duration;

use cmdfns::command;

/// Counts down, one line per second.
#[command]
async fn countdown(#[arg(default = 3)] from: u32) -> &'static str {
    for n in (1..=from).rev() {
        println!("{}", n);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    "Liftoff!"
}

/// Waits, then says so.
#[command("wait")]
async fn wait_for(seconds: f64, message: Option<String>) -> anyhow::Result<String> {
    let duration = Duration::try_from_secs_f64(seconds)
        .map_err(|e| anyhow::anyhow!("cannot wait {} seconds: {}", seconds, e))?;
    tracing::info!(seconds, "Waiting");
    tokio::time::sleep(duration).await;
    Ok(message.unwrap_or_else(|| format!("Waited {} seconds", seconds)))
}
