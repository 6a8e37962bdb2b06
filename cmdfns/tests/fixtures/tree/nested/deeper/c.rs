use cmdfns::command;

#[command("gamma")]
pub async fn gamma_async(#[arg(default = "ray")] kind: String) -> String {
    tokio::task::yield_now().await;
    format!("gamma {}", kind)
}
