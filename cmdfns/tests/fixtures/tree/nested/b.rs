use cmdfns::command;

#[command]
pub fn beta(times: u32) -> String {
    "beta".repeat(times as usize)
}
