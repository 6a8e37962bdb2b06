use cmdfns::command;

/// First of the fixture commands.
#[command]
pub fn alpha() -> &'static str {
    "alpha"
}
