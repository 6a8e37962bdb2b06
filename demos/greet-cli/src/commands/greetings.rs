use cmdfns::command;

#[command]
fn say_hello() -> &'static str {
    "Hello!"
}

#[command]
fn say_goodbye() -> &'static str {
    "Goodbye!"
}

/// Greets someone by name.
///
/// Both names can be given by keyword: `greet last_name=Bond first_name=James`.
#[command]
fn greet(first_name: String, #[arg(default = "Bond")] last_name: String) -> String {
    format!("Hello {} {}", first_name, last_name)
}

/// Greets everyone listed.
#[command]
fn greet_all(names: Vec<String>) -> String {
    if names.is_empty() {
        return "Nobody to greet".to_string();
    }
    names
        .iter()
        .map(|name| format!("Hello {}", name))
        .collect::<Vec<_>>()
        .join("\n")
}
