mod greetings;
mod maths;
mod timers;

/// Directory scanned for commands.
pub fn search_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/src/commands")
}
