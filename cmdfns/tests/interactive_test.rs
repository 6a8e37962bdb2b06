//! Integration tests for interactive sessions over marked commands

use std::io::Cursor;
use std::sync::Mutex;

use cmdfns::{command, Config, Dispatcher, Registry};

static CALLS: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

#[command]
fn say_hello() {
    CALLS.lock().unwrap().push("say_hello");
}

#[command]
fn say_goodbye() {
    CALLS.lock().unwrap().push("say_goodbye");
}

#[command]
async fn whisper(words: Vec<String>) -> String {
    tokio::task::yield_now().await;
    words.join(" ").to_lowercase()
}

fn dispatcher() -> Dispatcher {
    let registry = Registry::new();
    registry.mark_linked().unwrap();
    Dispatcher::with_config(registry, &Config::default().with_program("shell"))
}

// One test drives the shared call log so the order assertions hold.
#[tokio::test]
async fn test_sessions_run_commands_in_order() {
    let script = "say_hello\nsay_goodbye\nhelp\nquit\nsay_hello\n";

    CALLS.lock().unwrap().clear();
    let mut input = Cursor::new(script);
    let mut out = Vec::new();
    dispatcher().run_interactive(&mut input, &mut out).unwrap();

    assert_eq!(*CALLS.lock().unwrap(), vec!["say_hello", "say_goodbye"]);
    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with(
        "Usage: > COMMAND [ARGS]\n\
         \n\
         Where COMMAND is one of:\n  \
           say_goodbye\n  \
           say_hello\n  \
           whisper\n\
         \n\
         Use 'quit' to quit or 'help COMMAND' for command-specific help\n\
         > "
    ));
    assert_eq!(input.position() as usize, script.len() - "say_hello\n".len());

    CALLS.lock().unwrap().clear();
    let mut out = Vec::new();
    dispatcher()
        .run_interactive_async(tokio::io::BufReader::new(script.as_bytes()), &mut out)
        .await
        .unwrap();
    assert_eq!(*CALLS.lock().unwrap(), vec!["say_hello", "say_goodbye"]);
}

#[tokio::test]
async fn test_async_command_in_async_session() {
    let mut out = Vec::new();

    dispatcher()
        .run_interactive_async(
            tokio::io::BufReader::new("whisper \"HELLO THERE\" FRIEND\n".as_bytes()),
            &mut out,
        )
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "> hello there friend\n> ");
}

#[test]
fn test_async_command_in_sync_session() {
    let mut out = Vec::new();

    dispatcher()
        .run_interactive(Cursor::new("whisper hi\n"), &mut out)
        .unwrap();

    assert!(String::from_utf8(out).unwrap().contains("Command 'whisper' is asynchronous"));
}

#[test]
fn test_unknown_command_shows_interactive_listing() {
    let mut out = Vec::new();

    dispatcher()
        .run_interactive(Cursor::new("launch\nhelp whisper\n"), &mut out)
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("> Usage: > COMMAND [ARGS]\n"));
    assert!(text.contains("> Usage: > whisper [WORDS...]\n"));
}
