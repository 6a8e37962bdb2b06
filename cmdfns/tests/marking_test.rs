//! Integration tests for `#[command]` marking and dispatch of marked functions

use std::sync::Mutex;

use cmdfns::{
    command, BindingErrorKind, Config, DeclaredType, Dispatcher, Framing, Outcome, Output, Registry,
};

static COUNTDOWN_LOG: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Greets someone by name.
///
/// The last name defaults to Bond.
#[command]
fn greet(first_name: String, #[arg(default = "Bond")] last_name: String) -> String {
    format!("Hello {} {}", first_name, last_name)
}

#[command("add")]
fn add_numbers(a: i64, b: i64) -> i64 {
    a + b
}

#[command(name = "scale")]
fn scale_value(value: f64, #[arg(default = 2)] factor: u8, #[arg(default = false)] negate: bool) -> f64 {
    let scaled = value * f64::from(factor);
    if negate {
        -scaled
    } else {
        scaled
    }
}

#[command]
fn title(name: String, honorific: Option<String>) -> String {
    match honorific {
        Some(h) => format!("{} {}", h, name),
        None => name,
    }
}

#[command]
fn total(numbers: Vec<i64>) -> i64 {
    numbers.iter().sum()
}

#[command]
fn half(n: u8) -> u8 {
    n / 2
}

#[command]
fn widest(n: u64) -> u64 {
    n
}

#[command]
fn fail_on(value: String) -> anyhow::Result<String> {
    if value == "bad" {
        anyhow::bail!("refusing '{}'", value);
    }
    Ok(value)
}

#[command]
async fn countdown(from: u32) {
    for n in (1..=from).rev() {
        COUNTDOWN_LOG.lock().unwrap().push(format!("tick {}", n));
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    COUNTDOWN_LOG.lock().unwrap().push("liftoff".to_string());
}

fn tokens(strs: &[&str]) -> Vec<String> {
    strs.iter().map(|s| s.to_string()).collect()
}

fn dispatcher() -> Dispatcher {
    let registry = Registry::new();
    registry.mark_linked().expect("Failed to mark linked commands");
    Dispatcher::with_config(registry, &Config::default().with_program("marks"))
}

fn run(name: &str, args: &[&str]) -> Outcome {
    let mut out = Vec::new();
    dispatcher()
        .dispatch(name, &tokens(args), &mut out)
        .expect("Dispatch failed")
}

#[test]
fn test_marked_function_is_still_callable() {
    assert_eq!(greet("James".to_string(), "Bond".to_string()), "Hello James Bond");
    assert_eq!(add_numbers(2, 3), 5);
}

#[test]
fn test_mark_linked_registers_every_command() {
    let registry = Registry::new();
    let count = registry.mark_linked().unwrap();

    assert_eq!(count, 9);
    assert_eq!(
        registry.command_names(),
        vec!["add", "countdown", "fail_on", "greet", "half", "scale", "title", "total", "widest"]
    );
    assert!(registry.get("countdown").unwrap().is_async());
    assert!(registry.get("total").unwrap().is_variadic());
}

#[test]
fn test_signature_is_recorded() {
    let registry = Registry::new();
    registry.mark_linked().unwrap();

    let scale = registry.get("scale").unwrap();
    let params = scale.parameters();
    assert_eq!(params.len(), 3);
    assert_eq!(params[0].declared_type, DeclaredType::Float);
    assert_eq!(params[1].declared_type, DeclaredType::Int);
    assert_eq!(params[1].default.as_deref(), Some("2"));
    assert_eq!(params[2].declared_type, DeclaredType::Bool);
    assert_eq!(params[2].default.as_deref(), Some("False"));

    let greet = registry.get("greet").unwrap();
    assert_eq!(greet.parameters()[0].declared_type, DeclaredType::Other);
    assert!(greet.source().is_none());
}

#[test]
fn test_keyword_and_positional_binding() {
    assert_eq!(
        run("greet", &["last_name=Bond", "first_name=James"]),
        Outcome::Completed(Output::text("Hello James Bond"))
    );
    assert_eq!(
        run("greet", &["James", "Bond"]),
        Outcome::Completed(Output::text("Hello James Bond"))
    );
    assert_eq!(
        run("greet", &["Eve", "Moneypenny"]),
        Outcome::Completed(Output::text("Hello Eve Moneypenny"))
    );
}

#[test]
fn test_defaults_and_coercion() {
    assert_eq!(run("greet", &["James"]), Outcome::Completed(Output::text("Hello James Bond")));
    assert_eq!(run("scale", &["1.5"]), Outcome::Completed(Output::text("3")));
    assert_eq!(
        run("scale", &["1.5", "negate=true", "factor=3"]),
        Outcome::Completed(Output::text("-4.5"))
    );
    assert_eq!(run("add", &["4", "5"]), Outcome::Completed(Output::text("9")));
}

#[test]
fn test_optional_and_variadic_parameters() {
    assert_eq!(run("title", &["Bond"]), Outcome::Completed(Output::text("Bond")));
    assert_eq!(run("title", &["Bond", "Mr"]), Outcome::Completed(Output::text("Mr Bond")));
    assert_eq!(run("total", &["1", "2", "3"]), Outcome::Completed(Output::text("6")));
    assert_eq!(run("total", &[]), Outcome::Completed(Output::text("0")));
}

#[test]
fn test_invalid_int_is_reported() {
    let mut out = Vec::new();
    let outcome = dispatcher()
        .dispatch("add", &tokens(&["4.5", "1"]), &mut out)
        .unwrap();

    match outcome {
        Outcome::BindFailed(e) => assert_eq!(
            e.kind,
            BindingErrorKind::InvalidType {
                parameter: "a".to_string(),
                value: "4.5".to_string(),
                expected: DeclaredType::Int,
            }
        ),
        other => panic!("Expected BindFailed, got {:?}", other),
    }
    assert!(String::from_utf8(out).unwrap().ends_with("Usage: marks add A B\n"));
}

#[test]
fn test_out_of_range_for_parameter_type_is_reported() {
    assert!(matches!(run("half", &["300"]), Outcome::BindFailed(_)));
    assert_eq!(run("half", &["200"]), Outcome::Completed(Output::text("100")));
}

#[test]
fn test_unsigned_parameter_accepts_values_above_i64_max() {
    assert_eq!(
        run("widest", &["18446744073709551615"]),
        Outcome::Completed(Output::text("18446744073709551615"))
    );
    assert!(matches!(run("widest", &["-1"]), Outcome::BindFailed(_)));
    assert!(matches!(run("widest", &["18446744073709551616"]), Outcome::BindFailed(_)));
}

#[test]
fn test_command_error_reaches_caller() {
    let mut out = Vec::new();
    let err = dispatcher()
        .dispatch("fail_on", &tokens(&["bad"]), &mut out)
        .unwrap_err();

    assert_eq!(err.command_error().unwrap().to_string(), "refusing 'bad'");
    assert!(out.is_empty());
}

#[test]
fn test_help_includes_doc_text() {
    let dispatcher = dispatcher();
    let text = dispatcher
        .help()
        .format_help(dispatcher.registry(), Some("greet"), Framing::Program);

    assert_eq!(
        text,
        "Usage: marks greet FIRST_NAME [LAST_NAME=Bond]\n\
         \n\
         Greets someone by name.\n\
         \n\
         The last name defaults to Bond.\n"
    );
}

#[test]
fn test_async_command_needs_async_dispatch() {
    assert_eq!(run("countdown", &["1"]), Outcome::RequiresAsync("countdown".to_string()));
}

#[tokio::test]
async fn test_async_command_runs_to_completion_in_order() {
    COUNTDOWN_LOG.lock().unwrap().clear();
    let mut out = Vec::new();

    let outcome = dispatcher()
        .dispatch_async("countdown", &tokens(&["3"]), &mut out)
        .await
        .unwrap();
    COUNTDOWN_LOG.lock().unwrap().push("returned".to_string());

    assert_eq!(outcome, Outcome::Completed(Output::Silent));
    assert_eq!(
        *COUNTDOWN_LOG.lock().unwrap(),
        vec!["tick 3", "tick 2", "tick 1", "liftoff", "returned"]
    );
}

#[test]
fn test_explicit_registries_are_independent() {
    let marked = Registry::new();
    marked.mark_linked().unwrap();
    let empty = Registry::new();

    assert_eq!(marked.len(), 9);
    assert!(empty.is_empty());
    assert!(!empty.contains("greet"));
}
