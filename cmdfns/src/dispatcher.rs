//! Dispatch: look up, bind, invoke.
//!
//! Anything the engine can diagnose itself (unknown command, bad arguments)
//! is written to the output sink and reported as an [`Outcome`]. Failures of
//! the command body are returned as [`DispatchError::Command`] unchanged.

use std::io::Write;
use std::sync::Arc;

use crate::binder;
use crate::command::{Callable, Command, CommandResult, HELP_COMMAND};
use crate::config::Config;
use crate::error::{BindingError, CommandError, DispatchError};
use crate::help::{Framing, HelpFormatter};
use crate::output::Output;
use crate::registry::Registry;
use crate::value::Arguments;

/// Result of one dispatch that did not fail inside the command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The command ran; this is what it returned.
    Completed(Output),

    /// Help text was printed on request.
    Help,

    /// No such command; the full listing was printed.
    NotFound(String),

    /// The arguments did not bind; the error and usage were printed.
    BindFailed(BindingError),

    /// An asynchronous command was reached through the synchronous
    /// dispatcher and was not run.
    RequiresAsync(String),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    /// The command's output, if it ran.
    pub fn output(&self) -> Option<&Output> {
        match self {
            Outcome::Completed(output) => Some(output),
            _ => None,
        }
    }
}

enum Step {
    Done(Outcome),
    Invoke(Arc<Command>, Arguments),
}

/// Dispatches command lines against a registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Registry,
    help: HelpFormatter,
    pub(crate) prompt: String,
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration.
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, &Config::default())
    }

    pub fn with_config(registry: Registry, config: &Config) -> Self {
        Self {
            registry,
            help: HelpFormatter::new(config.program.clone()),
            prompt: config.prompt.clone(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn help(&self) -> &HelpFormatter {
        &self.help
    }

    /// Dispatch one command synchronously.
    ///
    /// Asynchronous commands are not run here; see [`Outcome::RequiresAsync`].
    pub fn dispatch<W: Write>(
        &self,
        name: &str,
        tokens: &[String],
        out: &mut W,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch_framed(name, tokens, Framing::Program, out)
    }

    /// Dispatch one command, awaiting it if it is asynchronous.
    ///
    /// Must be called from inside the caller's async runtime.
    pub async fn dispatch_async<W: Write>(
        &self,
        name: &str,
        tokens: &[String],
        out: &mut W,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch_framed_async(name, tokens, Framing::Program, out)
            .await
    }

    /// Run a full argument vector. `argv[0]` is the program and is ignored.
    pub fn run_argv<W: Write>(&self, argv: &[String], out: &mut W) -> Result<Outcome, DispatchError> {
        let Some((name, tokens)) = split_argv(argv) else {
            return self.print_usage(out);
        };
        let outcome = self.dispatch(name, tokens, out)?;
        print_output(&outcome, out)?;
        Ok(outcome)
    }

    /// Async form of [`run_argv`](Self::run_argv).
    pub async fn run_argv_async<W: Write>(
        &self,
        argv: &[String],
        out: &mut W,
    ) -> Result<Outcome, DispatchError> {
        let Some((name, tokens)) = split_argv(argv) else {
            return self.print_usage(out);
        };
        let outcome = self.dispatch_async(name, tokens, out).await?;
        print_output(&outcome, out)?;
        Ok(outcome)
    }

    pub(crate) fn dispatch_framed<W: Write>(
        &self,
        name: &str,
        tokens: &[String],
        framing: Framing,
        out: &mut W,
    ) -> Result<Outcome, DispatchError> {
        let (command, arguments) = match self.prepare(name, tokens, framing, out)? {
            Step::Done(outcome) => return Ok(outcome),
            Step::Invoke(command, arguments) => (command, arguments),
        };

        let result = match command.callable() {
            Callable::Sync(f) => f(arguments),
            Callable::Async(_) => {
                tracing::warn!(command = name, "Asynchronous command reached the synchronous dispatcher");
                writeln!(
                    out,
                    "Command '{}' is asynchronous and must be run by the async dispatcher",
                    name
                )?;
                return Ok(Outcome::RequiresAsync(name.to_string()));
            }
        };
        self.finish(&command, result, framing, out)
    }

    pub(crate) async fn dispatch_framed_async<W: Write>(
        &self,
        name: &str,
        tokens: &[String],
        framing: Framing,
        out: &mut W,
    ) -> Result<Outcome, DispatchError> {
        let (command, arguments) = match self.prepare(name, tokens, framing, out)? {
            Step::Done(outcome) => return Ok(outcome),
            Step::Invoke(command, arguments) => (command, arguments),
        };

        let result = match command.callable() {
            Callable::Sync(f) => f(arguments),
            Callable::Async(f) => f(arguments).await,
        };
        self.finish(&command, result, framing, out)
    }

    fn prepare<W: Write>(
        &self,
        name: &str,
        tokens: &[String],
        framing: Framing,
        out: &mut W,
    ) -> Result<Step, DispatchError> {
        if name == HELP_COMMAND {
            let topic = tokens.first().map(String::as_str);
            let text = self.help.format_help(&self.registry, topic, framing);
            out.write_all(text.as_bytes())?;
            return Ok(Step::Done(Outcome::Help));
        }

        let Some(command) = self.registry.get(name) else {
            tracing::warn!(command = name, "Command not found");
            let text = self.help.format_listing(&self.registry, framing);
            out.write_all(text.as_bytes())?;
            return Ok(Step::Done(Outcome::NotFound(name.to_string())));
        };

        match binder::bind(&command, tokens) {
            Ok(arguments) => {
                tracing::debug!(command = name, arguments = arguments.len(), "Invoking command");
                Ok(Step::Invoke(command, arguments))
            }
            Err(e) => self.report_binding(&command, e, framing, out).map(Step::Done),
        }
    }

    fn finish<W: Write>(
        &self,
        command: &Command,
        result: CommandResult,
        framing: Framing,
        out: &mut W,
    ) -> Result<Outcome, DispatchError> {
        match result {
            Ok(output) => Ok(Outcome::Completed(output)),
            Err(CommandError::Binding(e)) => self.report_binding(command, e, framing, out),
            Err(CommandError::Failed(e)) => Err(DispatchError::Command(e)),
        }
    }

    fn report_binding<W: Write>(
        &self,
        command: &Command,
        error: BindingError,
        framing: Framing,
        out: &mut W,
    ) -> Result<Outcome, DispatchError> {
        tracing::warn!(command = %command.name(), error = %error, "Invalid arguments");
        writeln!(out, "{}", error)?;
        writeln!(out)?;
        writeln!(out, "{}", self.help.usage_line(command, framing))?;
        Ok(Outcome::BindFailed(error))
    }

    fn print_usage<W: Write>(&self, out: &mut W) -> Result<Outcome, DispatchError> {
        let text = self.help.format_listing(&self.registry, Framing::Program);
        out.write_all(text.as_bytes())?;
        Ok(Outcome::Help)
    }
}

fn split_argv(argv: &[String]) -> Option<(&str, &[String])> {
    let (name, tokens) = argv.get(1..)?.split_first()?;
    Some((name.as_str(), tokens))
}

pub(crate) fn print_output<W: Write>(outcome: &Outcome, out: &mut W) -> std::io::Result<()> {
    match outcome.output() {
        Some(output) if !output.is_empty() => writeln!(out, "{}", output),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{DeclaredType, Parameter};
    use crate::error::BindingErrorKind;
    use std::sync::Mutex;

    fn tokens(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    fn dispatcher() -> Dispatcher {
        let registry = Registry::from_commands([
            Command::new(
                "greet",
                vec![Parameter::new("first_name"), Parameter::new("last_name")],
                Callable::sync(|mut args| {
                    let first: String = args.take("first_name")?;
                    let last: String = args.take("last_name")?;
                    Ok(Output::Text(format!("Hello {} {}", first, last)))
                }),
            )
            .unwrap(),
            Command::new(
                "half",
                vec![Parameter::new("n").typed(DeclaredType::Int)],
                Callable::sync(|mut args| {
                    let n: u8 = args.take("n")?;
                    Ok(Output::Text((n / 2).to_string()))
                }),
            )
            .unwrap(),
            Command::new(
                "fail",
                vec![],
                Callable::sync(|_| Err(CommandError::Failed(anyhow::anyhow!("command exploded")))),
            )
            .unwrap(),
            Command::new(
                "wait",
                vec![],
                Callable::asynchronous(|_| async { Ok(Output::text("waited")) }),
            )
            .unwrap(),
        ]);
        Dispatcher::with_config(registry, &Config::default().with_program("demo"))
    }

    #[test]
    fn test_dispatch_sync_command() {
        let mut out = Vec::new();
        let outcome = dispatcher()
            .dispatch("greet", &tokens(&["last_name=Bond", "first_name=James"]), &mut out)
            .unwrap();

        assert_eq!(outcome, Outcome::Completed(Output::text("Hello James Bond")));
        assert!(out.is_empty());
    }

    #[test]
    fn test_not_found_prints_same_listing_as_help() {
        let dispatcher = dispatcher();

        let mut help_out = Vec::new();
        let help = dispatcher.dispatch("help", &[], &mut help_out).unwrap();
        let mut missing_out = Vec::new();
        let missing = dispatcher.dispatch("foo", &[], &mut missing_out).unwrap();

        assert_eq!(help, Outcome::Help);
        assert_eq!(missing, Outcome::NotFound("foo".to_string()));
        assert_eq!(help_out, missing_out);
        assert!(String::from_utf8(help_out)
            .unwrap()
            .contains("  fail\n  greet\n  half\n  wait\n"));
    }

    #[test]
    fn test_help_for_one_command() {
        let mut out = Vec::new();
        dispatcher().dispatch("help", &tokens(&["greet"]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Usage: demo greet FIRST_NAME LAST_NAME\n");
    }

    #[test]
    fn test_bind_error_prints_error_and_usage() {
        let mut out = Vec::new();
        let outcome = dispatcher().dispatch("greet", &tokens(&["James"]), &mut out).unwrap();

        assert!(matches!(
            outcome,
            Outcome::BindFailed(ref e) if matches!(e.kind, BindingErrorKind::TooFewArguments { .. })
        ));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Missing argument(s): last_name (command 'greet')\n\nUsage: demo greet FIRST_NAME LAST_NAME\n"
        );
    }

    #[test]
    fn test_value_out_of_range_for_rust_type_is_bind_failure() {
        let mut out = Vec::new();
        let outcome = dispatcher().dispatch("half", &tokens(&["300"]), &mut out).unwrap();

        assert!(matches!(outcome, Outcome::BindFailed(_)));
        assert!(String::from_utf8(out).unwrap().starts_with("Cannot convert '300' to int"));
    }

    #[test]
    fn test_command_error_propagates() {
        let mut out = Vec::new();
        let err = dispatcher().dispatch("fail", &[], &mut out).unwrap_err();

        assert_eq!(err.command_error().unwrap().to_string(), "command exploded");
        assert!(out.is_empty());
    }

    #[test]
    fn test_sync_dispatch_does_not_run_async_command() {
        let mut out = Vec::new();
        let outcome = dispatcher().dispatch("wait", &[], &mut out).unwrap();

        assert_eq!(outcome, Outcome::RequiresAsync("wait".to_string()));
        assert!(String::from_utf8(out).unwrap().contains("asynchronous"));
    }

    #[tokio::test]
    async fn test_dispatch_async_runs_both_kinds() {
        let dispatcher = dispatcher();
        let mut out = Vec::new();

        let waited = dispatcher.dispatch_async("wait", &[], &mut out).await.unwrap();
        let greeted = dispatcher
            .dispatch_async("greet", &tokens(&["James", "Bond"]), &mut out)
            .await
            .unwrap();

        assert_eq!(waited, Outcome::Completed(Output::text("waited")));
        assert_eq!(greeted, Outcome::Completed(Output::text("Hello James Bond")));
    }

    #[tokio::test]
    async fn test_async_command_completes_before_dispatch_returns() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let command_log = log.clone();
        let registry = Registry::from_commands([Command::new(
            "slow",
            vec![],
            Callable::asynchronous(move |_| {
                let log = command_log.clone();
                async move {
                    log.lock().unwrap().push("before sleep");
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    log.lock().unwrap().push("after sleep");
                    Ok(Output::Silent)
                }
            }),
        )
        .unwrap()]);

        let dispatcher = Dispatcher::new(registry);
        let mut out = Vec::new();
        dispatcher.dispatch_async("slow", &[], &mut out).await.unwrap();
        log.lock().unwrap().push("dispatch returned");

        assert_eq!(
            *log.lock().unwrap(),
            vec!["before sleep", "after sleep", "dispatch returned"]
        );
    }

    #[test]
    fn test_run_argv() {
        let dispatcher = dispatcher();

        let mut out = Vec::new();
        let outcome = dispatcher
            .run_argv(&tokens(&["demo", "greet", "James", "Bond"]), &mut out)
            .unwrap();
        assert!(outcome.is_completed());
        assert_eq!(String::from_utf8(out).unwrap(), "Hello James Bond\n");

        let mut out = Vec::new();
        let outcome = dispatcher.run_argv(&tokens(&["demo"]), &mut out).unwrap();
        assert_eq!(outcome, Outcome::Help);
        assert!(String::from_utf8(out).unwrap().starts_with("Usage: demo COMMAND [ARGS]"));
    }
}
