//! Process entry points.
//!
//! Each one discovers the commands under a search path into the global
//! registry, then runs against the real argument vector, stdin and stdout.

use std::io::{self, Write};
use std::path::Path;

use crate::command::HELP_COMMAND;
use crate::config::Config;
use crate::discovery::Discovery;
use crate::dispatcher::Dispatcher;
use crate::error::{ConfigError, Error};
use crate::registry::Registry;

/// Run one command taken from the process arguments.
///
/// ```ignore
/// fn main() -> Result<(), cmdfns::Error> {
///     cmdfns::main(concat!(env!("CARGO_MANIFEST_DIR"), "/src/commands"))
/// }
/// ```
pub fn main(search_path: impl AsRef<Path>) -> Result<(), Error> {
    main_with_config(search_path, Config::from_env())
}

pub fn main_with_config(search_path: impl AsRef<Path>, config: Config) -> Result<(), Error> {
    let argv = process_args();
    let dispatcher = load(search_path.as_ref(), &config, argv.get(1).map(String::as_str))?;

    let mut out = io::stdout().lock();
    dispatcher.run_argv(&argv, &mut out)?;
    out.flush().map_err(crate::error::DispatchError::from)?;
    Ok(())
}

/// Read commands from stdin until `quit` or end of input.
pub fn interactive_main(search_path: impl AsRef<Path>) -> Result<(), Error> {
    interactive_main_with_config(search_path, Config::from_env())
}

pub fn interactive_main_with_config(search_path: impl AsRef<Path>, config: Config) -> Result<(), Error> {
    let dispatcher = load(search_path.as_ref(), &config, None)?;

    let stdin = io::stdin().lock();
    let mut out = io::stdout().lock();
    dispatcher.run_interactive(stdin, &mut out)?;
    Ok(())
}

/// Async form of [`main`]. Call it from inside a runtime:
///
/// ```ignore
/// #[tokio::main]
/// async fn main() -> Result<(), cmdfns::Error> {
///     cmdfns::async_main(concat!(env!("CARGO_MANIFEST_DIR"), "/src/commands")).await
/// }
/// ```
pub async fn async_main(search_path: impl AsRef<Path>) -> Result<(), Error> {
    async_main_with_config(search_path, Config::from_env()).await
}

pub async fn async_main_with_config(search_path: impl AsRef<Path>, config: Config) -> Result<(), Error> {
    let argv = process_args();
    let dispatcher = load(search_path.as_ref(), &config, argv.get(1).map(String::as_str))?;

    // Output goes to a buffer so no stdout lock is held across awaits.
    let mut out = Vec::new();
    let result = dispatcher.run_argv_async(&argv, &mut out).await;
    write_stdout(&out)?;
    result?;
    Ok(())
}

/// Async form of [`interactive_main`].
pub async fn async_interactive_main(search_path: impl AsRef<Path>) -> Result<(), Error> {
    async_interactive_main_with_config(search_path, Config::from_env()).await
}

pub async fn async_interactive_main_with_config(
    search_path: impl AsRef<Path>,
    config: Config,
) -> Result<(), Error> {
    let dispatcher = load(search_path.as_ref(), &config, None)?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = io::stdout();
    dispatcher.run_interactive_async(stdin, &mut out).await?;
    Ok(())
}

/// Populate the global registry and build a dispatcher over it.
///
/// With an index configured and a command named, only that command's file
/// is loaded when the index knows it.
fn load(search_path: &Path, config: &Config, command: Option<&str>) -> Result<Dispatcher, ConfigError> {
    let registry = Registry::global();
    let mut discovery = Discovery::new();
    if let Some(index_path) = &config.index_path {
        discovery = discovery.with_index(index_path);
    }

    match command.filter(|name| *name != HELP_COMMAND) {
        Some(name) if config.index_path.is_some() => {
            discovery.discover_command(registry, search_path, name)?;
        }
        _ => {
            discovery.discover(registry, search_path)?;
        }
    }

    Ok(Dispatcher::with_config(registry.clone(), config))
}

fn process_args() -> Vec<String> {
    std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

fn write_stdout(bytes: &[u8]) -> Result<(), crate::error::DispatchError> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()?;
    Ok(())
}
