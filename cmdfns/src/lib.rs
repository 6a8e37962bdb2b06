//! # cmdfns
//!
//! Make plain Rust functions callable from the command line.
//!
//! ## Core Principles
//!
//! - **No definition layer**: the function signature is the command signature
//! - **Compile-time introspection**: `#[command]` records parameter names,
//!   types and defaults when the function is compiled
//! - **Discovery by directory**: point the engine at a source tree and every
//!   command defined in it is registered
//! - **Sync or async**: `async fn` commands are awaited by your runtime
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! // src/commands/greetings.rs
//! use cmdfns::command;
//!
//! /// Greets someone by name.
//! #[command]
//! pub fn greet(first_name: String, #[arg(default = "Bond")] last_name: String) -> String {
//!     format!("Hello {} {}", first_name, last_name)
//! }
//!
//! #[command]
//! pub async fn countdown(from: u32) {
//!     for n in (1..=from).rev() {
//!         println!("{}", n);
//!         tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     }
//! }
//!
//! // src/main.rs
//! mod commands;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cmdfns::Error> {
//!     cmdfns::async_main(concat!(env!("CARGO_MANIFEST_DIR"), "/src/commands")).await
//! }
//! ```
//!
//! ```text
//! $ greet-cli greet James
//! Hello James Bond
//! $ greet-cli greet last_name=Moneypenny first_name=Eve
//! Hello Eve Moneypenny
//! $ greet-cli help greet
//! Usage: greet-cli greet FIRST_NAME [LAST_NAME=Bond]
//!
//! Greets someone by name.
//! ```
//!
//! Tokens of the form `name=value` bind by keyword, everything else binds by
//! position. Keywords are bound first wherever they appear; positional tokens
//! then fill the parameters still unset, in declaration order. So
//! `greet James first_name=Eve` binds `first_name=Eve` and `last_name=James`.
//! Parameters typed as integers, floats or `bool` are converted
//! before the call. Booleans accept `True`, `true`, `1`, `False`, `false`
//! and `0`; any other token is reported as a usage error.
//!
//! ## Without discovery
//!
//! Commands can be registered by hand into an explicit [`Registry`] and run
//! through a [`Dispatcher`] without touching the filesystem:
//!
//! ```
//! use cmdfns::{Callable, Command, Dispatcher, Output, Parameter, Registry};
//!
//! let registry = Registry::from_commands([Command::new(
//!     "shout",
//!     vec![Parameter::new("word")],
//!     Callable::sync(|mut args| {
//!         let word: String = args.take("word")?;
//!         Ok(Output::Text(word.to_uppercase()))
//!     }),
//! )
//! .unwrap()]);
//!
//! let dispatcher = Dispatcher::new(registry);
//! let mut out = Vec::new();
//! let outcome = dispatcher.dispatch("shout", &["hey".to_string()], &mut out).unwrap();
//! assert_eq!(outcome.output(), Some(&Output::text("HEY")));
//! ```

extern crate self as cmdfns;

pub use cmdfns_macros::command;

pub mod binder;
pub mod command;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod help;
pub mod index;
pub mod interactive;
pub mod output;
pub mod registry;
pub mod tracing_support;
pub mod value;

mod entry;

pub use tracing_support::tracing;
pub use tracing_support::{init_subscriber, init_subscriber_with_config, TracingConfig, TracingFormat};

pub use binder::bind;
pub use command::{
    Callable, Command, CommandDef, CommandFuture, CommandResult, DeclaredType, Invoke, ParamDef, Parameter,
    HELP_COMMAND, MARKED_COMMANDS,
};
pub use config::Config;
pub use discovery::{discover, search_root, Discovery, DiscoveryReport, LinkedModuleLoader, ModuleLoader};
pub use dispatcher::{Dispatcher, Outcome};
pub use entry::{
    async_interactive_main, async_interactive_main_with_config, async_main, async_main_with_config,
    interactive_main, interactive_main_with_config, main, main_with_config,
};
pub use error::{BindingError, BindingErrorKind, CommandError, ConfigError, DispatchError, Error};
pub use help::{Framing, HelpFormatter};
pub use index::CommandIndex;
pub use interactive::QUIT_COMMAND;
pub use output::{IntoOutput, Output};
pub use registry::Registry;
pub use value::{Arguments, FromValue, Value};

#[doc(hidden)]
pub mod __private {
    pub use linkme;
}
