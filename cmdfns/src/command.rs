//! Commands and their parameter signatures.
//!
//! A [`Command`] is what the registry stores: a name, an ordered parameter
//! list and a callable. Commands are built either by hand with
//! [`Command::new`] or from the [`CommandDef`] descriptors that
//! `#[command]` compiles into the [`MARKED_COMMANDS`] table.

use std::fmt;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use linkme::distributed_slice;

use crate::binder;
use crate::error::{CommandError, ConfigError};
use crate::output::Output;
use crate::value::Arguments;

/// Name that always routes to the help formatter.
pub const HELP_COMMAND: &str = "help";

/// Result of invoking a command.
pub type CommandResult = Result<Output, CommandError>;

/// Boxed future returned by asynchronous commands.
pub type CommandFuture = Pin<Box<dyn Future<Output = CommandResult> + Send + 'static>>;

/// Every function marked with `#[command]` in the final binary.
///
/// Entries are collected at link time. Nothing reads this table on its own:
/// discovery or [`Registry::mark_linked`](crate::Registry::mark_linked)
/// moves entries into a registry.
#[distributed_slice]
pub static MARKED_COMMANDS: [CommandDef];

/// Declared type of a parameter. Drives coercion of raw tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeclaredType {
    /// No declared type; the raw token is passed through.
    #[default]
    None,
    Int,
    Float,
    Bool,
    /// Any other type; the raw token is passed through.
    Other,
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclaredType::None => "any",
            DeclaredType::Int => "int",
            DeclaredType::Float => "float",
            DeclaredType::Bool => "bool",
            DeclaredType::Other => "str",
        };
        f.write_str(name)
    }
}

/// A single declared parameter of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name, used for keyword arguments.
    pub name: String,

    /// Declaration order, starting at zero. Assigned by [`Command::new`].
    pub position: usize,

    /// Declared type used for coercion.
    pub declared_type: DeclaredType,

    /// Raw default token, coerced like a command-line token when unbound.
    pub default: Option<String>,

    /// May be left unbound without a default (`Option<T>` parameters).
    pub optional: bool,

    /// Collects all remaining positional tokens (`Vec<T>` parameters).
    pub variadic: bool,
}

impl Parameter {
    /// Create a required, untyped parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: 0,
            declared_type: DeclaredType::None,
            default: None,
            optional: false,
            variadic: false,
        }
    }

    /// Set the declared type
    pub fn typed(mut self, declared_type: DeclaredType) -> Self {
        self.declared_type = declared_type;
        self
    }

    /// Set a default token
    pub fn default(mut self, token: impl Into<String>) -> Self {
        self.default = Some(token.into());
        self
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark as variadic
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some() || self.optional
    }

    /// Must be bound by the command line.
    pub fn is_required(&self) -> bool {
        !self.has_default() && !self.variadic
    }
}

/// The function behind a command.
#[derive(Clone)]
pub enum Callable {
    /// Called directly by the dispatcher.
    Sync(Arc<dyn Fn(Arguments) -> CommandResult + Send + Sync>),

    /// Awaited by the dispatcher inside the caller's runtime.
    Async(Arc<dyn Fn(Arguments) -> CommandFuture + Send + Sync>),
}

impl Callable {
    /// Wrap a synchronous function.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Arguments) -> CommandResult + Send + Sync + 'static,
    {
        Callable::Sync(Arc::new(f))
    }

    /// Wrap an asynchronous function. The returned future is boxed.
    pub fn asynchronous<F, Fut>(f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        Callable::Async(Arc::new(move |args| Box::pin(f(args)) as CommandFuture))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Callable::Async(_))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Sync(_) => f.write_str("Callable::Sync"),
            Callable::Async(_) => f.write_str("Callable::Async"),
        }
    }
}

/// A named, invocable command.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    doc: String,
    parameters: Vec<Parameter>,
    callable: Callable,
    source: Option<PathBuf>,
}

impl Command {
    /// Create a command, validating its name and signature.
    ///
    /// Parameter positions are reassigned from the order given.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        callable: Callable,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        validate_name(&name)?;

        let parameters: Vec<Parameter> = parameters
            .into_iter()
            .enumerate()
            .map(|(position, p)| Parameter { position, ..p })
            .collect();

        for (i, p) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|q| q.name == p.name) {
                return Err(ConfigError::DuplicateParameter {
                    command: name,
                    parameter: p.name.clone(),
                });
            }
            if p.variadic && i + 1 != parameters.len() {
                return Err(ConfigError::MisplacedVariadic {
                    command: name,
                    parameter: p.name.clone(),
                });
            }
            if let Some(token) = &p.default {
                if let Err(kind) = binder::coerce(p, token) {
                    return Err(ConfigError::InvalidDefault {
                        command: name,
                        parameter: p.name.clone(),
                        reason: kind.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            name,
            doc: String::new(),
            parameters,
            callable,
            source: None,
        })
    }

    /// Attach help text.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Record the file the command was loaded from.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_async(&self) -> bool {
        self.callable.is_async()
    }

    pub fn is_variadic(&self) -> bool {
        self.parameters.last().is_some_and(|p| p.variadic)
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name == HELP_COMMAND {
        return Err(ConfigError::ReservedName(name.to_string()));
    }
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ============================================================================
// Compile-time descriptors emitted by #[command]
// ============================================================================

/// Static description of a marked function.
///
/// Built by `#[command]`; not meant to be written by hand.
#[derive(Debug)]
pub struct CommandDef {
    pub name: &'static str,
    pub doc: &'static str,
    /// `file!()` at the marking site.
    pub source_file: &'static str,
    pub parameters: &'static [ParamDef],
    pub invoke: Invoke,
}

/// Static description of one parameter of a marked function.
#[derive(Debug)]
pub struct ParamDef {
    pub name: &'static str,
    pub declared_type: DeclaredType,
    pub default: Option<&'static str>,
    pub optional: bool,
    pub variadic: bool,
}

/// Generated entry point of a marked function.
#[derive(Debug, Clone, Copy)]
pub enum Invoke {
    Sync(fn(Arguments) -> CommandResult),
    Async(fn(Arguments) -> CommandFuture),
}

impl CommandDef {
    /// Build the registrable command for this descriptor.
    pub fn to_command(&self) -> Result<Command, ConfigError> {
        let parameters = self
            .parameters
            .iter()
            .map(|p| Parameter {
                name: p.name.to_string(),
                position: 0,
                declared_type: p.declared_type,
                default: p.default.map(str::to_string),
                optional: p.optional,
                variadic: p.variadic,
            })
            .collect();

        let callable = match self.invoke {
            Invoke::Sync(f) => Callable::Sync(Arc::new(f)),
            Invoke::Async(f) => Callable::Async(Arc::new(f)),
        };

        Ok(Command::new(self.name, parameters, callable)?.with_doc(self.doc))
    }

    /// Whether this command was marked in the source file at `path`.
    ///
    /// `file!()` is relative to the directory the compiler ran in, so a
    /// trailing component match is used against the discovered path.
    pub fn defined_in(&self, path: &Path) -> bool {
        path.ends_with(lexical_normalize(Path::new(self.source_file)))
    }
}

/// Drop `.` and fold `..` without touching the filesystem. `#[path]`
/// modules report `file!()` values like `src/bin/../commands/x.rs`.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if normalized.file_name().is_some() => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
