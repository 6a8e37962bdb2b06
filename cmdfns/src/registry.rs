//! Command registry
//!
//! A cheaply cloneable handle to a name → command map. A process-wide
//! default instance is available through [`Registry::global`]; any number of
//! independent registries can be created alongside it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::command::{Command, CommandDef, MARKED_COMMANDS};
use crate::error::ConfigError;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// A thread-safe registry of commands, indexed by name
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<HashMap<String, Arc<Command>>>>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Create a registry holding exactly `commands`, without discovery
    pub fn from_commands(commands: impl IntoIterator<Item = Command>) -> Self {
        let registry = Self::new();
        for command in commands {
            registry.register(command);
        }
        registry
    }

    /// Register a command. An existing command with the same name is
    /// replaced and returned.
    pub fn register(&self, command: Command) -> Option<Arc<Command>> {
        let name = command.name().to_string();
        let previous = self.inner.write().insert(name.clone(), Arc::new(command));

        match &previous {
            Some(old) => tracing::debug!(
                command = %name,
                previous_source = ?old.source(),
                "Command replaced"
            ),
            None => tracing::debug!(command = %name, "Command registered"),
        }
        previous
    }

    /// Register the command described by a `#[command]` descriptor.
    pub fn mark(&self, def: &CommandDef, source: Option<&Path>) -> Result<(), ConfigError> {
        let mut command = def.to_command()?;
        if let Some(path) = source {
            command = command.with_source(path);
        }
        self.register(command);
        Ok(())
    }

    /// Register every `#[command]` function linked into this binary.
    pub fn mark_linked(&self) -> Result<usize, ConfigError> {
        for def in MARKED_COMMANDS.iter() {
            self.mark(def, None)?;
        }
        Ok(MARKED_COMMANDS.len())
    }

    /// Look up a command by name
    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        self.inner.read().get(name).cloned()
    }

    /// Check if a command exists
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// All command names, sorted ascending
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of all commands, sorted by name
    pub fn commands(&self) -> Vec<Arc<Command>> {
        let mut commands: Vec<Arc<Command>> = self.inner.read().values().cloned().collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    /// Get the number of registered commands
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.command_names())
            .finish()
    }
}
