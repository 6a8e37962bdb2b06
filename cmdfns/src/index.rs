//! Command index
//!
//! A JSON object mapping command names to the source file that defines
//! them. Written after a full discovery so later runs can load a single
//! file instead of walking the whole search path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::Registry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandIndex {
    entries: BTreeMap<String, PathBuf>,
}

impl CommandIndex {
    /// Index every command in `registry` that knows its source file.
    pub fn from_registry(registry: &Registry) -> Self {
        let entries = registry
            .commands()
            .iter()
            .filter_map(|c| c.source().map(|p| (c.name().to_string(), p.to_path_buf())))
            .collect();
        Self { entries }
    }

    /// Read an index file. A missing or unreadable index is treated as empty.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "No command index");
                return Self::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::debug!(path = %path.display(), error = %e, "Ignoring malformed command index");
            Self::default()
        })
    }

    /// Write the index as JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let index_error = |source| ConfigError::Index {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| index_error(e.into()))?;
        std::fs::write(path, json).map_err(index_error)
    }

    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Callable, Command};
    use crate::output::Output;
    use tempfile::TempDir;

    fn command(name: &str) -> Command {
        Command::new(name, vec![], Callable::sync(|_| Ok(Output::Silent))).unwrap()
    }

    #[test]
    fn test_only_commands_with_sources_are_indexed() {
        let registry = Registry::from_commands([
            command("say_hello").with_source("/src/greetings.rs"),
            command("adhoc"),
        ]);

        let index = CommandIndex::from_registry(&registry);
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup("say_hello"), Some(Path::new("/src/greetings.rs")));
        assert_eq!(index.lookup("adhoc"), None);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.json");
        let registry = Registry::from_commands([command("say_hello").with_source("/src/greetings.rs")]);

        CommandIndex::from_registry(&registry).save(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["say_hello"], "/src/greetings.rs");
        assert_eq!(CommandIndex::load(&path).lookup("say_hello"), Some(Path::new("/src/greetings.rs")));
    }

    #[test]
    fn test_missing_or_corrupt_index_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(CommandIndex::load(&temp.path().join("absent.json")).is_empty());

        let corrupt = temp.path().join("corrupt.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        assert!(CommandIndex::load(&corrupt).is_empty());
    }
}
