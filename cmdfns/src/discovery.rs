//! Command discovery and directory scanning
//!
//! Walks a search path, loads every source file through a [`ModuleLoader`],
//! and lets each load register the commands that file defines.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::command::MARKED_COMMANDS;
use crate::error::ConfigError;
use crate::index::CommandIndex;
use crate::registry::Registry;

/// Loads one source file, registering the commands it defines.
pub trait ModuleLoader {
    /// Whether `path` is a source file this loader understands.
    fn accepts(&self, path: &Path) -> bool;

    /// Load `path` into `registry`, returning the number of commands
    /// registered.
    fn load(&self, path: &Path, registry: &Registry) -> anyhow::Result<usize>;
}

/// Loader for commands compiled into the running binary.
///
/// Loading a `.rs` file registers every `#[command]` function that was
/// marked in that file.
#[derive(Debug, Clone)]
pub struct LinkedModuleLoader {
    extension: String,
}

impl LinkedModuleLoader {
    pub fn new() -> Self {
        Self {
            extension: "rs".to_string(),
        }
    }
}

impl Default for LinkedModuleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for LinkedModuleLoader {
    fn accepts(&self, path: &Path) -> bool {
        path.extension().map(|e| e == self.extension.as_str()).unwrap_or(false)
    }

    fn load(&self, path: &Path, registry: &Registry) -> anyhow::Result<usize> {
        // Unreadable or non-UTF-8 sources are broken modules.
        std::fs::read_to_string(path)?;

        let mut count = 0;
        for def in MARKED_COMMANDS.iter().filter(|def| def.defined_in(path)) {
            registry.mark(def, Some(path))?;
            count += 1;
        }
        Ok(count)
    }
}

/// Summary of a discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Files loaded, in load order
    pub files: Vec<PathBuf>,

    /// Commands registered across all files
    pub commands: usize,
}

/// Discovers commands under a search path
#[derive(Debug, Clone)]
pub struct Discovery<L = LinkedModuleLoader> {
    loader: L,
    index_path: Option<PathBuf>,
}

impl Discovery {
    /// Create a discovery engine for linked commands
    pub fn new() -> Self {
        Self::with_loader(LinkedModuleLoader::new())
    }
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ModuleLoader> Discovery<L> {
    /// Create with a custom loader
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            index_path: None,
        }
    }

    /// Maintain a command index at `path`
    pub fn with_index(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = Some(path.into());
        self
    }

    /// All loadable files under `root`, sorted by name at every level.
    pub fn source_files(&self, root: impl AsRef<Path>) -> Result<Vec<PathBuf>, ConfigError> {
        let root = search_root(root)?;
        let mut files = Vec::new();

        for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|source| ConfigError::Walk {
                path: root.clone(),
                source,
            })?;
            if entry.file_type().is_file() && self.loader.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Load every source file under `root` into `registry`.
    ///
    /// The first file that fails to load aborts discovery.
    pub fn discover(
        &self,
        registry: &Registry,
        root: impl AsRef<Path>,
    ) -> Result<DiscoveryReport, ConfigError> {
        let files = self.source_files(root.as_ref())?;
        let mut report = DiscoveryReport::default();

        for path in files {
            report.commands += self.load_file(registry, &path)?;
            report.files.push(path);
        }

        if let Some(index_path) = &self.index_path {
            CommandIndex::from_registry(registry).save(index_path)?;
        }

        tracing::info!(
            root = %root.as_ref().display(),
            files = report.files.len(),
            commands = report.commands,
            "Discovery finished"
        );
        Ok(report)
    }

    /// Make sure `name` is registered, loading as little as possible.
    ///
    /// Tries the registry, then the file named by the index, then a full
    /// discovery. Returns whether the command is now known.
    pub fn discover_command(
        &self,
        registry: &Registry,
        root: impl AsRef<Path>,
        name: &str,
    ) -> Result<bool, ConfigError> {
        if registry.contains(name) {
            return Ok(true);
        }

        if let Some(index_path) = &self.index_path {
            let index = CommandIndex::load(index_path);
            if let Some(path) = index.lookup(name).filter(|p| p.exists()) {
                match self.load_file(registry, path) {
                    Ok(_) if registry.contains(name) => {
                        tracing::debug!(command = name, path = %path.display(), "Loaded command via index");
                        return Ok(true);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::debug!(error = %e, "Stale index entry"),
                }
            }
        }

        self.discover(registry, root)?;
        Ok(registry.contains(name))
    }

    fn load_file(&self, registry: &Registry, path: &Path) -> Result<usize, ConfigError> {
        let count = self
            .loader
            .load(path, registry)
            .map_err(|source| ConfigError::LoadModule {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), commands = count, "Loaded module");
        Ok(count)
    }
}

/// Resolve the directory to search: a file's parent, or the directory
/// itself, made absolute. A bare file name resolves to the working directory.
pub fn search_root(root: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
    let root = root.as_ref();
    let dir = if root.is_file() {
        root.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    } else {
        root
    };

    dir.canonicalize()
        .map_err(|_| ConfigError::RootNotFound(root.to_path_buf()))
}

/// Discover linked commands under `root` into the global registry.
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryReport, ConfigError> {
    Discovery::new().discover(Registry::global(), root)
}
