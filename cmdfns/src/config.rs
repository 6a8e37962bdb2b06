//! Engine configuration.

use std::path::{Path, PathBuf};

/// Environment variable naming the command index file.
pub const INDEX_ENV: &str = "CMDFNS_INDEX";

/// Dispatcher and entry-point configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Program name shown in usage text.
    ///
    /// Defaults to the file name of `argv[0]`.
    pub program: String,

    /// Prompt written before each interactive read.
    pub prompt: String,

    /// Optional name → file index used to speed up command look-up.
    pub index_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: default_program(),
            prompt: "> ".to_string(),
            index_path: None,
        }
    }
}

impl Config {
    /// Default configuration with the index path taken from `CMDFNS_INDEX`.
    pub fn from_env() -> Self {
        Self {
            index_path: std::env::var_os(INDEX_ENV).map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_index(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = Some(path.into());
        self
    }
}

fn default_program() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
