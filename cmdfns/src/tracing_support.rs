//! Logging setup.
//!
//! The engine itself only emits `tracing` events. Binaries that want to see
//! them install a subscriber here; everything is written to stderr so log
//! lines never interleave with command output on stdout.

pub use tracing::{self, debug, error, info, instrument, trace, warn};

#[cfg(feature = "subscriber")]
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Multi-line, human-readable.
    Pretty,

    /// One line per event.
    Compact,

    /// Newline-delimited JSON.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level filter. `None` defers to `RUST_LOG`, then `warn`.
    pub level: Option<tracing::Level>,

    pub format: TracingFormat,

    pub timestamps: bool,

    /// Include the emitting module path.
    pub target: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: TracingFormat::Compact,
            timestamps: false,
            target: true,
        }
    }
}

/// Install a compact stderr subscriber filtered by `RUST_LOG`.
///
/// ```ignore
/// fn main() -> Result<(), cmdfns::Error> {
///     cmdfns::tracing_support::init_subscriber();
///     cmdfns::main(concat!(env!("CARGO_MANIFEST_DIR"), "/src/commands"))
/// }
/// ```
///
/// `RUST_LOG=cmdfns=debug` shows registration and discovery.
pub fn init_subscriber() -> bool {
    init_subscriber_with_config(TracingConfig::default())
}

/// Install a subscriber built from `config`.
///
/// Returns `false` when a global subscriber was already set; the existing one
/// is kept.
#[cfg(feature = "subscriber")]
pub fn init_subscriber_with_config(config: TracingConfig) -> bool {
    let filter = match config.level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let base = fmt::layer::<Registry>()
        .with_writer(std::io::stderr)
        .with_target(config.target);

    let layer = match (config.format, config.timestamps) {
        (TracingFormat::Pretty, true) => base.pretty().boxed(),
        (TracingFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (TracingFormat::Compact, true) => base.compact().boxed(),
        (TracingFormat::Compact, false) => base.compact().without_time().boxed(),
        (TracingFormat::Json, true) => base.json().boxed(),
        (TracingFormat::Json, false) => base.json().without_time().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .is_ok()
}

#[cfg(not(feature = "subscriber"))]
pub fn init_subscriber_with_config(_config: TracingConfig) -> bool {
    false
}
