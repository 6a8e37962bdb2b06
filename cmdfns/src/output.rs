//! Command return values.

use std::fmt;

use crate::command::CommandResult;
use crate::error::CommandError;

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// No output.
    Silent,

    /// Text output (printed to stdout).
    Text(String),

    /// JSON output (for machine-readable results).
    Json(serde_json::Value),
}

impl Output {
    /// Create text output.
    pub fn text(content: impl Into<String>) -> Self {
        Output::Text(content.into())
    }

    /// Check if output is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Output::Silent)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Silent => Ok(()),
            Output::Text(s) => write!(f, "{}", s),
            Output::Json(v) => write!(f, "{}", v),
        }
    }
}

/// Conversion of a command function's return value into a [`CommandResult`].
///
/// Implemented for `()`, strings, numbers, `bool`, JSON values, [`Output`]
/// and `Result<T, E>` of those, where `E` converts into `anyhow::Error`.
pub trait IntoOutput {
    fn into_output(self) -> CommandResult;
}

impl IntoOutput for Output {
    fn into_output(self) -> CommandResult {
        Ok(self)
    }
}

impl IntoOutput for () {
    fn into_output(self) -> CommandResult {
        Ok(Output::Silent)
    }
}

impl IntoOutput for String {
    fn into_output(self) -> CommandResult {
        Ok(Output::Text(self))
    }
}

impl IntoOutput for &'static str {
    fn into_output(self) -> CommandResult {
        Ok(Output::text(self))
    }
}

impl IntoOutput for serde_json::Value {
    fn into_output(self) -> CommandResult {
        Ok(Output::Json(self))
    }
}

macro_rules! impl_into_output_display {
    ($($t:ty),*) => {
        $(
            impl IntoOutput for $t {
                fn into_output(self) -> CommandResult {
                    Ok(Output::Text(self.to_string()))
                }
            }
        )*
    };
}

impl_into_output_display!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool);

impl<T, E> IntoOutput for Result<T, E>
where
    T: IntoOutput,
    E: Into<anyhow::Error>,
{
    fn into_output(self) -> CommandResult {
        match self {
            Ok(value) => value.into_output(),
            Err(e) => Err(CommandError::Failed(e.into())),
        }
    }
}
