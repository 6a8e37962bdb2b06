//! Coerced argument values and the resolved argument set.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::command::DeclaredType;
use crate::error::{BindingError, BindingErrorKind};

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    /// Wide enough for every supported integer parameter type.
    Int(i128),
    Float(f64),
    Bool(bool),
    /// Tokens collected by a variadic parameter.
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(Value::to_string).collect();
                write!(f, "{}", items.join(" "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i.into())
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Value::Int(i.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Conversion from a resolved [`Value`] into a Rust parameter type.
///
/// On mismatch the value is handed back so the caller can report it.
pub trait FromValue: Sized {
    /// Type used in error messages.
    const EXPECTED: DeclaredType;

    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                const EXPECTED: DeclaredType = DeclaredType::Int;

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::Int(i) => <$t>::try_from(i).map_err(|_| Value::Int(i)),
                        Value::Str(ref s) => s.parse().map_err(|_| value),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    const EXPECTED: DeclaredType = DeclaredType::Float;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            Value::Str(ref s) => s.parse().map_err(|_| value),
            other => Err(other),
        }
    }
}

impl FromValue for f32 {
    const EXPECTED: DeclaredType = DeclaredType::Float;

    fn from_value(value: Value) -> Result<Self, Value> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl FromValue for bool {
    const EXPECTED: DeclaredType = DeclaredType::Bool;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for String {
    const EXPECTED: DeclaredType = DeclaredType::Other;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Str(s) => Ok(s),
            Value::List(_) => Err(value),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for PathBuf {
    const EXPECTED: DeclaredType = DeclaredType::Other;

    fn from_value(value: Value) -> Result<Self, Value> {
        String::from_value(value).map(PathBuf::from)
    }
}

impl FromValue for Value {
    const EXPECTED: DeclaredType = DeclaredType::None;

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

/// Resolved arguments for one invocation, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    command: String,
    values: BTreeMap<String, Value>,
}

impl Arguments {
    /// Create an empty argument set for `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in parameter-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Remove and convert a bound argument.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T, BindingError> {
        match self.values.remove(name) {
            Some(value) => self.convert(name, value),
            None => Err(BindingError::new(
                self.command.clone(),
                BindingErrorKind::TooFewArguments {
                    missing: vec![name.to_string()],
                },
            )),
        }
    }

    /// Remove and convert an argument that may be unbound.
    pub fn take_optional<T: FromValue>(&mut self, name: &str) -> Result<Option<T>, BindingError> {
        match self.values.remove(name) {
            Some(value) => self.convert(name, value).map(Some),
            None => Ok(None),
        }
    }

    /// Remove and convert the variadic slot. Unbound means empty.
    pub fn take_variadic<T: FromValue>(&mut self, name: &str) -> Result<Vec<T>, BindingError> {
        match self.values.remove(name) {
            Some(Value::List(items)) => items
                .into_iter()
                .map(|item| self.convert(name, item))
                .collect(),
            Some(value) => self.convert(name, value).map(|v| vec![v]),
            None => Ok(Vec::new()),
        }
    }

    fn convert<T: FromValue>(&self, name: &str, value: Value) -> Result<T, BindingError> {
        T::from_value(value).map_err(|value| {
            BindingError::new(
                self.command.clone(),
                BindingErrorKind::InvalidType {
                    parameter: name.to_string(),
                    value: value.to_string(),
                    expected: T::EXPECTED,
                },
            )
        })
    }
}
