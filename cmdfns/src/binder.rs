//! Argument binding: command-line tokens to resolved, typed arguments.
//!
//! A token shaped like `name=value` is a keyword token. Everything else is
//! positional and fills the declared parameters in order, skipping the ones
//! already set by keyword. A variadic last parameter soaks up the rest.

use crate::command::{Command, DeclaredType, Parameter};
use crate::error::{BindingError, BindingErrorKind};
use crate::value::{Arguments, Value};

/// Bind `tokens` to the parameters of `command`.
///
/// Keyword tokens are bound first regardless of where they appear, so a
/// positional token never conflicts with a keyword; it lands on the next
/// parameter the keywords left unset.
pub fn bind(command: &Command, tokens: &[String]) -> Result<Arguments, BindingError> {
    let fail = |kind: BindingErrorKind| BindingError::new(command.name(), kind);
    let parameters = command.parameters();

    let mut slots: Vec<Option<&str>> = vec![None; parameters.len()];
    let mut positional = Vec::new();

    for token in tokens {
        let Some((keyword, value)) = split_keyword(token) else {
            positional.push(token.as_str());
            continue;
        };

        let index = parameters
            .iter()
            .position(|p| p.name == keyword && !p.variadic)
            .ok_or_else(|| {
                fail(BindingErrorKind::UnknownKeyword {
                    keyword: keyword.to_string(),
                })
            })?;

        if slots[index].is_some() {
            return Err(fail(BindingErrorKind::DuplicateArgument {
                parameter: keyword.to_string(),
            }));
        }
        slots[index] = Some(value);
    }

    let mut positional = positional.into_iter();
    let mut rest = Vec::new();

    for (slot, parameter) in slots.iter_mut().zip(parameters) {
        if parameter.variadic {
            rest.extend(positional.by_ref());
        } else if slot.is_none() {
            *slot = positional.next();
        }
    }

    let extra: Vec<String> = positional.map(str::to_string).collect();
    if !extra.is_empty() {
        return Err(fail(BindingErrorKind::TooManyArguments { extra }));
    }

    let missing: Vec<String> = slots
        .iter()
        .zip(parameters)
        .filter(|(slot, p)| slot.is_none() && p.is_required())
        .map(|(_, p)| p.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(fail(BindingErrorKind::TooFewArguments { missing }));
    }

    let mut arguments = Arguments::new(command.name());
    for (slot, parameter) in slots.into_iter().zip(parameters) {
        if parameter.variadic {
            let items = rest
                .iter()
                .map(|token| coerce(parameter, token))
                .collect::<Result<Vec<_>, _>>()
                .map_err(fail)?;
            arguments.insert(parameter.name.clone(), Value::List(items));
            continue;
        }

        let token = slot.or(parameter.default.as_deref());
        if let Some(token) = token {
            let value = coerce(parameter, token).map_err(fail)?;
            arguments.insert(parameter.name.clone(), value);
        }
    }

    Ok(arguments)
}

/// Split a `name=value` token. The name must look like an identifier and
/// the value must not be empty; anything else is positional.
fn split_keyword(token: &str) -> Option<(&str, &str)> {
    let (name, value) = token.split_once('=')?;
    if value.is_empty() || !is_identifier(name) {
        return None;
    }
    Some((name, value))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Coerce a raw token according to the parameter's declared type.
pub fn coerce(parameter: &Parameter, token: &str) -> Result<Value, BindingErrorKind> {
    let invalid = || BindingErrorKind::InvalidType {
        parameter: parameter.name.clone(),
        value: token.to_string(),
        expected: parameter.declared_type,
    };

    match parameter.declared_type {
        DeclaredType::Int => token.parse().map(Value::Int).map_err(|_| invalid()),
        DeclaredType::Float => token.parse().map(Value::Float).map_err(|_| invalid()),
        DeclaredType::Bool => match token {
            "True" | "true" | "1" => Ok(Value::Bool(true)),
            "False" | "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        DeclaredType::None | DeclaredType::Other => Ok(Value::Str(token.to_string())),
    }
}
