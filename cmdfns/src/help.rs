//! Help text.

use std::fmt::Write;

use crate::command::{Command, Parameter};
use crate::registry::Registry;

/// Where help is being shown. Only the banner lines differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// One-shot invocation: `Usage: <program> COMMAND [ARGS]`.
    Program,

    /// Interactive loop: `Usage: > COMMAND [ARGS]`.
    Interactive,
}

/// Renders command listings and per-command usage.
#[derive(Debug, Clone)]
pub struct HelpFormatter {
    program: String,
}

impl HelpFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full listing, or usage for `command` when it exists.
    pub fn format_help(&self, registry: &Registry, command: Option<&str>, framing: Framing) -> String {
        match command.and_then(|name| registry.get(name)) {
            Some(command) => self.format_command_help(&command, framing),
            None => self.format_listing(registry, framing),
        }
    }

    /// `Usage:` banner followed by every command name in lexical order.
    pub fn format_listing(&self, registry: &Registry, framing: Framing) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "Usage: {} COMMAND [ARGS]", self.invocation(framing));
        text.push('\n');
        text.push_str("Where COMMAND is one of:\n");
        for name in registry.command_names() {
            let _ = writeln!(text, "  {}", name);
        }
        text.push('\n');
        match framing {
            Framing::Program => {
                let _ = writeln!(text, "Use '{} help COMMAND' for command-specific help", self.program);
            }
            Framing::Interactive => {
                text.push_str("Use 'quit' to quit or 'help COMMAND' for command-specific help\n");
            }
        }
        text
    }

    /// Usage line for one command, followed by its doc text.
    pub fn format_command_help(&self, command: &Command, framing: Framing) -> String {
        let mut text = self.usage_line(command, framing);
        text.push('\n');
        if !command.doc().is_empty() {
            text.push('\n');
            text.push_str(command.doc());
            text.push('\n');
        }
        text
    }

    /// `Usage: <program> NAME PARAMS`
    pub fn usage_line(&self, command: &Command, framing: Framing) -> String {
        let mut line = format!("Usage: {} {}", self.invocation(framing), command.name());
        for parameter in command.parameters() {
            line.push(' ');
            line.push_str(&parameter_marker(parameter));
        }
        line
    }

    fn invocation(&self, framing: Framing) -> &str {
        match framing {
            Framing::Program => &self.program,
            Framing::Interactive => ">",
        }
    }
}

fn parameter_marker(parameter: &Parameter) -> String {
    let name = parameter.name.to_uppercase();
    if parameter.variadic {
        format!("[{}...]", name)
    } else if let Some(default) = &parameter.default {
        format!("[{}={}]", name, default)
    } else if parameter.optional {
        format!("[{}]", name)
    } else {
        name
    }
}
