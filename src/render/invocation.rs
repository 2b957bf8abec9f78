//! Parameter template expansion.

use crate::config::{FILE_PLACEHOLDER, PARAM_PLACEHOLDER};
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully expanded header-writer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable to run
    pub command: PathBuf,
    /// Arguments in order
    pub args: Vec<String>,
}

impl Invocation {
    /// Render the call as a single shell-style line, for logs and dry runs.
    pub fn command_line(&self) -> String {
        let mut line = quote(&self.command.to_string_lossy());
        for arg in &self.args {
            line.push(' ');
            line.push_str(&quote(arg));
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Expand a parameter template for one image.
///
/// `{PARAM}` is replaced in place by all tokens, `{FILE}` by the image path.
/// Everything else passes through unchanged.
pub fn expand_parameters(template: &[String], tokens: &[String], image: &Path) -> Vec<String> {
    let mut args = Vec::with_capacity(template.len() + tokens.len());
    for parameter in template {
        match parameter.as_str() {
            PARAM_PLACEHOLDER => args.extend(tokens.iter().cloned()),
            FILE_PLACEHOLDER => args.push(image.to_string_lossy().into_owned()),
            _ => args.push(parameter.clone()),
        }
    }
    args
}

/// Build the call for one image.
pub fn build_invocation(
    command: &str,
    template: &[String],
    tokens: &[String],
    image: &Path,
) -> Invocation {
    Invocation {
        command: PathBuf::from(command),
        args: expand_parameters(template, tokens, image),
    }
}

fn quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}
