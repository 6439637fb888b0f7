//! Input prompts
//!
//! Values for `${input:ID}` placeholders are asked for right before the task
//! that references them runs.

use crate::config::InputConfig;
use crate::error::{ExecutionError, ExecutionResult};
use crate::ui::Prompter;
use std::collections::HashMap;

/// Kind of prompt an input uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// Free text ("promptString")
    Text,
    /// One of a list of (label, value) choices ("pickString")
    Pick(Vec<(String, String)>),
    /// Anything else, e.g. "command" which needs VS Code itself
    Unsupported(String),
}

/// A parsed entry of the `inputs` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDefinition {
    pub id: String,
    pub kind: InputKind,
    /// Prompt text, defaults to the id
    pub description: String,
    /// Value used when the user enters nothing or cancels
    pub default: String,
}

impl InputDefinition {
    pub fn from_config(config: &InputConfig) -> Self {
        let kind = match config.input_type.as_str() {
            "promptString" => InputKind::Text,
            "pickString" => InputKind::Pick(config.options.iter().map(|o| o.to_pair()).collect()),
            other => InputKind::Unsupported(other.to_string()),
        };

        InputDefinition {
            id: config.id.clone(),
            kind,
            description: config.description.clone().unwrap_or_else(|| config.id.clone()),
            default: config.default.clone().unwrap_or_default(),
        }
    }

    /// Ask the user for this input's value
    ///
    /// Returns `None` for unsupported input kinds.
    pub fn ask(&self, prompter: &mut dyn Prompter) -> ExecutionResult<Option<String>> {
        let prompt_error = |source: std::io::Error| ExecutionError::Prompt {
            id: self.id.clone(),
            source,
        };

        match &self.kind {
            InputKind::Text => {
                let mut message = self.description.clone();
                if !self.default.is_empty() {
                    message.push_str(&format!(" [{}]", self.default));
                }
                message.push_str(": ");

                let answer = prompter.read_line(&message).map_err(prompt_error)?;
                let answer = answer.trim();
                if answer.is_empty() {
                    Ok(Some(self.default.clone()))
                } else {
                    Ok(Some(answer.to_string()))
                }
            }
            InputKind::Pick(choices) => {
                if choices.is_empty() {
                    return Ok(Some(self.default.clone()));
                }

                let labels: Vec<String> = choices.iter().map(|(label, _)| label.clone()).collect();
                let cursor = choices
                    .iter()
                    .position(|(_, value)| *value == self.default)
                    .unwrap_or(0);

                let picked = prompter
                    .select(&self.description, &labels, cursor)
                    .map_err(prompt_error)?;

                let value = match picked.and_then(|i| choices.get(i)) {
                    Some((_, value)) => value.clone(),
                    None if !self.default.is_empty() => self.default.clone(),
                    None => choices[0].1.clone(),
                };
                Ok(Some(value))
            }
            InputKind::Unsupported(kind) => {
                tracing::warn!(input = %self.id, kind = %kind, "input type is not supported, leaving placeholder");
                Ok(None)
            }
        }
    }
}

/// Prompt for every ID that has a definition, in the order given
///
/// IDs without a definition are skipped; their placeholders stay in the
/// command line as written.
pub fn resolve_inputs(
    ids: &[&str],
    definitions: &[InputDefinition],
    prompter: &mut dyn Prompter,
) -> ExecutionResult<HashMap<String, String>> {
    let mut resolved = HashMap::new();

    for id in ids {
        let Some(definition) = definitions.iter().find(|d| d.id == *id) else {
            tracing::warn!(input = %id, "no input definition found, leaving placeholder");
            continue;
        };

        if let Some(value) = definition.ask(prompter)? {
            resolved.insert(id.to_string(), value);
        }
    }

    Ok(resolved)
}
