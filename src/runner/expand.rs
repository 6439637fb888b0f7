//! Variable expansion for task strings
//!
//! Handles the `${...}` placeholders VS Code defines for tasks.json. Expansion
//! happens in two phases: structural variables (`${workspaceFolder}`,
//! `${env:NAME}`, ...) are replaced while parsing, and `${input:ID}` is left in
//! place until the task is about to run and its inputs have been prompted for.

use crate::runner::Ambient;
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

fn env_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{env:([^}]+)\}").expect("env pattern is valid"))
}

fn input_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{input:([^}]+)\}").expect("input pattern is valid"))
}

/// Expands placeholders relative to one project root
#[derive(Debug, Clone, Copy)]
pub struct Expander<'a> {
    root_dir: &'a str,
    ambient: &'a Ambient,
}

impl<'a> Expander<'a> {
    pub fn new(root_dir: &'a str, ambient: &'a Ambient) -> Self {
        Expander { root_dir, ambient }
    }

    /// Expand structural variables, leaving `${input:ID}` untouched
    pub fn expand(&self, value: &str) -> String {
        self.expand_with_inputs(value, None)
    }

    /// Expand structural variables and, if given, resolved inputs
    ///
    /// Unrecognized placeholders are left as they are.
    pub fn expand_with_inputs(
        &self,
        value: &str,
        inputs: Option<&HashMap<String, String>>,
    ) -> String {
        let basename = Path::new(self.root_dir)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let result = value
            .replace("${userHome}", &self.ambient.home_dir.to_string_lossy())
            .replace("${workspaceFolder}", self.root_dir)
            .replace("${workspaceFolderBasename}", &basename)
            .replace("${cwd}", &self.ambient.cwd.to_string_lossy());

        let result = env_pattern()
            .replace_all(&result, |caps: &Captures| {
                self.ambient.var(&caps[1]).unwrap_or_default().to_string()
            })
            .into_owned();

        match inputs {
            Some(inputs) => substitute_inputs(&result, inputs),
            None => result,
        }
    }

    /// Expand structural variables and wrap the result as a [`Template`]
    pub fn template(&self, value: &str) -> Template {
        Template::new(self.expand(value))
    }
}

/// Replace `${input:ID}` with values from `inputs`; unknown IDs stay verbatim
pub fn substitute_inputs(value: &str, inputs: &HashMap<String, String>) -> String {
    input_pattern()
        .replace_all(value, |caps: &Captures| match inputs.get(&caps[1]) {
            Some(resolved) => resolved.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Collect the distinct input IDs referenced by any of the strings
pub fn collect_input_ids<I, S>(strings: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids = BTreeSet::new();
    for s in strings {
        for caps in input_pattern().captures_iter(s.as_ref()) {
            ids.insert(caps[1].to_string());
        }
    }
    ids
}

/// A task string after parse-time expansion
///
/// Either fully resolved, or still carrying `${input:ID}` placeholders that
/// have to be filled in right before the task runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Resolved(String),
    Deferred {
        text: String,
        inputs: BTreeSet<String>,
    },
}

impl Template {
    /// Classify a string by the input placeholders it still contains
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let inputs = collect_input_ids([&text]);
        if inputs.is_empty() {
            Template::Resolved(text)
        } else {
            Template::Deferred { text, inputs }
        }
    }

    /// The current text, placeholders included
    pub fn as_str(&self) -> &str {
        match self {
            Template::Resolved(text) | Template::Deferred { text, .. } => text,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Template::Resolved(_))
    }

    /// Input IDs still outstanding
    pub fn input_ids(&self) -> impl Iterator<Item = &str> {
        let ids = match self {
            Template::Resolved(_) => None,
            Template::Deferred { inputs, .. } => Some(inputs.iter().map(String::as_str)),
        };
        ids.into_iter().flatten()
    }

    /// Fill in resolved inputs
    pub fn resolve(&self, inputs: &HashMap<String, String>) -> String {
        match self {
            Template::Resolved(text) => text.clone(),
            Template::Deferred { text, .. } => substitute_inputs(text, inputs),
        }
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Template::new(text)
    }
}

impl From<String> for Template {
    fn from(text: String) -> Self {
        Template::new(text)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
