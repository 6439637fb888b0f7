//! Document types
//!
//! This module defines the data structures that represent a `.vscode/tasks.json`
//! file as written by hand. Fields VS Code understands but taskrun does not
//! (`group`, `problemMatcher`, `presentation`, ...) are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Top-level tasks.json structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TasksFile {
    /// Schema version, usually "2.0.0" (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Tasks defined in the file
    #[serde(default)]
    pub tasks: Vec<TaskDefinition>,

    /// Input prompts referenced through `${input:ID}`
    #[serde(default)]
    pub inputs: Vec<InputConfig>,
}

/// A task entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskDefinition {
    /// Label used to select and reference the task
    #[serde(default)]
    pub label: String,

    /// Fields that can also appear in a platform override block
    #[serde(flatten)]
    pub fields: TaskFields,

    /// Overrides applied on Linux
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<TaskFields>,

    /// Overrides applied on macOS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osx: Option<TaskFields>,

    /// Overrides applied on Windows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<TaskFields>,
}

impl TaskDefinition {
    /// Override block for a platform key ("linux", "osx" or "windows")
    pub fn overrides_for(&self, key: &str) -> Option<&TaskFields> {
        match key {
            "linux" => self.linux.as_ref(),
            "osx" => self.osx.as_ref(),
            "windows" => self.windows.as_ref(),
            _ => None,
        }
    }
}

/// Overridable task fields
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskFields {
    /// "shell" or "process"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Scalar>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<TaskOptions>,

    #[serde(rename = "dependsOn", default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependsOn>,

    /// "parallel" or "sequence"
    #[serde(rename = "dependsOrder", default, skip_serializing_if = "Option::is_none")]
    pub depends_order: Option<String>,

    /// Usually a boolean; strings and numbers are read with [`Scalar::is_truthy`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<Scalar>,
}

/// The `options` block of a task
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskOptions {
    /// Working directory, may contain variables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Extra environment variables, values may contain variables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, Scalar>>,
}

impl TaskOptions {
    /// Shallow merge: keys present in `overrides` replace ours
    pub fn merged(base: Option<&TaskOptions>, overrides: Option<&TaskOptions>) -> TaskOptions {
        let base = base.cloned().unwrap_or_default();
        match overrides {
            Some(over) => TaskOptions {
                cwd: over.cwd.clone().or(base.cwd),
                env: over.env.clone().or(base.env),
            },
            None => base,
        }
    }
}

/// A `dependsOn` value: one label or a list of labels
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DependsOn {
    One(String),
    Many(Vec<String>),
}

impl DependsOn {
    pub fn into_labels(self) -> Vec<String> {
        match self {
            DependsOn::One(label) => vec![label],
            DependsOn::Many(labels) => labels,
        }
    }
}

/// A command, argument or env value
///
/// Hand-written files sometimes use bare numbers or booleans, and VS Code
/// also accepts `{ "value": ..., "quoting": ... }` objects; all of them are
/// turned into plain strings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Quoted {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quoting: Option<String>,
    },
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Integer(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Quoted { value, .. } => f.write_str(value),
        }
    }
}

impl Scalar {
    /// Read a flag written as a boolean, number, or string
    ///
    /// Zero, the empty string, `"false"`, `"no"` and `"off"` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Integer(n) => *n != 0,
            Scalar::Float(n) => *n != 0.0,
            Scalar::Text(s) | Scalar::Quoted { value: s, .. } => !matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "" | "false" | "0" | "no" | "off"
            ),
        }
    }
}

/// An entry of the `inputs` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub id: String,

    /// "promptString", "pickString" or "command" (not supported)
    #[serde(rename = "type", default = "default_input_type")]
    pub input_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Choices for "pickString"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PickOption>,
}

fn default_input_type() -> String {
    "promptString".to_string()
}

/// A "pickString" choice, either a plain string or a label/value pair
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PickOption {
    Plain(String),
    Labeled {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        value: Option<String>,
    },
}

impl PickOption {
    /// (label, value), each falling back to the other when missing
    pub fn to_pair(&self) -> (String, String) {
        match self {
            PickOption::Plain(s) => (s.clone(), s.clone()),
            PickOption::Labeled { label, value } => {
                let label_text = label.clone().or_else(|| value.clone()).unwrap_or_default();
                let value_text = value.clone().or_else(|| label.clone()).unwrap_or_default();
                (label_text, value_text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_simple_file() {
        let json = r#"{
            "version": "2.0.0",
            "tasks": [{ "label": "hello", "command": "echo hello" }]
        }"#;
        let file: TasksFile = json5::from_str(json).unwrap();
        assert_eq!(file.version.as_deref(), Some("2.0.0"));
        assert_eq!(file.tasks.len(), 1);
        assert_eq!(file.tasks[0].label, "hello");
        assert!(file.inputs.is_empty());
    }

    #[test]
    fn test_deserialize_platform_overrides() {
        let json = r#"{
            "tasks": [{
                "label": "open",
                "command": "xdg-open .",
                "osx": { "command": "open ." },
                "windows": { "command": "explorer .", "options": { "cwd": "C:\\" } },
            }]
        }"#;
        let file: TasksFile = json5::from_str(json).unwrap();
        let task = &file.tasks[0];
        assert!(task.linux.is_none());
        assert_eq!(
            task.overrides_for("osx").and_then(|o| o.command.clone()),
            Some(Scalar::Text("open .".to_string()))
        );
        assert!(task.overrides_for("windows").unwrap().options.is_some());
        assert!(task.overrides_for("beos").is_none());
    }

    #[test]
    fn test_depends_on_forms() {
        let one: DependsOn = json5::from_str(r#""build""#).unwrap();
        assert_eq!(one.into_labels(), vec!["build"]);

        let many: DependsOn = json5::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(many.into_labels(), vec!["a", "b"]);
    }

    #[test]
    fn test_scalar_display() {
        let args: Vec<Scalar> =
            json5::from_str(r#"["-j", 4, 1.5, true, { "value": "a b", "quoting": "strong" }]"#)
                .unwrap();
        let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["-j", "4", "1.5", "true", "a b"]);
    }

    #[test]
    fn test_scalar_truthiness() {
        let flags: Vec<Scalar> =
            json5::from_str(r#"[true, false, 1, 0, "true", "False", "", "yes", "off"]"#).unwrap();
        let truthy: Vec<bool> = flags.iter().map(Scalar::is_truthy).collect();
        assert_eq!(
            truthy,
            vec![true, false, true, false, true, false, false, true, false]
        );
    }

    #[test]
    fn test_options_merge_is_shallow() {
        let base = TaskOptions {
            cwd: Some("base".to_string()),
            env: Some(BTreeMap::from([("A".to_string(), Scalar::Text("1".to_string()))])),
        };
        let over = TaskOptions {
            cwd: None,
            env: Some(BTreeMap::from([("B".to_string(), Scalar::Text("2".to_string()))])),
        };

        let merged = TaskOptions::merged(Some(&base), Some(&over));
        assert_eq!(merged.cwd.as_deref(), Some("base"));
        let env = merged.env.unwrap();
        assert!(env.contains_key("B"));
        assert!(!env.contains_key("A"));

        let merged = TaskOptions::merged(None, None);
        assert!(merged.cwd.is_none() && merged.env.is_none());
    }

    #[test]
    fn test_pick_option_pairs() {
        let options: Vec<PickOption> = json5::from_str(
            r#"["plain", { "label": "Production", "value": "prod" }, { "value": "dev" }, { "label": "qa" }]"#,
        )
        .unwrap();
        let pairs: Vec<(String, String)> = options.iter().map(PickOption::to_pair).collect();
        assert_eq!(
            pairs,
            vec![
                ("plain".to_string(), "plain".to_string()),
                ("Production".to_string(), "prod".to_string()),
                ("dev".to_string(), "dev".to_string()),
                ("qa".to_string(), "qa".to_string()),
            ]
        );
    }

    #[test]
    fn test_input_type_defaults_to_prompt_string() {
        let input: InputConfig = json5::from_str(r#"{ id: "name" }"#).unwrap();
        assert_eq!(input.input_type, "promptString");
        assert!(input.options.is_empty());
    }
}
