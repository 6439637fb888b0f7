//! Ambient context for parsing and expansion
//!
//! Everything the expander and parser would otherwise read from the process
//! (home directory, working directory, environment, platform) is captured
//! once into an [`Ambient`] value and passed down explicitly.

use directories::BaseDirs;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Platforms that may carry an override block in a task definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Osx,
    Windows,
    Other,
}

impl Platform {
    /// The platform this binary was built for
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::Osx
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    /// Key of the override block in tasks.json, if this platform has one
    pub fn override_key(self) -> Option<&'static str> {
        match self {
            Platform::Linux => Some("linux"),
            Platform::Osx => Some("osx"),
            Platform::Windows => Some("windows"),
            Platform::Other => None,
        }
    }
}

/// Snapshot of the process environment used during parsing and expansion
#[derive(Debug, Clone)]
pub struct Ambient {
    /// The invoking user's home directory
    pub home_dir: PathBuf,

    /// Process working directory (what `${cwd}` expands to)
    pub cwd: PathBuf,

    /// Environment variables inherited by every task
    pub vars: HashMap<String, String>,

    /// Platform used to pick task overrides
    pub platform: Platform,
}

impl Ambient {
    /// Capture the current process environment
    pub fn capture() -> Self {
        let home_dir = BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_default();

        // Variables that are not valid unicode cannot be expanded into task
        // strings, so they are left out of the snapshot. Children still
        // inherit them from the process.
        let vars = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();

        Ambient {
            home_dir,
            cwd: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            vars,
            platform: Platform::current(),
        }
    }

    /// An empty context, mostly useful as a starting point in tests
    pub fn empty() -> Self {
        Ambient {
            home_dir: PathBuf::new(),
            cwd: PathBuf::new(),
            vars: HashMap::new(),
            platform: Platform::current(),
        }
    }

    /// Set the home directory
    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = dir.into();
        self
    }

    /// Set the working directory
    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = dir.into();
        self
    }

    /// Set a single environment variable
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set the platform
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Get an environment variable value
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_sees_process_environment() {
        let ambient = Ambient::capture();
        assert_eq!(ambient.cwd, env::current_dir().unwrap());
        if let Ok(path) = env::var("PATH") {
            assert_eq!(ambient.var("PATH"), Some(path.as_str()));
        }
    }

    #[test]
    fn test_builder_methods() {
        let ambient = Ambient::empty()
            .with_home_dir("/home/me")
            .with_cwd("/work")
            .with_var("KEY", "value")
            .with_platform(Platform::Windows);

        assert_eq!(ambient.home_dir, PathBuf::from("/home/me"));
        assert_eq!(ambient.cwd, PathBuf::from("/work"));
        assert_eq!(ambient.var("KEY"), Some("value"));
        assert_eq!(ambient.var("MISSING"), None);
        assert_eq!(ambient.platform, Platform::Windows);
    }

    #[test]
    fn test_override_keys() {
        assert_eq!(Platform::Linux.override_key(), Some("linux"));
        assert_eq!(Platform::Osx.override_key(), Some("osx"));
        assert_eq!(Platform::Windows.override_key(), Some("windows"));
        assert_eq!(Platform::Other.override_key(), None);
    }
}
