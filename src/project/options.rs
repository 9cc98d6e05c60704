//! Project configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{DotrunError, Result};

/// Settings for opening a [`Project`](super::Project).
///
/// # Example
///
/// ```
/// use dotrun::project::ProjectOptions;
///
/// let options = ProjectOptions::new("/srv/site")
///     .env("PORT", 8000)
///     .env("FLASK_DEBUG", true)
///     .platform_revision(Some("42"));
///
/// assert_eq!(options.env_extra().get("PORT").map(String::as_str), Some("8000"));
/// assert_eq!(options.env_extra().get("FLASK_DEBUG").map(String::as_str), Some("true"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOptions {
    root: PathBuf,
    env_extra: BTreeMap<String, String>,
    platform_revision: Option<String>,
}

impl ProjectOptions {
    /// Options for the project at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            env_extra: BTreeMap::new(),
            platform_revision: None,
        }
    }

    /// Add an extra environment variable. The value is stored as a string.
    pub fn env(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.env_extra.insert(key.into(), value.to_string());
        self
    }

    /// Add several extra environment variables.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in vars {
            self.env_extra.insert(key.into(), value.to_string());
        }
        self
    }

    /// Set the platform revision the Python environment is tied to.
    pub fn platform_revision(mut self, revision: Option<impl Into<String>>) -> Self {
        self.platform_revision = revision.map(Into::into);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env_extra(&self) -> &BTreeMap<String, String> {
        &self.env_extra
    }

    pub fn revision(&self) -> Option<&str> {
        self.platform_revision.as_deref()
    }

    pub(crate) fn into_parts(self) -> (PathBuf, BTreeMap<String, String>, Option<String>) {
        (self.root, self.env_extra, self.platform_revision)
    }
}

/// Parse a `KEY=VALUE` pair.
pub fn parse_env_var(spec: &str) -> Result<(String, String)> {
    match spec.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(DotrunError::InvalidEnvVar {
            spec: spec.to_string(),
        }),
    }
}
