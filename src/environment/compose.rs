//! Per-invocation environment composition.
//!
//! Layers, in order: base environment, dotenv files (first-wins), explicit
//! extras (always win), then the ecosystem injections for the Python venv
//! and bundler.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::dotenv::apply_dotenv_files;

/// Bundler install path, relative to the project root.
pub const BUNDLE_PATH: &str = "vendor";

/// A fully composed child-process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEnvironment {
    /// Variables to hand to the child, replacing the inherited environment.
    pub vars: BTreeMap<String, String>,

    /// The virtual environment that was activated, if any.
    pub virtual_env: Option<PathBuf>,
}

/// Whether `venv` looks like a usable Python virtual environment.
pub fn has_virtual_env(venv: &Path) -> bool {
    venv.join("bin").join("python3").is_file()
}

/// Build the environment for a command run in `root`.
pub fn compose_environment(
    base: impl IntoIterator<Item = (String, String)>,
    root: &Path,
    venv: &Path,
    extra: &BTreeMap<String, String>,
) -> ComposedEnvironment {
    let mut vars: BTreeMap<String, String> = base.into_iter().collect();

    apply_dotenv_files(&mut vars, root);

    for (key, value) in extra {
        vars.insert(key.clone(), value.clone());
    }

    let virtual_env = if has_virtual_env(venv) {
        activate_virtual_env(&mut vars, venv);
        Some(venv.to_path_buf())
    } else {
        None
    };

    if root.join("Gemfile").is_file() {
        vars.insert("BUNDLE_PATH".to_string(), BUNDLE_PATH.to_string());
    }

    ComposedEnvironment { vars, virtual_env }
}

fn activate_virtual_env(vars: &mut BTreeMap<String, String>, venv: &Path) {
    let bin = venv.join("bin");
    let path = match vars.get("PATH") {
        Some(existing) if !existing.is_empty() => {
            format!("{}:{}", bin.display(), existing)
        }
        _ => bin.display().to_string(),
    };

    vars.insert("PATH".to_string(), path);
    vars.insert("VIRTUAL_ENV".to_string(), venv.display().to_string());
    vars.remove("PYTHONHOME");
}
