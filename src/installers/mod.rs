//! Change-detection-gated dependency installers.
//!
//! Every ecosystem runs the same reconciliation:
//!
//! 1. Skip entirely if the ecosystem's manifest is absent
//! 2. Compute the declared half of the fingerprint (manifest, lockfile)
//! 3. Unless forced, add the installed-package snapshot and compare with
//!    the fingerprint stored under the ecosystem's key
//! 4. On any difference (or force, or no stored fingerprint) run the
//!    install commands; a failure is fatal
//! 5. After a successful install, refresh the snapshot and lock hash and
//!    persist the fingerprint
//!
//! Nothing is persisted before the install succeeds, so a failed or
//! interrupted install is simply retried on the next run.

pub mod gemfile;
pub mod node;
pub mod python;
pub mod ruby;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::shell::{CommandRunner, ExitPolicy, RunOutcome};
use crate::state::StateStore;
use crate::ui::UserInterface;

pub use gemfile::{parse_gemfile, GemDependency};
pub use node::{Node, NodeFingerprint};
pub use python::{Python, PythonFingerprint};
pub use ruby::{Ruby, RubyFingerprint};

/// Everything an installer needs from the project.
pub struct InstallContext<'a> {
    /// Project root.
    pub root: &'a Path,
    /// Python virtual environment directory.
    pub venv: &'a Path,
    /// Identifier of the host toolchain build, if known.
    pub platform_revision: Option<&'a str>,
    /// Persisted fingerprints.
    pub state: &'a StateStore,
    /// Runs install commands.
    pub runner: &'a mut CommandRunner,
    /// Status output.
    pub ui: &'a mut dyn UserInterface,
}

impl InstallContext<'_> {
    /// Run an install step. Failure is fatal.
    pub fn run(&mut self, command: &[String]) -> Result<RunOutcome> {
        self.runner.run(command, ExitPolicy::Fatal, &mut *self.ui)
    }
}

/// Outcome of reconciling one ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The manifest is absent; the ecosystem does not apply.
    NoMarker,
    /// The fingerprint matched; nothing was installed.
    UpToDate,
    /// Dependencies were installed and the fingerprint persisted.
    Installed { forced: bool },
    /// The operator interrupted an install step; nothing was persisted.
    Interrupted,
}

/// Result of an ecosystem's preparation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preparation {
    /// Continue, forcing installation if `force` is set.
    Ready { force: bool },
    /// A preparation command was interrupted.
    Interrupted,
}

/// One dependency toolchain.
pub trait Ecosystem {
    /// Comparable snapshot persisted under [`key`](Ecosystem::key).
    type Fingerprint: Serialize + DeserializeOwned + PartialEq + fmt::Debug;

    /// State store key.
    fn key(&self) -> &'static str;

    /// Manifest file whose presence enables this ecosystem.
    fn manifest(&self) -> &'static str;

    /// Where installed packages live, for status lines.
    fn location(&self, _ctx: &InstallContext<'_>) -> String {
        self.manifest().to_string()
    }

    /// Bring the environment into a usable shape before comparison.
    fn prepare(
        &self,
        _ctx: &mut InstallContext<'_>,
        _previous: Option<&Self::Fingerprint>,
    ) -> Result<Preparation> {
        Ok(Preparation::Ready { force: false })
    }

    /// Declared half of the fingerprint.
    fn declare(&self, ctx: &InstallContext<'_>) -> Result<Self::Fingerprint>;

    /// Fill in the installed-package snapshot.
    fn snapshot(&self, ctx: &InstallContext<'_>, fingerprint: &mut Self::Fingerprint);

    /// Commands that install the declared dependencies, run in order.
    fn install_commands(&self, ctx: &InstallContext<'_>) -> Vec<Vec<String>>;

    /// Refresh the fingerprint after a successful install.
    fn refresh(&self, ctx: &InstallContext<'_>, fingerprint: &mut Self::Fingerprint) {
        self.snapshot(ctx, fingerprint);
    }
}

/// Reconcile one ecosystem against its stored fingerprint.
pub fn reconcile<E: Ecosystem>(
    ecosystem: &E,
    ctx: &mut InstallContext<'_>,
    force: bool,
) -> Result<Reconciliation> {
    if !ctx.root.join(ecosystem.manifest()).is_file() {
        debug!("No {}, skipping {}", ecosystem.manifest(), ecosystem.key());
        return Ok(Reconciliation::NoMarker);
    }

    let previous: Option<E::Fingerprint> = ctx.state.get(ecosystem.key());

    let force = match ecosystem.prepare(ctx, previous.as_ref())? {
        Preparation::Ready { force: prepared } => force || prepared,
        Preparation::Interrupted => return Ok(Reconciliation::Interrupted),
    };

    let mut fingerprint = ecosystem.declare(ctx)?;

    if force {
        ctx.ui.progress(&format!(
            "- Installing dependencies from {} (forced)",
            ecosystem.manifest()
        ));
    } else {
        ecosystem.snapshot(ctx, &mut fingerprint);
        let checking = format!(
            "- Checking dependencies in {} ... ",
            ecosystem.location(ctx)
        );

        if previous.as_ref() == Some(&fingerprint) {
            ctx.ui.progress(&format!("{}up to date", checking));
            return Ok(Reconciliation::UpToDate);
        }

        debug!(
            "{} fingerprint changed: stored {:?}, current {:?}",
            ecosystem.key(),
            previous,
            fingerprint
        );
        ctx.ui.progress(&format!("{}changes detected", checking));
    }

    for command in ecosystem.install_commands(ctx) {
        if ctx.run(&command)? == RunOutcome::Interrupted {
            return Ok(Reconciliation::Interrupted);
        }
    }

    ecosystem.refresh(ctx, &mut fingerprint);
    ctx.state.set(ecosystem.key(), &fingerprint)?;

    Ok(Reconciliation::Installed { forced: force })
}

/// Paths under `root` matching `pattern`, sorted.
pub(crate) fn glob_paths(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        pattern
    );

    match glob::glob(&full) {
        Ok(paths) => {
            let mut paths: Vec<PathBuf> = paths.filter_map(std::result::Result::ok).collect();
            paths.sort();
            paths
        }
        Err(e) => {
            warn!("Invalid glob pattern {}: {}", full, e);
            Vec::new()
        }
    }
}

/// File names of paths under `root` matching `pattern`, sorted.
pub(crate) fn glob_names(root: &Path, pattern: &str) -> Vec<String> {
    let mut names: Vec<String> = glob_paths(root, pattern)
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
