//! Python dependencies via pip inside a project-local virtualenv.

use serde::{Deserialize, Serialize};
use std::fs;

use super::{glob_names, Ecosystem, InstallContext, Preparation};
use crate::error::{DotrunError, Result};
use crate::shell::{argv, RunOutcome};

/// Fingerprint persisted under the `python` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonFingerprint {
    /// Platform revision the venv was built under.
    #[serde(default)]
    pub snap_revision: Option<String>,

    /// Raw text of `requirements.txt`.
    #[serde(default)]
    pub requirements: String,

    /// Metadata directory names in the venv's site-packages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
}

/// The Python/pip ecosystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct Python;

impl Python {
    pub const KEY: &'static str = "python";
    pub const MANIFEST: &'static str = "requirements.txt";

    /// Always installed alongside the requirements.
    pub const DEBUGGER: &'static str = "ipdb";

    /// Installed distributions, as `*.dist-info` / `*.egg-info` names.
    pub fn installed_packages(ctx: &InstallContext<'_>) -> Vec<String> {
        glob_names(ctx.venv, "lib/python*/site-packages/*.*-info")
    }
}

impl Ecosystem for Python {
    type Fingerprint = PythonFingerprint;

    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn manifest(&self) -> &'static str {
        Self::MANIFEST
    }

    fn location(&self, ctx: &InstallContext<'_>) -> String {
        ctx.venv.display().to_string()
    }

    // A venv built under another platform revision points at an interpreter
    // that may no longer exist, so it is rebuilt from scratch.
    fn prepare(
        &self,
        ctx: &mut InstallContext<'_>,
        previous: Option<&PythonFingerprint>,
    ) -> Result<Preparation> {
        let previous_revision = previous.and_then(|p| p.snap_revision.as_deref());
        let new_revision = previous_revision != ctx.platform_revision;
        let mut force = false;

        if new_revision && ctx.venv.is_dir() {
            ctx.ui.progress(&format!(
                "- New dotrun revision {} - deleting old python environment",
                ctx.platform_revision.unwrap_or("(none)")
            ));
            fs::remove_dir_all(ctx.venv)?;
            force = true;
        }

        if !ctx.venv.is_dir() {
            ctx.ui.progress("- Creating python environment");
            let create = argv(&["virtualenv", &ctx.venv.display().to_string()]);
            if ctx.run(&create)? == RunOutcome::Interrupted {
                return Ok(Preparation::Interrupted);
            }
        }

        Ok(Preparation::Ready { force })
    }

    fn declare(&self, ctx: &InstallContext<'_>) -> Result<PythonFingerprint> {
        let path = ctx.root.join(Self::MANIFEST);
        let requirements = fs::read_to_string(&path).map_err(|e| DotrunError::ManifestParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(PythonFingerprint {
            snap_revision: ctx.platform_revision.map(str::to_string),
            requirements,
            packages: None,
        })
    }

    fn snapshot(&self, ctx: &InstallContext<'_>, fingerprint: &mut PythonFingerprint) {
        fingerprint.packages = Some(Self::installed_packages(ctx));
    }

    fn install_commands(&self, _ctx: &InstallContext<'_>) -> Vec<Vec<String>> {
        vec![
            argv(&["pip3", "install", "--requirement", Self::MANIFEST]),
            argv(&["pip3", "install", Self::DEBUGGER]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installers::fixture::Fixture;
    use crate::installers::Reconciliation;
    use crate::shell::{Invocation, Response};
    use std::path::PathBuf;

    const PIP: &str = "pip3 install";

    fn site_packages(inv: &Invocation) -> PathBuf {
        inv.cwd
            .join(".venv")
            .join("lib")
            .join("python3.12")
            .join("site-packages")
    }

    // Stand in for virtualenv and pip.
    fn simulate_python(fixture: &Fixture) {
        fixture.exec.on_success("virtualenv", |inv| {
            let venv = inv.cwd.join(".venv");
            fs::create_dir_all(venv.join("bin")).unwrap();
            fs::write(venv.join("bin").join("python3"), "").unwrap();
            fs::create_dir_all(site_packages(inv).join("pip-24.0.dist-info")).unwrap();
        });
        fixture.exec.on_success("pip3 install --requirement", |inv| {
            fs::create_dir_all(site_packages(inv).join("flask-3.0.0.dist-info")).unwrap();
        });
        fixture.exec.on_success("pip3 install ipdb", |inv| {
            fs::create_dir_all(site_packages(inv).join("ipdb-0.13.13.dist-info")).unwrap();
        });
    }

    fn fixture_with_requirements() -> Fixture {
        let fixture = Fixture::new();
        fixture.write("requirements.txt", "flask==3.0.0\n");
        simulate_python(&fixture);
        fixture
    }

    #[test]
    fn first_run_creates_venv_and_installs() {
        let mut fixture = fixture_with_requirements();

        let result = fixture.reconcile(&Python, false).unwrap();

        assert_eq!(result, Reconciliation::Installed { forced: false });
        let venv = fixture.venv().display().to_string();
        assert_eq!(
            fixture.exec.command_lines(),
            vec![
                format!("virtualenv {}", venv),
                "pip3 install --requirement requirements.txt".to_string(),
                "pip3 install ipdb".to_string(),
            ]
        );

        let stored: PythonFingerprint = fixture.state.get("python").unwrap();
        assert_eq!(stored.requirements, "flask==3.0.0\n");
        assert_eq!(
            stored.packages.unwrap(),
            vec![
                "flask-3.0.0.dist-info".to_string(),
                "ipdb-0.13.13.dist-info".to_string(),
                "pip-24.0.dist-info".to_string(),
            ]
        );
    }

    #[test]
    fn second_run_runs_nothing() {
        let mut fixture = fixture_with_requirements();
        fixture.reconcile(&Python, false).unwrap();
        fixture.exec.clear();

        let result = fixture.reconcile(&Python, false).unwrap();

        assert_eq!(result, Reconciliation::UpToDate);
        assert!(fixture.exec.invocations().is_empty());
    }

    #[test]
    fn requirements_change_triggers_install() {
        let mut fixture = fixture_with_requirements();
        fixture.reconcile(&Python, false).unwrap();
        fixture.exec.clear();

        fixture.write("requirements.txt", "flask==3.0.0\nrequests==2.31.0\n");
        let result = fixture.reconcile(&Python, false).unwrap();

        assert_eq!(result, Reconciliation::Installed { forced: false });
        assert_eq!(fixture.exec.count(PIP), 2);
    }

    #[test]
    fn new_revision_rebuilds_existing_venv() {
        let mut fixture = fixture_with_requirements();
        fixture.revision = Some("101".to_string());
        fixture.reconcile(&Python, false).unwrap();
        fixture.exec.clear();

        let stale_marker = fixture.venv().join("stale-marker");
        fs::write(&stale_marker, "").unwrap();
        fixture.revision = Some("102".to_string());
        let result = fixture.reconcile(&Python, false).unwrap();

        assert_eq!(result, Reconciliation::Installed { forced: true });
        assert!(!stale_marker.exists());
        let lines = fixture.exec.command_lines();
        assert!(lines[0].starts_with("virtualenv "));
        assert_eq!(fixture.exec.count(PIP), 2);

        let stored: PythonFingerprint = fixture.state.get("python").unwrap();
        assert_eq!(stored.snap_revision.as_deref(), Some("102"));
        assert!(fixture.ui.has_output("New dotrun revision 102"));
    }

    #[test]
    fn new_revision_without_venv_creates_it() {
        let mut fixture = fixture_with_requirements();
        fixture.revision = Some("7".to_string());

        let result = fixture.reconcile(&Python, false).unwrap();

        assert_eq!(result, Reconciliation::Installed { forced: false });
        assert!(!fixture.ui.has_output("deleting old python environment"));
        assert_eq!(fixture.exec.count("virtualenv"), 1);
    }

    #[test]
    fn missing_venv_is_recreated() {
        let mut fixture = fixture_with_requirements();
        fixture.reconcile(&Python, false).unwrap();
        fs::remove_dir_all(fixture.venv()).unwrap();
        fixture.exec.clear();

        let result = fixture.reconcile(&Python, false).unwrap();

        assert_eq!(fixture.exec.count("virtualenv"), 1);
        assert_eq!(result, Reconciliation::Installed { forced: false });
    }

    #[test]
    fn failed_pip_install_keeps_previous_state() {
        let mut fixture = fixture_with_requirements();
        fixture.exec.respond("pip3 install --requirement", Response::Fail(1));

        assert!(fixture.reconcile(&Python, false).is_err());
        assert_eq!(fixture.state.get_value("python"), None);
        assert_eq!(fixture.exec.count("pip3 install ipdb"), 0);
    }

    #[test]
    fn interrupted_venv_creation_stops() {
        let mut fixture = fixture_with_requirements();
        fixture.exec.respond("virtualenv", Response::Interrupt);

        let result = fixture.reconcile(&Python, false).unwrap();

        assert_eq!(result, Reconciliation::Interrupted);
        assert_eq!(fixture.exec.count(PIP), 0);
    }
}
