//! The project orchestrator.
//!
//! A [`Project`] owns one project directory: its state file, its Python
//! virtual environment, and the [`CommandRunner`] used for every child
//! process. It drives the installers and exposes `install`, `clean`, and
//! `exec`.

pub mod options;

pub use options::{parse_env_var, ProjectOptions};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{DotrunError, Result};
use crate::installers::{reconcile, Ecosystem, InstallContext, Node, Python, Reconciliation, Ruby};
use crate::shell::{argv, CommandRunner, Executor, ExitPolicy, RunOutcome};
use crate::state::StateStore;
use crate::ui::UserInterface;

/// What `install` did for each applicable ecosystem, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub results: Vec<(&'static str, Reconciliation)>,
}

impl InstallReport {
    /// Outcome for one ecosystem key.
    pub fn get(&self, key: &str) -> Option<Reconciliation> {
        self.results
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, result)| *result)
    }

    /// Whether an install step was interrupted.
    pub fn interrupted(&self) -> bool {
        self.results
            .iter()
            .any(|(_, result)| *result == Reconciliation::Interrupted)
    }

    /// Keys of ecosystems that ran their installer.
    pub fn installed(&self) -> Vec<&'static str> {
        self.results
            .iter()
            .filter(|(_, result)| matches!(result, Reconciliation::Installed { .. }))
            .map(|(key, _)| *key)
            .collect()
    }
}

/// A project directory with a `package.json`.
pub struct Project {
    root: PathBuf,
    venv: PathBuf,
    platform_revision: Option<String>,
    state: StateStore,
    runner: CommandRunner,
}

impl Project {
    /// Virtual environment directory, relative to the project root.
    pub const VENV_DIR: &'static str = ".venv";

    /// Node dependency directory, relative to the project root.
    pub const NODE_MODULES: &'static str = "node_modules";

    /// Open the project described by `options`.
    ///
    /// Fails with [`DotrunError::ManifestNotFound`] if the directory has no
    /// `package.json`. Nothing is read or written before that check.
    pub fn open(options: ProjectOptions, executor: Box<dyn Executor>) -> Result<Self> {
        let (root, env_extra, platform_revision) = options.into_parts();

        if !root.join(Node::MANIFEST).is_file() {
            return Err(DotrunError::ManifestNotFound { path: root });
        }

        let venv = root.join(Self::VENV_DIR);
        let state = StateStore::for_project(&root);
        let runner = CommandRunner::new(&root, &venv, env_extra, executor);

        debug!("Opened project at {}", root.display());

        Ok(Self {
            root,
            venv,
            platform_revision,
            state,
            runner,
        })
    }

    /// Override the pause after an interrupted command.
    pub fn with_interrupt_grace(mut self, grace: Duration) -> Self {
        self.runner = self.runner.with_interrupt_grace(grace);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn venv(&self) -> &Path {
        &self.venv
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Install dependencies for every ecosystem whose fingerprint changed.
    ///
    /// Ecosystems run in order Python, Ruby, Node. An interrupted install
    /// stops the remaining ecosystems.
    pub fn install(&mut self, force: bool, ui: &mut dyn UserInterface) -> Result<InstallReport> {
        let mut report = InstallReport::default();

        let result = self.reconcile(&Python, force, ui)?;
        if record(&mut report, Python::KEY, result) {
            return Ok(report);
        }

        let result = self.reconcile(&Ruby, force, ui)?;
        if record(&mut report, Ruby::KEY, result) {
            return Ok(report);
        }

        let result = self.reconcile(&Node, force, ui)?;
        record(&mut report, Node::KEY, result);

        Ok(report)
    }

    /// Remove everything dotrun created in the project.
    ///
    /// The project's own `clean` script runs first; its failure is reported
    /// but does not stop the rest of the cleanup.
    pub fn clean(&mut self, ui: &mut dyn UserInterface) -> Result<()> {
        self.runner.run(
            &argv(&["yarn", "--no-default-rc", "run", "clean"]),
            ExitPolicy::Continue,
            ui,
        )?;

        if self.state.exists() {
            ui.info(&format!("[ Removing `{}` ]", self.state.path().display()));
            self.state.remove()?;
        }

        let node_modules = self.root.join(Self::NODE_MODULES);
        if node_modules.is_dir() {
            ui.info("[ Removing node dependencies (`node_modules`) ]");
            fs::remove_dir_all(&node_modules)?;
        }

        if self.venv.is_dir() {
            ui.info(&format!(
                "[ Removing python environment (`{}`) ]",
                self.venv.display()
            ));
            fs::remove_dir_all(&self.venv)?;
        }

        Ok(())
    }

    /// Run a command in the project environment. A non-zero exit is fatal.
    pub fn exec(&mut self, command: &[String], ui: &mut dyn UserInterface) -> Result<RunOutcome> {
        self.runner.run(command, ExitPolicy::Fatal, ui)
    }

    /// Run a `package.json` script through yarn.
    pub fn run_script(
        &mut self,
        script: &str,
        args: &[String],
        ui: &mut dyn UserInterface,
    ) -> Result<RunOutcome> {
        let mut command = argv(&["yarn", "--no-default-rc", "run", script]);
        command.extend_from_slice(args);
        self.exec(&command, ui)
    }

    fn reconcile<E: Ecosystem>(
        &mut self,
        ecosystem: &E,
        force: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<Reconciliation> {
        let mut ctx = InstallContext {
            root: &self.root,
            venv: &self.venv,
            platform_revision: self.platform_revision.as_deref(),
            state: &self.state,
            runner: &mut self.runner,
            ui,
        };
        reconcile(ecosystem, &mut ctx, force)
    }
}

// Returns true if reconciliation should stop here.
fn record(report: &mut InstallReport, key: &'static str, result: Reconciliation) -> bool {
    if result == Reconciliation::NoMarker {
        return false;
    }
    report.results.push((key, result));
    result == Reconciliation::Interrupted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{RecordingExecutor, Response};
    use crate::ui::MockUI;
    use tempfile::TempDir;

    const YARN_INSTALL: &str = "yarn --no-default-rc install";

    fn project_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"dependencies": {"vanilla-framework": "^4.0.0"}}"#,
        )
        .unwrap();
        temp
    }

    fn open(temp: &TempDir, exec: &RecordingExecutor) -> Project {
        Project::open(ProjectOptions::new(temp.path()), Box::new(exec.clone()))
            .unwrap()
            .with_interrupt_grace(Duration::ZERO)
    }

    #[test]
    fn open_requires_package_json() {
        let temp = TempDir::new().unwrap();
        let result = Project::open(
            ProjectOptions::new(temp.path()),
            Box::new(RecordingExecutor::new()),
        );

        assert!(matches!(result, Err(DotrunError::ManifestNotFound { .. })));
        assert!(!temp.path().join(".dotrun.json").exists());
    }

    #[test]
    fn node_only_project_installs_once_and_stores_one_key() {
        let temp = project_dir();
        let exec = RecordingExecutor::new();
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        let report = project.install(false, &mut ui).unwrap();

        assert_eq!(exec.command_lines(), vec![YARN_INSTALL.to_string()]);
        assert_eq!(report.installed(), vec!["yarn"]);

        let content = fs::read_to_string(temp.path().join(".dotrun.json")).unwrap();
        let state: serde_json::Value = serde_json::from_str(&content).unwrap();
        let keys: Vec<&String> = state.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["yarn"]);
    }

    #[test]
    fn install_is_idempotent() {
        let temp = project_dir();
        let exec = RecordingExecutor::new();
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        project.install(false, &mut ui).unwrap();
        exec.clear();
        let report = project.install(false, &mut ui).unwrap();

        assert!(exec.invocations().is_empty());
        assert_eq!(report.get("yarn"), Some(Reconciliation::UpToDate));
    }

    #[test]
    fn install_runs_python_then_ruby_then_node() {
        let temp = project_dir();
        fs::write(temp.path().join("requirements.txt"), "flask\n").unwrap();
        fs::write(temp.path().join("Gemfile"), "gem \"jekyll\"\n").unwrap();
        let exec = RecordingExecutor::new();
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        let report = project.install(false, &mut ui).unwrap();

        let keys: Vec<&str> = report.results.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["python", "ruby", "yarn"]);
        let lines = exec.command_lines();
        assert!(lines[0].starts_with("virtualenv "));
        assert_eq!(lines.last().map(String::as_str), Some(YARN_INSTALL));
    }

    #[test]
    fn failed_install_stops_everything() {
        let temp = project_dir();
        fs::write(temp.path().join("Gemfile"), "gem \"jekyll\"\n").unwrap();
        let exec = RecordingExecutor::new();
        exec.respond("bundle install", Response::Fail(1));
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        assert!(project.install(false, &mut ui).is_err());
        assert_eq!(exec.count(YARN_INSTALL), 0);
    }

    #[test]
    fn interrupted_install_stops_remaining_ecosystems() {
        let temp = project_dir();
        fs::write(temp.path().join("Gemfile"), "gem \"jekyll\"\n").unwrap();
        let exec = RecordingExecutor::new();
        exec.respond("bundle install", Response::Interrupt);
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        let report = project.install(false, &mut ui).unwrap();

        assert!(report.interrupted());
        assert_eq!(report.get("yarn"), None);
        assert_eq!(exec.count(YARN_INSTALL), 0);
    }

    #[test]
    fn force_reinstalls_everything() {
        let temp = project_dir();
        let exec = RecordingExecutor::new();
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        project.install(false, &mut ui).unwrap();
        exec.clear();
        let report = project.install(true, &mut ui).unwrap();

        assert_eq!(exec.count(YARN_INSTALL), 1);
        assert_eq!(report.get("yarn"), Some(Reconciliation::Installed { forced: true }));
    }

    #[test]
    fn clean_removes_state_venv_and_node_modules() {
        let temp = project_dir();
        let exec = RecordingExecutor::new();
        exec.respond("yarn --no-default-rc run clean", Response::Fail(1));
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        project.install(false, &mut ui).unwrap();
        fs::create_dir_all(temp.path().join("node_modules/react")).unwrap();
        fs::create_dir_all(temp.path().join(".venv/bin")).unwrap();

        project.clean(&mut ui).unwrap();

        assert!(!temp.path().join(".dotrun.json").exists());
        assert!(!temp.path().join("node_modules").exists());
        assert!(!temp.path().join(".venv").exists());
        assert!(ui.has_output("exited with an error status"));
        assert!(ui.has_output("Removing node dependencies"));
    }

    #[test]
    fn clean_on_fresh_project_only_runs_clean_script() {
        let temp = project_dir();
        let exec = RecordingExecutor::new();
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        project.clean(&mut ui).unwrap();

        assert_eq!(
            exec.command_lines(),
            vec!["yarn --no-default-rc run clean".to_string()]
        );
        assert!(!ui.has_output("Removing"));
    }

    #[test]
    fn exec_failure_is_fatal() {
        let temp = project_dir();
        let exec = RecordingExecutor::new();
        exec.respond("make", Response::Fail(4));
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        let err = project.exec(&argv(&["make", "test"]), &mut ui).unwrap_err();

        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn exec_interrupt_is_not_an_error() {
        let temp = project_dir();
        let exec = RecordingExecutor::new();
        exec.respond("yarn", Response::Interrupt);
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        let outcome = project.run_script("serve", &[], &mut ui).unwrap();

        assert_eq!(outcome, RunOutcome::Interrupted);
    }

    #[test]
    fn run_script_passes_arguments() {
        let temp = project_dir();
        let exec = RecordingExecutor::new();
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        project
            .run_script("test", &argv(&["--watch"]), &mut ui)
            .unwrap();

        assert_eq!(
            exec.command_lines(),
            vec!["yarn --no-default-rc run test --watch".to_string()]
        );
    }

    #[test]
    fn extras_override_dotenv_files() {
        let temp = project_dir();
        fs::write(temp.path().join(".env"), "DOTRUN_FIXTURE_A=1\n").unwrap();
        fs::write(
            temp.path().join(".env.local"),
            "DOTRUN_FIXTURE_A=2\nDOTRUN_FIXTURE_B=3\n",
        )
        .unwrap();
        let exec = RecordingExecutor::new();
        let mut project = Project::open(
            ProjectOptions::new(temp.path()).env("DOTRUN_FIXTURE_B", 9),
            Box::new(exec.clone()),
        )
        .unwrap();
        let mut ui = MockUI::new();

        project.exec(&argv(&["env"]), &mut ui).unwrap();

        let invocations = exec.invocations();
        let env = &invocations[0].env;
        assert_eq!(env.get("DOTRUN_FIXTURE_A").map(String::as_str), Some("1"));
        assert_eq!(env.get("DOTRUN_FIXTURE_B").map(String::as_str), Some("9"));
    }
}
