//! Recording executor for tests.
//!
//! `RecordingExecutor` implements [`Executor`] without spawning anything.
//! It keeps every invocation (including its composed environment), can be
//! scripted to fail or be interrupted, and can run side effects that stand
//! in for what a real installer would leave on disk.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use super::command::{ExecStatus, Executor, Invocation};
use crate::error::Result;

/// Scripted outcome for a matching invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Exit with status 0 and run any registered effect.
    Succeed,
    /// Exit with the given non-zero status.
    Fail(i32),
    /// Report an operator interrupt.
    Interrupt,
}

type Effect = Box<dyn Fn(&Invocation)>;

#[derive(Default)]
struct Recorded {
    invocations: Vec<Invocation>,
    responses: HashMap<String, VecDeque<Response>>,
    effects: Vec<(String, Effect)>,
}

/// Test double for [`Executor`].
///
/// Clones share the same record, so a test can keep one handle while the
/// project owns another.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    inner: Rc<RefCell<Recorded>>,
}

impl RecordingExecutor {
    /// Create an executor where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for commands whose command line starts with `prefix`.
    ///
    /// Queued responses are used once each, in order. Once exhausted the
    /// command succeeds.
    pub fn respond(&self, prefix: &str, response: Response) {
        self.inner
            .borrow_mut()
            .responses
            .entry(prefix.to_string())
            .or_default()
            .push_back(response);
    }

    /// Run `effect` whenever a command starting with `prefix` succeeds.
    pub fn on_success(&self, prefix: &str, effect: impl Fn(&Invocation) + 'static) {
        self.inner
            .borrow_mut()
            .effects
            .push((prefix.to_string(), Box::new(effect)));
    }

    /// All invocations so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.inner.borrow().invocations.clone()
    }

    /// Command lines of all invocations so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.inner
            .borrow()
            .invocations
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    /// Number of invocations whose command line starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.command_lines()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }

    /// Forget recorded invocations, keeping scripted responses and effects.
    pub fn clear(&self) {
        self.inner.borrow_mut().invocations.clear();
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<ExecStatus> {
        let line = invocation.command_line();
        let mut recorded = self.inner.borrow_mut();
        recorded.invocations.push(invocation.clone());

        let response = recorded
            .responses
            .iter_mut()
            .filter(|(prefix, queue)| line.starts_with(prefix.as_str()) && !queue.is_empty())
            .max_by_key(|(prefix, _)| prefix.len())
            .and_then(|(_, queue)| queue.pop_front())
            .unwrap_or(Response::Succeed);

        match response {
            Response::Succeed => {
                for (prefix, effect) in &recorded.effects {
                    if line.starts_with(prefix.as_str()) {
                        effect(invocation);
                    }
                }
                Ok(ExecStatus::Exited { code: Some(0) })
            }
            Response::Fail(code) => Ok(ExecStatus::Exited { code: Some(code) }),
            Response::Interrupt => Ok(ExecStatus::Interrupted),
        }
    }
}
