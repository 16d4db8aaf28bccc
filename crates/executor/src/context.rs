//! Step context for build-step execution

use antx_events::{EventEmitter, EventSender};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Per-invocation context supplied by the host
///
/// Everything here is owned by the host side of the boundary: the workspace
/// and record directories exist before the step runs, build variables arrive
/// already macro-expanded, and the sensitive set names the variables whose
/// values must never reach the log in plaintext.
#[derive(Clone, Debug)]
pub struct StepContext {
    /// Job name (used in events)
    pub job: String,
    /// Session identifier correlating all events of this invocation
    pub session_id: String,
    /// Build workspace directory
    pub workspace: PathBuf,
    /// Durable per-build record directory (audit copy of the build file)
    pub record_dir: PathBuf,
    /// Snapshot of the ambient process environment
    pub ambient_env: HashMap<String, String>,
    /// Build-scoped variables, in definition order
    pub build_vars: Vec<(String, String)>,
    /// Names of build variables flagged sensitive
    pub sensitive_vars: HashSet<String>,
    /// Event sender for progress and log output
    pub event_sender: Option<EventSender>,
}

impl EventEmitter for StepContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl StepContext {
    /// Create a new step context
    #[must_use]
    pub fn new(job: String, workspace: PathBuf, record_dir: PathBuf) -> Self {
        Self {
            job,
            session_id: format!("step-{}", uuid::Uuid::new_v4()),
            workspace,
            record_dir,
            ambient_env: std::env::vars().collect(),
            build_vars: Vec::new(),
            sensitive_vars: HashSet::new(),
            event_sender: None,
        }
    }

    /// Replace the ambient environment snapshot
    #[must_use]
    pub fn with_ambient_env(mut self, env: HashMap<String, String>) -> Self {
        self.ambient_env = env;
        self
    }

    /// Set the build-scoped variables
    #[must_use]
    pub fn with_build_vars(mut self, vars: Vec<(String, String)>) -> Self {
        self.build_vars = vars;
        self
    }

    /// Set the sensitive variable name set
    #[must_use]
    pub fn with_sensitive_vars(mut self, vars: HashSet<String>) -> Self {
        self.sensitive_vars = vars;
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }
}
