use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::FailureContext;

/// Which resolution tier produced the Ant installation in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSource {
    /// A named installation selected in the step configuration
    Installation,
    /// A home directory typed into the step configuration
    HomeOverride,
    /// ANT_HOME from the ambient environment
    Environment,
    /// Bare executable name resolved on the search path
    SearchPath,
}

/// Build-step events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StepEvent {
    /// Step started for a job/build pair
    Started {
        session_id: String,
        job: String,
        workspace: PathBuf,
    },

    /// Build file synthesized and written to the workspace
    BuildFileWritten {
        session_id: String,
        path: PathBuf,
        record_copy: PathBuf,
    },

    /// Ant installation resolved for this invocation
    ToolResolved {
        session_id: String,
        executable: PathBuf,
        home: Option<PathBuf>,
        source: ToolSource,
    },

    /// An environment variable was forced for the child process
    EnvironmentChanged {
        session_id: String,
        variable: String,
        value: String,
    },

    /// Supplemental task library staged into the workspace
    LibraryStaged {
        session_id: String,
        library: String,
        directory: PathBuf,
    },

    /// Child process launched (command line already masked)
    CommandStarted {
        session_id: String,
        command: String,
        working_dir: PathBuf,
    },

    /// One line of annotated tool output
    Output {
        session_id: String,
        line: String,
        is_stderr: bool,
    },

    /// Child process exited
    CommandCompleted {
        session_id: String,
        exit_code: i32,
        duration: Duration,
    },

    /// Step finished successfully (tool exited zero)
    Completed { session_id: String, duration: Duration },

    /// Step failed (component failure or non-zero exit)
    Failed {
        session_id: String,
        failure: FailureContext,
    },
}
