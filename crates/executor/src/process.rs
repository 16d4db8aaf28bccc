//! External process launch and output streaming

use antx_errors::{Error, Result, StepError};
use antx_events::{AppEvent, EventEmitter, EventSender, StepEvent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::args::ArgumentList;
use crate::context::StepContext;

/// Launch failures faster than this suggest the tool was never there at all
const QUICK_FAILURE: Duration = Duration::from_secs(1);

/// Exit status and elapsed wall-clock time of one invocation
#[derive(Clone, Copy, Debug)]
pub struct InvocationResult {
    pub exit_code: i32,
    pub elapsed: Duration,
}

impl InvocationResult {
    /// A zero exit code is the only success
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Pass-through output filter applied to the child's output stream
///
/// The annotator's job is cosmetic markup; the runner treats it as a black
/// box. `finish` is the trailing-terminator flush and runs exactly once per
/// invocation, on every exit path.
#[async_trait]
pub trait OutputAnnotator: Send {
    async fn annotate_line(&mut self, line: String, is_stderr: bool);

    async fn finish(&mut self);
}

/// Default annotator: forwards lines as step output events
pub struct EventAnnotator {
    sender: Option<EventSender>,
    session_id: String,
}

impl EventAnnotator {
    #[must_use]
    pub fn new(ctx: &StepContext) -> Self {
        Self {
            sender: ctx.event_sender.clone(),
            session_id: ctx.session_id.clone(),
        }
    }
}

#[async_trait]
impl OutputAnnotator for EventAnnotator {
    async fn annotate_line(&mut self, line: String, is_stderr: bool) {
        self.sender.emit(AppEvent::Step(StepEvent::Output {
            session_id: self.session_id.clone(),
            line,
            is_stderr,
        }));
    }

    async fn finish(&mut self) {}
}

/// Launches the build tool and waits for it to exit
pub struct ProcessRunner;

impl ProcessRunner {
    /// Run the assembled command and stream its output through the annotator.
    ///
    /// Working directory is the synthesized build file's parent. A non-zero
    /// exit is a normal result, not an error; only spawn and stream I/O
    /// failures are.
    ///
    /// # Errors
    ///
    /// Returns `StepError::LaunchFailed` when the process cannot be started
    /// or its output stream fails; the message is enriched with a
    /// configuration hint when the failure was immediate and no explicit
    /// installation was selected.
    pub async fn run(
        args: &ArgumentList,
        env: &HashMap<String, String>,
        working_dir: &Path,
        annotator: &mut dyn OutputAnnotator,
        explicit_installation: bool,
    ) -> Result<InvocationResult> {
        let started = Instant::now();
        let result = Self::run_inner(args, env, working_dir, annotator, started).await;

        // The trailing flush runs no matter how the invocation ended
        annotator.finish().await;

        result.map_err(|err| match err {
            Error::Step(StepError::LaunchFailed { program, mut message })
                if started.elapsed() < QUICK_FAILURE && !explicit_installation =>
            {
                message.push_str(
                    "; no Ant installation is configured globally or selected for this job",
                );
                Error::Step(StepError::LaunchFailed { program, message })
            }
            other => other,
        })
    }

    async fn run_inner(
        args: &ArgumentList,
        env: &HashMap<String, String>,
        working_dir: &Path,
        annotator: &mut dyn OutputAnnotator,
        started: Instant,
    ) -> Result<InvocationResult> {
        let argv = args.to_args();
        let Some(program) = argv.first().cloned() else {
            return Err(Error::internal("empty argument vector"));
        };

        let mut child = Command::new(&program)
            .args(&argv[1..])
            .env_clear()
            .envs(env)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The tool must not outlive the invocation, even when the run
            // future is cancelled mid-stream
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| StepError::LaunchFailed {
                program: program.clone(),
                message: e.to_string(),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            Error::internal("child stdout not captured")
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            Error::internal("child stderr not captured")
        })?;

        let mut out_lines = BufReader::new(stdout).lines();
        let mut err_lines = BufReader::new(stderr).lines();
        let mut out_done = false;
        let mut err_done = false;

        while !(out_done && err_done) {
            let (line, is_stderr) = tokio::select! {
                line = out_lines.next_line(), if !out_done => (line, false),
                line = err_lines.next_line(), if !err_done => (line, true),
            };
            match line {
                Ok(Some(line)) => annotator.annotate_line(line, is_stderr).await,
                Ok(None) if is_stderr => err_done = true,
                Ok(None) => out_done = true,
                Err(e) => {
                    // Reap the child before surfacing the stream failure so
                    // it cannot keep mutating the workspace
                    let _ = child.kill().await;
                    return Err(Error::Step(StepError::OutputStreamFailed {
                        message: e.to_string(),
                    }));
                }
            }
        }

        let status = child.wait().await.map_err(|e| StepError::LaunchFailed {
            program,
            message: e.to_string(),
        })?;

        Ok(InvocationResult {
            exit_code: status.code().unwrap_or(-1),
            elapsed: started.elapsed(),
        })
    }
}
