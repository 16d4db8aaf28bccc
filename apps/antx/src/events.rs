//! Event handling and log rendering

use antx_events::{AppEvent, GeneralEvent, StepEvent};

/// Renders executor events as build-log lines
pub struct EventHandler {
    json: bool,
    debug: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(json: bool, debug: bool) -> Self {
        Self { json, debug }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: &AppEvent) {
        if self.json {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
            return;
        }

        match event {
            AppEvent::Step(step) => self.handle_step_event(step),
            AppEvent::General(general) => self.handle_general_event(general),
        }
    }

    fn handle_step_event(&self, event: &StepEvent) {
        match event {
            StepEvent::Started { job, workspace, .. } => {
                println!("[antx] running step for {job} in {}", workspace.display());
            }
            StepEvent::BuildFileWritten { path, .. } => {
                println!("[antx] build file: {}", path.display());
            }
            StepEvent::ToolResolved {
                executable, source, ..
            } => {
                println!("[antx] using {} ({source:?})", executable.display());
            }
            StepEvent::EnvironmentChanged {
                variable, value, ..
            } => {
                println!("[antx] {variable}={value}");
            }
            StepEvent::LibraryStaged {
                library, directory, ..
            } => {
                println!("[antx] staged {library} into {}", directory.display());
            }
            StepEvent::CommandStarted { command, .. } => {
                println!("[antx] $ {command}");
            }
            StepEvent::Output {
                line, is_stderr, ..
            } => {
                if *is_stderr {
                    eprintln!("{line}");
                } else {
                    println!("{line}");
                }
            }
            StepEvent::CommandCompleted {
                exit_code,
                duration,
                ..
            } => {
                tracing::debug!("tool exited {exit_code} after {duration:?}");
            }
            StepEvent::Completed { duration, .. } => {
                println!("[antx] step succeeded in {duration:?}");
            }
            StepEvent::Failed { failure, .. } => {
                eprintln!("[antx] step failed: {}", failure.message);
                if let Some(hint) = &failure.hint {
                    eprintln!("[antx] hint: {hint}");
                }
            }
        }
    }

    fn handle_general_event(&self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Info { message } => println!("[antx] {message}"),
            GeneralEvent::Warning { message } => eprintln!("[antx] warning: {message}"),
            GeneralEvent::Error { message } => eprintln!("[antx] error: {message}"),
            GeneralEvent::DebugLog { message } => {
                if self.debug {
                    println!("[antx] {message}");
                }
            }
        }
    }
}
