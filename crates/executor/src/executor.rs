//! Build-step orchestration
//!
//! Composes synthesis, resolution, assembly, and launch into the single
//! `perform` operation the host invokes. Decision logic lives in
//! `assemble_invocation`; `execute` owns the side effects (filesystem writes
//! and the process boundary).

use antx_errors::{ConfigError, Error, Result};
use antx_events::{AppEvent, EventEmitter, FailureContext, StepEvent};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::args::{self, ArgumentList};
use crate::buildfile;
use crate::config::StepConfig;
use crate::context::StepContext;
use crate::contrib;
use crate::environment;
use crate::locate;
use crate::process::{EventAnnotator, InvocationResult, OutputAnnotator, ProcessRunner};

/// Everything needed to launch the tool, decided before any side effect
#[derive(Clone, Debug)]
pub struct Invocation {
    pub args: ArgumentList,
    pub env: HashMap<String, String>,
    pub working_dir: PathBuf,
}

/// Executes one configured build step
pub struct BuildStepExecutor {
    config: StepConfig,
    context: StepContext,
}

impl BuildStepExecutor {
    #[must_use]
    pub fn new(config: StepConfig, context: StepContext) -> Self {
        Self { config, context }
    }

    /// Run the step, reporting success as a boolean.
    ///
    /// Every component failure is caught here, logged as a failure event,
    /// and mapped to `false`; nothing escapes to the host.
    pub async fn perform(&self) -> bool {
        let ctx = &self.context;
        ctx.emit(AppEvent::Step(StepEvent::Started {
            session_id: ctx.session_id.clone(),
            job: ctx.job.clone(),
            workspace: ctx.workspace.clone(),
        }));

        match self.execute().await {
            Ok(result) => {
                ctx.emit(AppEvent::Step(StepEvent::CommandCompleted {
                    session_id: ctx.session_id.clone(),
                    exit_code: result.exit_code,
                    duration: result.elapsed,
                }));
                if result.success() {
                    ctx.emit(AppEvent::Step(StepEvent::Completed {
                        session_id: ctx.session_id.clone(),
                        duration: result.elapsed,
                    }));
                    true
                } else {
                    // The tool already reported its own failure in the log;
                    // the exit code is not echoed beyond the events above.
                    ctx.emit(AppEvent::Step(StepEvent::Failed {
                        session_id: ctx.session_id.clone(),
                        failure: FailureContext::new(
                            None::<String>,
                            "build script failed",
                            None::<String>,
                            false,
                        ),
                    }));
                    false
                }
            }
            Err(err) => {
                ctx.emit(AppEvent::Step(StepEvent::Failed {
                    session_id: ctx.session_id.clone(),
                    failure: FailureContext::from_error(&err),
                }));
                false
            }
        }
    }

    /// Validate the step configuration without executing anything.
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found; used by the host's
    /// configuration-check surface, never fatal for an actual run.
    pub fn check(&self) -> std::result::Result<(), ConfigError> {
        if self.config.script_source.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "script_source".to_string(),
            });
        }
        if let Some(home) = &self.config.ant_home {
            locate::check_home(home)?;
        }
        Ok(())
    }

    /// Decide the argument vector, environment, and working directory.
    ///
    /// Pure with respect to the filesystem: the build file is referenced by
    /// its fixed name and the library directory by its fixed relative path,
    /// both materialized later by `execute`.
    ///
    /// # Errors
    ///
    /// Fails with `StepError::ToolNotFound` when no installation resolves.
    pub fn assemble_invocation(&self) -> Result<Invocation> {
        let ctx = &self.context;
        let base_env = environment::merge_build_vars(&ctx.ambient_env, &ctx.build_vars);
        let tool = locate::resolve(&self.config, &base_env, ctx)?;
        let env = environment::resolve(
            ctx,
            base_env,
            tool.home.as_deref(),
            self.config.ant_opts.as_deref(),
        );

        let lib_dir = self.config.use_ant_contrib.then_some(contrib::LIB_DIR);
        let args = args::assemble(
            &tool.executable,
            buildfile::BUILD_FILE_NAME,
            &self.config,
            &ctx.build_vars,
            &ctx.sensitive_vars,
            lib_dir,
        );

        Ok(Invocation {
            args,
            env,
            working_dir: ctx.workspace.clone(),
        })
    }

    /// Materialize the build file, stage libraries, and run the tool.
    ///
    /// # Errors
    ///
    /// Propagates synthesis, staging, and launch failures; a non-zero tool
    /// exit is an ordinary result.
    pub async fn execute(&self) -> Result<InvocationResult> {
        let mut annotator = EventAnnotator::new(&self.context);
        self.execute_with_annotator(&mut annotator).await
    }

    /// `execute` with a caller-supplied output annotator.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`].
    pub async fn execute_with_annotator(
        &self,
        annotator: &mut dyn OutputAnnotator,
    ) -> Result<InvocationResult> {
        let ctx = &self.context;
        let invocation = self.assemble_invocation()?;

        let document = buildfile::synthesize(
            &self.config.script_source,
            self.config.extended_script_source.as_deref(),
            self.config.script_name.as_deref(),
        );
        buildfile::write(ctx, &document).await?;

        if self.config.use_ant_contrib {
            let source = self.config.contrib_source.clone().ok_or_else(|| {
                Error::Config(ConfigError::MissingField {
                    field: "contrib_source".to_string(),
                })
            })?;
            ctx.emit_debug("using ant-contrib tasks");
            contrib::stage(ctx, &source).await?;
        } else {
            ctx.emit_debug("using Ant core tasks only");
        }

        self.echo_configuration();

        ctx.emit(AppEvent::Step(StepEvent::CommandStarted {
            session_id: ctx.session_id.clone(),
            command: invocation.args.to_display_string(),
            working_dir: invocation.working_dir.clone(),
        }));

        ProcessRunner::run(
            &invocation.args,
            &invocation.env,
            &invocation.working_dir,
            annotator,
            self.config.installation.is_some(),
        )
        .await
    }

    /// Echo the script and property blocks into the log, between banner
    /// lines, so the record shows exactly what the step was given. Runs on
    /// every invocation, not just verbose ones.
    fn echo_configuration(&self) {
        let ctx = &self.context;
        ctx.emit_debug("----- script source begin -----");
        ctx.emit_debug(self.config.script_source.clone());
        ctx.emit_debug("----- script source end -----");
        if let Some(properties) = &self.config.properties {
            ctx.emit_debug("----- properties begin -----");
            ctx.emit_debug(properties.clone());
            ctx.emit_debug("----- properties end -----");
        }
    }
}
