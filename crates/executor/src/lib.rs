#![deny(clippy::pedantic, unsafe_code)]
//! Build-step execution for antx
//!
//! This crate turns a user-supplied Ant script fragment into a running Ant
//! process: it synthesizes a build file in the workspace, resolves which Ant
//! installation to use, assembles a masked command line, merges the child
//! environment, and launches the tool, streaming its output through an
//! annotator into the event channel.

mod args;
mod buildfile;
mod config;
mod context;
mod contrib;
mod environment;
mod executor;
mod locate;
mod process;

pub use args::{ArgumentList, MASK};
pub use buildfile::{synthesize, BUILD_FILE_NAME, DEFAULT_TARGET};
pub use config::{StepConfig, ToolInstallation};
pub use context::StepContext;
pub use environment::{ANT_HOME_VAR, ANT_OPTS_VAR};
pub use executor::{BuildStepExecutor, Invocation};
pub use locate::{check_home, ResolvedTool};
pub use process::{EventAnnotator, InvocationResult, OutputAnnotator, ProcessRunner};
