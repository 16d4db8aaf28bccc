//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// antx - Ant build-step executor
#[derive(Parser)]
#[command(name = "antx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Runs user-supplied Ant script fragments as a build step")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Emit events as JSON lines instead of rendered text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Execute a build step
    Run(RunArgs),

    /// Validate an Ant home directory without running anything
    Check {
        /// Installation root to validate
        ant_home: PathBuf,
    },
}

/// Arguments describing one build step
#[derive(Args)]
pub struct RunArgs {
    /// Ant script fragment (body of the generated default target)
    #[arg(long, conflicts_with = "script_file")]
    pub script: Option<String>,

    /// Read the script fragment from a file
    #[arg(long, value_name = "PATH")]
    pub script_file: Option<PathBuf>,

    /// Extra top-level content appended after the default target
    #[arg(long)]
    pub extended_script: Option<String>,

    /// Name for the generated default target
    #[arg(long)]
    pub script_name: Option<String>,

    /// Property lines (key=value, one per line)
    #[arg(long)]
    pub properties: Option<String>,

    /// Ant home override for this step
    #[arg(long, env = "ANTX_ANT_HOME", value_name = "DIR")]
    pub ant_home: Option<PathBuf>,

    /// Extra JVM options, stored under ANT_OPTS
    #[arg(long)]
    pub ant_opts: Option<String>,

    /// Emit tier-by-tier resolution diagnostics
    #[arg(long)]
    pub verbose: bool,

    /// Pass -emacs for plain tool output
    #[arg(long)]
    pub plain: bool,

    /// Stage ant-contrib.jar from this path and pass -lib
    #[arg(long, value_name = "JAR")]
    pub ant_contrib: Option<PathBuf>,

    /// Build workspace directory (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Durable record directory for the build-file audit copy
    #[arg(long, value_name = "DIR")]
    pub record_dir: Option<PathBuf>,

    /// Build-scoped variable (KEY=VALUE, repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub build_vars: Vec<String>,

    /// Mark a build variable as sensitive (repeatable)
    #[arg(long = "sensitive", value_name = "KEY")]
    pub sensitive_vars: Vec<String>,
}
