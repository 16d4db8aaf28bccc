//! antx - Ant build-step executor
//!
//! Thin CLI driver around the executor crate: builds a step configuration
//! from flags, wires the event channel to the terminal, runs one step, and
//! exits with the step's success as the process status.

mod cli;
mod events;

use crate::cli::{Cli, Commands, RunArgs};
use crate::events::EventHandler;
use antx_errors::UserFacingError;
use antx_executor::{check_home, BuildStepExecutor, StepConfig, StepContext};
use clap::Parser;
use std::collections::HashSet;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    let code = match run(cli).await {
        Ok(success) => i32::from(!success),
        Err(e) => {
            error!("application error: {e}");
            eprintln!("Error: {e}");
            if let Some(hint) = e.user_hint() {
                eprintln!("Hint: {hint}");
            }
            2
        }
    };
    process::exit(code);
}

async fn run(cli: Cli) -> antx_errors::Result<bool> {
    match cli.command {
        Commands::Check { ant_home } => match check_home(&ant_home) {
            Ok(()) => {
                println!("{} is a usable Ant installation", ant_home.display());
                Ok(true)
            }
            Err(err) => {
                eprintln!("{err}");
                Ok(false)
            }
        },
        Commands::Run(args) => run_step(args, cli.global.json, cli.global.debug).await,
    }
}

async fn run_step(args: RunArgs, json: bool, debug: bool) -> antx_errors::Result<bool> {
    let script_source = match (&args.script, &args.script_file) {
        (Some(script), _) => script.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| antx_errors::Error::io_with_path(&e, path))?,
        (None, None) => {
            return Err(antx_errors::ConfigError::MissingField {
                field: "script".to_string(),
            }
            .into())
        }
    };

    let workspace = match args.workspace {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let record_dir = args.record_dir.clone().unwrap_or_else(|| workspace.clone());

    let mut config = StepConfig::new(script_source);
    config.extended_script_source = args.extended_script;
    config.script_name = args.script_name;
    config.properties = args.properties;
    config.ant_home = args.ant_home;
    config.ant_opts = args.ant_opts;
    config.verbose = args.verbose;
    config.plain_output = args.plain;
    if let Some(jar) = args.ant_contrib {
        config = config.with_ant_contrib(jar);
    }

    let build_vars: Vec<(String, String)> = args
        .build_vars
        .iter()
        .filter_map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect();
    let sensitive_vars: HashSet<String> = args.sensitive_vars.into_iter().collect();

    let (event_sender, mut event_receiver) = antx_events::channel();
    let job = workspace
        .file_name()
        .map_or_else(|| "antx".to_string(), |n| n.to_string_lossy().into_owned());
    let context = StepContext::new(job, workspace, record_dir)
        .with_build_vars(build_vars)
        .with_sensitive_vars(sensitive_vars)
        .with_event_sender(event_sender);

    let renderer = tokio::spawn(async move {
        let mut handler = EventHandler::new(json, debug);
        while let Some(event) = event_receiver.recv().await {
            handler.handle_event(&event);
        }
    });

    let executor = BuildStepExecutor::new(config, context);
    let success = executor.perform().await;

    // Closing the last sender ends the renderer loop
    drop(executor);
    let _ = renderer.await;

    Ok(success)
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
