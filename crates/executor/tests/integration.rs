//! Integration tests for build-step execution
//!
//! These run real child processes against a fake Ant installation built in a
//! temp directory: a shell-script `bin/ant` plus the `lib/ant.jar` marker.

#![cfg(unix)]

use antx_events::{channel, AppEvent, EventReceiver, GeneralEvent, StepEvent, ToolSource};
use antx_executor::{
    BuildStepExecutor, StepConfig, StepContext, ToolInstallation, BUILD_FILE_NAME, MASK,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn fake_ant(dir: &Path, body: &str) {
    fs::create_dir_all(dir.join("bin")).unwrap();
    fs::create_dir_all(dir.join("lib")).unwrap();
    let exe = dir.join("bin/ant");
    fs::write(&exe, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
    fs::write(dir.join("lib/ant.jar"), b"").unwrap();
}

fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

struct Harness {
    workspace: tempfile::TempDir,
    record: tempfile::TempDir,
    rx: EventReceiver,
    context: StepContext,
}

fn harness() -> Harness {
    let workspace = tempfile::tempdir().unwrap();
    let record = tempfile::tempdir().unwrap();
    let (tx, rx) = channel();
    let context = StepContext::new(
        "test-job".into(),
        workspace.path().to_path_buf(),
        record.path().to_path_buf(),
    )
    .with_ambient_env(HashMap::new())
    .with_event_sender(tx);
    Harness {
        workspace,
        record,
        rx,
        context,
    }
}

#[tokio::test]
async fn end_to_end_success() {
    let ant_home = tempfile::tempdir().unwrap();
    fake_ant(ant_home.path(), "echo \"BUILD SUCCESSFUL\"");
    let mut h = harness();

    let config = StepConfig::new("<echo message='hi'/>")
        .with_properties("x=1")
        .with_ant_home(ant_home.path());
    let executor = BuildStepExecutor::new(config, h.context.clone());

    assert!(executor.perform().await);

    let events = drain(&mut h.rx);
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Step(StepEvent::Output { line, .. }) if line == "BUILD SUCCESSFUL"
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, AppEvent::Step(StepEvent::Completed { .. }))));

    // Build file landed in the workspace and the durable record directory
    let document = fs::read_to_string(h.workspace.path().join(BUILD_FILE_NAME)).unwrap();
    assert!(document.contains("<echo message='hi'/>"));
    let copy = fs::read_to_string(h.record.path().join(BUILD_FILE_NAME)).unwrap();
    assert_eq!(document, copy);
}

#[tokio::test]
async fn assembled_invocation_matches_contract() {
    let ant_home = tempfile::tempdir().unwrap();
    fake_ant(ant_home.path(), "exit 0");
    let h = harness();

    let config = StepConfig::new("<echo message='hi'/>")
        .with_properties("x=1")
        .with_ant_home(ant_home.path());
    let executor = BuildStepExecutor::new(config, h.context.clone());

    let invocation = executor.assemble_invocation().unwrap();
    assert_eq!(
        invocation.args.to_args(),
        vec![
            ant_home.path().join("bin/ant").display().to_string(),
            "-file".to_string(),
            BUILD_FILE_NAME.to_string(),
            "-Dx=1".to_string(),
        ]
    );
    assert_eq!(invocation.working_dir, h.workspace.path());
    assert_eq!(
        invocation.env.get("ANT_HOME").unwrap(),
        &ant_home.path().display().to_string()
    );
}

#[tokio::test]
async fn sensitive_value_masked_in_log_but_passed_to_process() {
    let ant_home = tempfile::tempdir().unwrap();
    // The fake tool echoes its arguments back, standing in for a child that
    // actually consumes the property value.
    fake_ant(ant_home.path(), "echo \"$@\"");
    let mut h = harness();
    h.context.build_vars = vec![("SECRET".to_string(), "hunter2".to_string())];
    h.context.sensitive_vars = HashSet::from(["SECRET".to_string()]);

    let config = StepConfig::new("<echo/>").with_ant_home(ant_home.path());
    let executor = BuildStepExecutor::new(config, h.context.clone());

    assert!(executor.perform().await);

    let events = drain(&mut h.rx);
    let command = events
        .iter()
        .find_map(|e| match e {
            AppEvent::Step(StepEvent::CommandStarted { command, .. }) => Some(command.clone()),
            _ => None,
        })
        .unwrap();
    assert!(!command.contains("hunter2"));
    assert!(command.contains(&format!("-DSECRET={MASK}")));

    // The child saw the real value
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Step(StepEvent::Output { line, .. }) if line.contains("-DSECRET=hunter2")
    )));
}

#[tokio::test]
async fn script_and_properties_echoed_without_verbose() {
    let ant_home = tempfile::tempdir().unwrap();
    fake_ant(ant_home.path(), "exit 0");
    let mut h = harness();

    let config = StepConfig::new("<echo message='banner'/>")
        .with_properties("x=1")
        .with_ant_home(ant_home.path());
    assert!(!config.verbose);
    let executor = BuildStepExecutor::new(config, h.context.clone());

    assert!(executor.perform().await);

    let debug_lines: Vec<String> = drain(&mut h.rx)
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::General(GeneralEvent::DebugLog { message }) => Some(message),
            _ => None,
        })
        .collect();
    assert!(debug_lines.contains(&"----- script source begin -----".to_string()));
    assert!(debug_lines.contains(&"<echo message='banner'/>".to_string()));
    assert!(debug_lines.contains(&"----- properties begin -----".to_string()));
    assert!(debug_lines.contains(&"x=1".to_string()));
}

#[tokio::test]
async fn named_installation_wins_over_environment() {
    let selected = tempfile::tempdir().unwrap();
    let ambient = tempfile::tempdir().unwrap();
    fake_ant(selected.path(), "exit 0");
    fake_ant(ambient.path(), "exit 0");

    let mut h = harness();
    h.context.ambient_env = HashMap::from([(
        "ANT_HOME".to_string(),
        ambient.path().display().to_string(),
    )]);

    let config = StepConfig::new("<echo/>").with_installation(ToolInstallation {
        name: "ant-default".into(),
        home: selected.path().to_path_buf(),
    });
    let executor = BuildStepExecutor::new(config, h.context.clone());

    let invocation = executor.assemble_invocation().unwrap();
    assert_eq!(
        invocation.args.to_args()[0],
        selected.path().join("bin/ant").display().to_string()
    );

    let events = drain(&mut h.rx);
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Step(StepEvent::ToolResolved { source: ToolSource::Installation, .. })
    )));
}

#[tokio::test]
async fn nonzero_exit_reports_failure_without_error() {
    let ant_home = tempfile::tempdir().unwrap();
    fake_ant(ant_home.path(), "echo \"BUILD FAILED\" >&2; exit 1");
    let mut h = harness();

    let config = StepConfig::new("<fail/>").with_ant_home(ant_home.path());
    let executor = BuildStepExecutor::new(config, h.context.clone());

    assert!(!executor.perform().await);

    let events = drain(&mut h.rx);
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Step(StepEvent::CommandCompleted { exit_code: 1, .. })
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Step(StepEvent::Output { line, is_stderr: true, .. }) if line == "BUILD FAILED"
    )));
}

#[tokio::test]
async fn unresolvable_tool_fails_with_hint() {
    let empty = tempfile::tempdir().unwrap();
    let mut h = harness();
    h.context.ambient_env = HashMap::from([(
        "PATH".to_string(),
        empty.path().display().to_string(),
    )]);

    let config = StepConfig::new("<echo/>");
    let executor = BuildStepExecutor::new(config, h.context.clone());

    assert!(!executor.perform().await);

    let events = drain(&mut h.rx);
    let failure = events
        .iter()
        .find_map(|e| match e {
            AppEvent::Step(StepEvent::Failed { failure, .. }) => Some(failure.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(failure.code.as_deref(), Some("step.tool_not_found"));
    assert!(failure.hint.unwrap().contains("ANT_HOME"));
}

#[tokio::test]
async fn ant_contrib_staging_adds_lib_argument() {
    let ant_home = tempfile::tempdir().unwrap();
    fake_ant(ant_home.path(), "echo \"$@\"");
    let jar_dir = tempfile::tempdir().unwrap();
    let jar = jar_dir.path().join("ant-contrib.jar");
    fs::write(&jar, b"jar").unwrap();

    let mut h = harness();
    let config = StepConfig::new("<echo/>")
        .with_ant_home(ant_home.path())
        .with_ant_contrib(&jar);
    let executor = BuildStepExecutor::new(config, h.context.clone());

    assert!(executor.perform().await);

    assert!(h.workspace.path().join("antlib/ant-contrib.jar").is_file());
    let events = drain(&mut h.rx);
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Step(StepEvent::Output { line, .. }) if line.contains("-lib antlib")
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, AppEvent::Step(StepEvent::LibraryStaged { .. }))));
}

#[tokio::test]
async fn check_flags_invalid_home_without_running() {
    let bogus = tempfile::tempdir().unwrap();
    let h = harness();

    let config = StepConfig::new("<echo/>").with_ant_home(bogus.path());
    let executor = BuildStepExecutor::new(config, h.context.clone());

    assert!(executor.check().is_err());

    let empty_script = StepConfig::new("   ");
    let executor = BuildStepExecutor::new(empty_script, h.context.clone());
    assert!(executor.check().is_err());
}

#[tokio::test]
async fn extended_script_source_round_trips_to_disk() {
    let ant_home = tempfile::tempdir().unwrap();
    fake_ant(ant_home.path(), "exit 0");
    let h = harness();

    let config = StepConfig::new("<antcall target=\"extra\"/>")
        .with_extended_script_source("<target name=\"extra\"><echo/></target>")
        .with_script_name("main")
        .with_ant_home(ant_home.path());
    let executor = BuildStepExecutor::new(config, h.context.clone());

    executor.execute().await.unwrap();

    let document = fs::read_to_string(h.workspace.path().join(BUILD_FILE_NAME)).unwrap();
    assert!(document.contains("default=\"main\""));
    let main_close = document.find("</target>").unwrap();
    let extra = document.find("<target name=\"extra\">").unwrap();
    assert!(main_close < extra);
}

#[tokio::test]
async fn ant_home_env_var_used_when_nothing_configured() {
    let ambient = tempfile::tempdir().unwrap();
    fake_ant(ambient.path(), "exit 0");
    let h = harness();
    let mut context = h.context.clone();
    context.ambient_env = HashMap::from([(
        "ANT_HOME".to_string(),
        ambient.path().display().to_string(),
    )]);

    let config = StepConfig::new("<echo/>");
    let executor = BuildStepExecutor::new(config, context);

    let invocation = executor.assemble_invocation().unwrap();
    assert_eq!(
        PathBuf::from(&invocation.args.to_args()[0]),
        ambient.path().join("bin/ant")
    );
}
