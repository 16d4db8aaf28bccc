//! Ant installation resolution
//!
//! Decides which installation (home directory + executable) a step runs
//! with. Precedence, highest first: named installation, typed-in home
//! override, ambient ANT_HOME, bare `ant` on the search path.

use antx_errors::{ConfigError, Error, Result, StepError};
use antx_events::{AppEvent, EventEmitter, StepEvent, ToolSource};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::StepConfig;
use crate::context::StepContext;
use crate::environment::ANT_HOME_VAR;

/// Marker file proving a directory is a genuine Ant installation
const MARKER_JAR: &str = "lib/ant.jar";

/// The Ant installation chosen for one invocation
#[derive(Clone, Debug)]
pub struct ResolvedTool {
    /// Installation root, if one was chosen (None for search-path fallback)
    pub home: Option<PathBuf>,
    /// Executable to launch
    pub executable: PathBuf,
    /// Which tier produced this resolution
    pub source: ToolSource,
}

/// Relative path of the Ant launcher inside an installation
#[must_use]
pub fn executable_rel_path() -> &'static str {
    if cfg!(windows) {
        "bin/ant.bat"
    } else {
        "bin/ant"
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Validity invariant: the launcher exists and is executable, and the marker
/// library proves this is an installation rather than an arbitrary path.
fn is_valid_home(home: &Path) -> bool {
    is_executable(&home.join(executable_rel_path())) && home.join(MARKER_JAR).is_file()
}

/// Standalone home-directory validation for the host's configuration screen.
///
/// # Errors
///
/// Returns a `ConfigError` naming the first failed check; non-fatal on the
/// host side, the step itself falls through to the next resolution tier.
pub fn check_home(home: &Path) -> std::result::Result<(), ConfigError> {
    if !home.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: home.display().to_string(),
        });
    }
    if !is_executable(&home.join(executable_rel_path())) {
        return Err(ConfigError::MissingExecutable {
            path: home.display().to_string(),
        });
    }
    if !home.join(MARKER_JAR).is_file() {
        return Err(ConfigError::NotAnAntHome {
            path: home.display().to_string(),
        });
    }
    Ok(())
}

/// Resolve the installation for this invocation.
///
/// `env` is the merged build environment (ambient plus build variables), the
/// same map the child will eventually receive.
///
/// # Errors
///
/// Returns `StepError::ToolNotFound` when every tier comes up empty.
pub fn resolve(
    config: &StepConfig,
    env: &HashMap<String, String>,
    ctx: &StepContext,
) -> Result<ResolvedTool> {
    let verbose = config.verbose;

    if let Some(installation) = &config.installation {
        // Registry is authoritative, no validity check here
        let tool = ResolvedTool {
            executable: installation.home.join(executable_rel_path()),
            home: Some(installation.home.clone()),
            source: ToolSource::Installation,
        };
        emit_resolved(ctx, &tool);
        return Ok(tool);
    }

    let mut candidate: Option<PathBuf> = None;

    match env.get(ANT_HOME_VAR).filter(|v| !v.is_empty()) {
        Some(value) if is_valid_home(Path::new(value)) => {
            if verbose {
                ctx.emit_debug(format!("ANT_HOME found in environment: {value}"));
            }
            candidate = Some(PathBuf::from(value));
        }
        _ => {
            if verbose {
                ctx.emit_debug("no usable ANT_HOME in the environment");
            }
        }
    }

    if let Some(home) = &config.ant_home {
        if is_valid_home(home) {
            let old = candidate
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string());
            // Always announced: the override silently shadowing an ambient
            // ANT_HOME is the classic misconfiguration to diagnose
            ctx.emit_info(format!(
                "replacing ANT_HOME \"{old}\" with configured \"{}\"",
                home.display()
            ));
            candidate = Some(home.clone());
        } else if verbose {
            ctx.emit_warning(format!(
                "configured Ant home {} failed validation, ignoring it",
                home.display()
            ));
        }
    }

    let (home, source) = match (candidate, config.ant_home.is_some()) {
        (Some(home), true) if Some(&home) == config.ant_home.as_ref() => {
            (home, ToolSource::HomeOverride)
        }
        (Some(home), _) => (home, ToolSource::Environment),
        (None, _) => {
            // Last resort: the search path of the merged build environment
            let exe_name = if cfg!(windows) { "ant.bat" } else { "ant" };
            let Ok(found) = which::which_in(exe_name, env.get("PATH"), &ctx.workspace) else {
                return Err(Error::Step(StepError::ToolNotFound));
            };
            if verbose {
                ctx.emit_debug(format!("using ant from search path: {}", found.display()));
            }
            let tool = ResolvedTool {
                home: None,
                executable: found,
                source: ToolSource::SearchPath,
            };
            emit_resolved(ctx, &tool);
            return Ok(tool);
        }
    };

    let tool = ResolvedTool {
        executable: home.join(executable_rel_path()),
        home: Some(home),
        source,
    };
    emit_resolved(ctx, &tool);
    Ok(tool)
}

fn emit_resolved(ctx: &StepContext, tool: &ResolvedTool) {
    ctx.emit(AppEvent::Step(StepEvent::ToolResolved {
        session_id: ctx.session_id.clone(),
        executable: tool.executable.clone(),
        home: tool.home.clone(),
        source: tool.source,
    }));
}
