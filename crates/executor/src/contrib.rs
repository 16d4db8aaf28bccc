//! Supplemental ant-contrib task library staging

use antx_errors::{Result, StepError};
use antx_events::{AppEvent, EventEmitter, StepEvent};
use std::path::Path;

use crate::context::StepContext;

/// Jar file name inside the staged library directory
pub const CONTRIB_JAR: &str = "ant-contrib.jar";

/// Workspace-local library directory passed to `-lib`
pub const LIB_DIR: &str = "antlib";

/// Copy the ant-contrib jar from its source into the per-build `antlib/`
/// directory, returning the directory name for the `-lib` argument.
///
/// Each build stages into its own workspace, so concurrent builds never
/// share a target path and the copy is safe to repeat.
///
/// # Errors
///
/// Returns `StepError::LibraryStagingFailed` when the directory cannot be
/// created or the jar cannot be copied.
pub async fn stage(ctx: &StepContext, source: &Path) -> Result<&'static str> {
    let lib_dir = ctx.workspace.join(LIB_DIR);
    let staged = |e: std::io::Error| StepError::LibraryStagingFailed {
        library: CONTRIB_JAR.to_string(),
        message: e.to_string(),
    };

    tokio::fs::create_dir_all(&lib_dir).await.map_err(staged)?;
    tokio::fs::copy(source, lib_dir.join(CONTRIB_JAR))
        .await
        .map_err(staged)?;

    ctx.emit(AppEvent::Step(StepEvent::LibraryStaged {
        session_id: ctx.session_id.clone(),
        library: CONTRIB_JAR.to_string(),
        directory: lib_dir,
    }));

    Ok(LIB_DIR)
}
