//! Build file synthesis
//!
//! Wraps the user's script fragment into a minimal well-formed Ant project
//! with a single default target. The fragment is embedded verbatim: no XML
//! escaping is applied, so a fragment containing the target's closing
//! sequence produces a malformed document rather than an error.

use antx_errors::{Error, Result};
use antx_events::{AppEvent, EventEmitter, StepEvent};
use std::path::PathBuf;

use crate::context::StepContext;

/// File name of the synthesized build file in the workspace
pub const BUILD_FILE_NAME: &str = "antx_build.xml";

/// Fallback target name when the step has no script name
pub const DEFAULT_TARGET: &str = "antx_step";

const BEGIN_SOURCE: &str = "<!-- begin script source -->";
const END_SOURCE: &str = "<!-- end script source -->";
const BEGIN_EXTENDED: &str = "<!-- begin extended script source -->";
const END_EXTENDED: &str = "<!-- end extended script source -->";

/// Synthesize the build document text
///
/// The primary fragment becomes the body of the default target; a non-blank
/// extended fragment is appended after the target's close, at the document's
/// top level, so it may hold sibling targets and macro definitions.
#[must_use]
pub fn synthesize(
    script_source: &str,
    extended_script_source: Option<&str>,
    script_name: Option<&str>,
) -> String {
    let target = match script_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => DEFAULT_TARGET,
    };

    let mut doc = String::new();
    doc.push_str(&format!(
        "<project default=\"{target}\" xmlns:antcontrib=\"antlib:net.sf.antcontrib\" basedir=\".\">\n"
    ));
    doc.push_str(&format!("<target name=\"{target}\">\n"));
    doc.push_str(BEGIN_SOURCE);
    doc.push('\n');
    doc.push_str(script_source);
    doc.push('\n');
    doc.push_str(END_SOURCE);
    doc.push('\n');
    doc.push_str("</target>\n");

    if let Some(extended) = extended_script_source {
        if !extended.trim().is_empty() {
            doc.push_str(BEGIN_EXTENDED);
            doc.push('\n');
            doc.push_str(extended);
            doc.push('\n');
            doc.push_str(END_EXTENDED);
            doc.push('\n');
        }
    }

    doc.push_str("</project>\n");
    doc
}

/// Write the build document into the workspace and its durable audit copy
/// into the record directory, returning the workspace path.
///
/// # Errors
///
/// Returns an I/O error (with the failing path) if either write fails.
pub async fn write(ctx: &StepContext, document: &str) -> Result<PathBuf> {
    let build_file = ctx.workspace.join(BUILD_FILE_NAME);
    tokio::fs::write(&build_file, document)
        .await
        .map_err(|e| Error::io_with_path(&e, &build_file))?;

    // Audit copy: the script that actually ran stays inspectable after the
    // workspace is wiped.
    let record_copy = ctx.record_dir.join(BUILD_FILE_NAME);
    tokio::fs::write(&record_copy, document)
        .await
        .map_err(|e| Error::io_with_path(&e, &record_copy))?;

    ctx.emit(AppEvent::Step(StepEvent::BuildFileWritten {
        session_id: ctx.session_id.clone(),
        path: build_file.clone(),
        record_copy,
    }));

    Ok(build_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_body_appears_verbatim_between_markers() {
        let doc = synthesize("<echo message='hi'/>", None, None);
        let begin = doc.find(BEGIN_SOURCE).unwrap();
        let end = doc.find(END_SOURCE).unwrap();
        assert!(begin < end);
        assert!(doc[begin..end].contains("<echo message='hi'/>"));
        assert_eq!(doc.matches("<target ").count(), 1);
        assert!(doc.contains(&format!("default=\"{DEFAULT_TARGET}\"")));
    }

    #[test]
    fn script_name_overrides_default_target() {
        let doc = synthesize("<echo/>", None, Some("deploy"));
        assert!(doc.contains("default=\"deploy\""));
        assert!(doc.contains("<target name=\"deploy\">"));
    }

    #[test]
    fn blank_script_name_falls_back() {
        let doc = synthesize("<echo/>", None, Some("   "));
        assert!(doc.contains(&format!("<target name=\"{DEFAULT_TARGET}\">")));
    }

    #[test]
    fn blank_extended_source_leaves_no_markers() {
        for extended in [None, Some(""), Some("   \n\t")] {
            let doc = synthesize("<echo/>", extended, None);
            assert!(!doc.contains(BEGIN_EXTENDED));
            assert!(!doc.contains(END_EXTENDED));
        }
    }

    #[test]
    fn extended_source_follows_primary_target() {
        let doc = synthesize("<echo/>", Some("<target name=\"other\"/>"), None);
        let target_close = doc.find("</target>").unwrap();
        let extended = doc.find(BEGIN_EXTENDED).unwrap();
        let project_close = doc.find("</project>").unwrap();
        assert!(target_close < extended);
        assert!(extended < project_close);
        assert_eq!(doc.matches(BEGIN_EXTENDED).count(), 1);
    }

    #[tokio::test]
    async fn write_places_workspace_and_record_copies() {
        let workspace = tempfile::tempdir().unwrap();
        let record = tempfile::tempdir().unwrap();
        let ctx = StepContext::new(
            "job".into(),
            workspace.path().to_path_buf(),
            record.path().to_path_buf(),
        );

        let doc = synthesize("<echo/>", None, None);
        let path = write(&ctx, &doc).await.unwrap();

        assert_eq!(path, workspace.path().join(BUILD_FILE_NAME));
        let copy = std::fs::read_to_string(record.path().join(BUILD_FILE_NAME)).unwrap();
        assert_eq!(copy, doc);
    }

    #[tokio::test]
    async fn write_failure_carries_path() {
        let workspace = tempfile::tempdir().unwrap();
        let ctx = StepContext::new(
            "job".into(),
            workspace.path().to_path_buf(),
            PathBuf::from("/nonexistent/record/dir"),
        );

        let err = write(&ctx, "<project/>").await.unwrap_err();
        assert!(matches!(err, Error::Io { path: Some(_), .. }));
    }
}
