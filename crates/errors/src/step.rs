//! Build-step execution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum StepError {
    #[error("no usable Ant installation found")]
    ToolNotFound,

    #[error("failed to launch {program}: {message}")]
    LaunchFailed { program: String, message: String },

    #[error("failed to write build file {path}: {message}")]
    SynthesisFailed { path: String, message: String },

    #[error("failed to stage {library}: {message}")]
    LibraryStagingFailed { library: String, message: String },

    #[error("output stream error: {message}")]
    OutputStreamFailed { message: String },

    #[error("step interrupted")]
    Interrupted,
}

impl UserFacingError for StepError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolNotFound => Some(
                "Set ANT_HOME in the step configuration or install Apache Ant globally on this node.",
            ),
            Self::LaunchFailed { .. } => Some(
                "Configure a global Ant installation, or select a named installation for this job.",
            ),
            Self::SynthesisFailed { .. } => {
                Some("Ensure the build workspace is writable and retry the build.")
            }
            Self::LibraryStagingFailed { .. } => {
                Some("Check the ant-contrib source path in the executor configuration.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::OutputStreamFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ToolNotFound => "step.tool_not_found",
            Self::LaunchFailed { .. } => "step.launch_failed",
            Self::SynthesisFailed { .. } => "step.synthesis_failed",
            Self::LibraryStagingFailed { .. } => "step.library_staging_failed",
            Self::OutputStreamFailed { .. } => "step.output_stream_failed",
            Self::Interrupted => "step.interrupted",
        };
        Some(code)
    }
}
