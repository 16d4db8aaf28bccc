use serde::{Deserialize, Serialize};

use antx_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Optional stable error code once taxonomy lands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

// Declare all domain modules
pub mod general;
pub mod step;

// Re-export all domain events
pub use general::*;
pub use step::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (info, warnings, errors, debug)
    General(GeneralEvent),

    /// Build-step events (build file, tool resolution, process lifecycle)
    Step(StepEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            // Error-level events
            Self::General(GeneralEvent::Error { .. })
            | Self::Step(StepEvent::Failed { .. }) => Level::ERROR,

            // Warning-level events
            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,

            // Debug-level events (diagnostics, raw tool output)
            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Step(StepEvent::Output { .. } | StepEvent::EnvironmentChanged { .. }) => {
                Level::DEBUG
            }

            // Default to INFO for most events
            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "antx::events::general",
            Self::Step(_) => "antx::events::step",
        }
    }
}
