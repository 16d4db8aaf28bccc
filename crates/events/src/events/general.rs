use serde::{Deserialize, Serialize};

/// General utility events for log lines that belong to no step phase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Informational message rendered in the build log by default
    Info { message: String },

    /// Generic warning message
    Warning { message: String },

    /// Generic error message
    Error { message: String },

    /// Debug logging, rendered only when debug output is enabled
    DebugLog { message: String },
}

impl GeneralEvent {
    /// Create an info event
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    /// Create a warning event
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Create an error event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Create a debug log event
    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
        }
    }
}
