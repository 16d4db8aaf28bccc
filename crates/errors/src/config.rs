//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("{path} is not a directory")]
    NotADirectory { path: String },

    #[error("{path} does not contain an ant executable")]
    MissingExecutable { path: String },

    #[error("{path} does not look like an Ant home (lib/ant.jar not found)")]
    NotAnAntHome { path: String },

    #[error("unknown installation: {name}")]
    UnknownInstallation { name: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotADirectory { .. }
            | Self::MissingExecutable { .. }
            | Self::NotAnAntHome { .. } => {
                Some("Point the home directory at the root of an Apache Ant installation.")
            }
            Self::UnknownInstallation { .. } => {
                Some("Register the installation in the tool registry or pick an existing name.")
            }
            Self::Invalid { .. } | Self::MissingField { .. } => {
                Some("Fix the step configuration value and retry the build.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Invalid { .. } => "config.invalid",
            Self::MissingField { .. } => "config.missing_field",
            Self::NotADirectory { .. } => "config.not_a_directory",
            Self::MissingExecutable { .. } => "config.missing_executable",
            Self::NotAnAntHome { .. } => "config.not_an_ant_home",
            Self::UnknownInstallation { .. } => "config.unknown_installation",
        };
        Some(code)
    }
}
