//! Step configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named Ant installation from the host's tool registry
///
/// The registry is authoritative: a selected installation is used as-is,
/// already adapted to the current node and environment by the host.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolInstallation {
    /// Registry name of the installation
    pub name: String,
    /// Installation root (contains `bin/ant` and `lib/ant.jar`)
    pub home: PathBuf,
}

/// Configuration of a single build step
///
/// Field values arrive pre-expanded from the host; the executor never does
/// macro/token expansion on them (`ant_opts` is the one exception, expanded
/// against the resolved environment).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StepConfig {
    /// Ant script fragment forming the body of the generated default target
    pub script_source: String,
    /// Additional top-level content appended after the default target
    pub extended_script_source: Option<String>,
    /// Name for the generated default target (fallback used when empty)
    pub script_name: Option<String>,
    /// `key=value` property lines passed as `-D` arguments
    pub properties: Option<String>,
    /// Home-directory override typed into the step configuration
    pub ant_home: Option<PathBuf>,
    /// Named installation selected for this step
    pub installation: Option<ToolInstallation>,
    /// Extra JVM options, stored under ANT_OPTS after expansion
    pub ant_opts: Option<String>,
    /// Emit tier-by-tier resolution diagnostics
    pub verbose: bool,
    /// Pass `-emacs` for plain, unadorned tool output
    pub plain_output: bool,
    /// Stage ant-contrib.jar and pass `-lib`
    pub use_ant_contrib: bool,
    /// Where to copy ant-contrib.jar from when staging is enabled
    pub contrib_source: Option<PathBuf>,
}

impl StepConfig {
    /// Create a configuration for the given script fragment
    #[must_use]
    pub fn new(script_source: impl Into<String>) -> Self {
        Self {
            script_source: script_source.into(),
            ..Self::default()
        }
    }

    /// Set the extended script source
    #[must_use]
    pub fn with_extended_script_source(mut self, source: impl Into<String>) -> Self {
        self.extended_script_source = Some(source.into());
        self
    }

    /// Set the generated target name
    #[must_use]
    pub fn with_script_name(mut self, name: impl Into<String>) -> Self {
        self.script_name = Some(name.into());
        self
    }

    /// Set the property lines
    #[must_use]
    pub fn with_properties(mut self, properties: impl Into<String>) -> Self {
        self.properties = Some(properties.into());
        self
    }

    /// Set the home-directory override
    #[must_use]
    pub fn with_ant_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.ant_home = Some(home.into());
        self
    }

    /// Select a named installation
    #[must_use]
    pub fn with_installation(mut self, installation: ToolInstallation) -> Self {
        self.installation = Some(installation);
        self
    }

    /// Set extra JVM options
    #[must_use]
    pub fn with_ant_opts(mut self, opts: impl Into<String>) -> Self {
        self.ant_opts = Some(opts.into());
        self
    }

    /// Enable verbose resolution diagnostics
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Request plain (`-emacs`) output
    #[must_use]
    pub fn with_plain_output(mut self, plain: bool) -> Self {
        self.plain_output = plain;
        self
    }

    /// Enable ant-contrib staging from the given source jar
    #[must_use]
    pub fn with_ant_contrib(mut self, source: impl Into<PathBuf>) -> Self {
        self.use_ant_contrib = true;
        self.contrib_source = Some(source.into());
        self
    }
}
