use std::path::Path;
use std::process::Command;

use crate::config::ProjectConfig;
use crate::loader;
use crate::surgeon::{self, SaveSummary};

use super::error::{CoreError, CoreErrorCode};
use super::project::Project;

/// Entry point for opening projects. Holds an optional configuration that
/// replaces whatever `gbedit.toml` the project carries.
#[derive(Debug, Default, Clone)]
pub struct Engine {
    config: Option<ProjectConfig>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    pub fn open_project<P: AsRef<Path>>(&self, root: P) -> Result<Project, CoreError> {
        let root = root.as_ref();
        loader::check_root_directory(root)?;
        let config = match &self.config {
            Some(config) => config.clone(),
            None => ProjectConfig::load_for_root(root)?,
        };
        loader::parse_project(root, config)
    }
}

impl Project {
    /// Writes every asset back to its source file.
    pub fn save(&self) -> Result<SaveSummary, CoreError> {
        surgeon::save_project(self)
    }

    /// Runs the configured build command in the project root. `Ok(false)`
    /// means the build ran and failed.
    pub fn build(&self) -> Result<bool, CoreError> {
        let Some((program, args)) = self.config().build_command.split_first() else {
            return Err(CoreError::new(
                CoreErrorCode::Config,
                "build_command is empty",
            ));
        };

        tracing::info!(command = ?self.config().build_command, "running build");
        let status = Command::new(program)
            .args(args)
            .current_dir(self.root())
            .status()
            .map_err(|e| CoreError::io("run", Path::new(program), e))?;

        if !status.success() {
            tracing::warn!(%status, "build failed");
        }
        Ok(status.success())
    }
}
