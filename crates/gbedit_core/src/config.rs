use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};

pub const CONFIG_FILE_NAME: &str = "gbedit.toml";

/// Project layout conventions. Every key is optional in `gbedit.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub source_dir: PathBuf,
    pub source_extension: String,
    /// File whose presence marks a directory as a project root.
    pub build_marker: PathBuf,
    pub sprite_header: PathBuf,
    pub clipdata_header: PathBuf,
    pub build_command: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            source_extension: "c".to_string(),
            build_marker: PathBuf::from("Makefile"),
            sprite_header: PathBuf::from("include/sprite.h"),
            clipdata_header: PathBuf::from("include/bg_clip.h"),
            build_command: vec!["make".to_string(), "-j".to_string()],
        }
    }
}

impl ProjectConfig {
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        toml::from_str(text).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Config,
                format!("invalid project config: {e}"),
            )
        })
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = fs::read_to_string(path).map_err(|e| CoreError::io("read", path, e))?;
        Self::parse(&text).map_err(|e| {
            CoreError::new(e.code, format!("{}: {}", path.display(), e.message))
        })
    }

    /// Reads `<root>/gbedit.toml`, falling back to defaults when absent.
    pub fn load_for_root(root: &Path) -> Result<Self, CoreError> {
        let path = root.join(CONFIG_FILE_NAME);
        match fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text).map_err(|e| {
                CoreError::new(e.code, format!("{}: {}", path.display(), e.message))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(CoreError::io("read", &path, e)),
        }
    }
}
