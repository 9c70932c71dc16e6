use std::error::Error;
use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    InvalidProject,
    Config,
    Parse,
    OutOfRange,
    InvalidName,
    UnknownSymbol,
    InvalidHandle,
    UnsupportedOperation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn io(action: &str, path: &Path, err: io::Error) -> Self {
        Self::new(
            CoreErrorCode::Io,
            format!("failed to {action} {}: {err}", path.display()),
        )
    }

    pub fn unknown_symbol(name: &str) -> Self {
        Self::new(
            CoreErrorCode::UnknownSymbol,
            format!("symbol {name} is registered but has no value in the project"),
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}
