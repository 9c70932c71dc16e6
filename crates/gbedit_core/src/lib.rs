pub mod config;
pub mod core_api;
pub mod emitter;
pub mod layout;
pub mod loader;
pub mod model;
pub mod reader;
pub mod scanner;
pub mod surgeon;
pub mod symbols;

pub use config::ProjectConfig;
pub use core_api::{CoreError, CoreErrorCode, Engine, Project};
pub use symbols::{SymbolInfo, SymbolKind};
