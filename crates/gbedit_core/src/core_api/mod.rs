mod engine;
mod error;
pub mod history;
mod project;

pub use engine::Engine;
pub use error::{CoreError, CoreErrorCode};
pub use history::{Action, ActionQueue, AddTile, DeleteTile, EditTilemap, PlotPixels};
pub use project::{
    DEFAULT_FRAME_DURATION, DEFAULT_TILEMAP_HEIGHT, DEFAULT_TILEMAP_WIDTH, DoorDeletion, Project,
};
