pub mod animation;
pub mod color;
pub mod door;
pub mod graphics;
pub mod physics;
pub mod room;
pub mod tilemap;

pub use animation::{Animation, AnimationFrame, OamEntry};
pub use color::{Color, DEFAULT_PALETTE, Palette};
pub use door::{DOOR_TARGET_NONE, Door, DoorData, TILESET_NONE};
pub use graphics::{Graphics, TILE_BYTES, TILE_PIXELS};
pub use physics::Physics;
pub use room::{Room, SpriteData};
pub use tilemap::Tilemap;

/// One clip-data enumerator name per tile index of the matching graphics.
pub type CollisionTable = Vec<String>;
