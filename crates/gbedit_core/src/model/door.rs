use serde::{Deserialize, Serialize};

/// `target_door` value of a door whose destination was deleted.
pub const DOOR_TARGET_NONE: u8 = 0xFF;
/// `tileset` value of a door that does not load a tileset.
pub const TILESET_NONE: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Door {
    pub x: u16,
    pub y: u16,
    pub owner_room: u8,
    pub height: u8,
    pub width: u8,
    /// Index into the project-wide door table.
    pub target_door: u8,
    pub exit_x: i8,
    pub exit_y: i8,
    /// Index into the tileset table, or [`TILESET_NONE`].
    pub tileset: u8,
}

impl Door {
    pub fn has_target(&self) -> bool {
        self.target_door != DOOR_TARGET_NONE
    }

    pub fn loads_tileset(&self) -> bool {
        self.tileset != TILESET_NONE
    }
}

/// Door indices belonging to one room.
pub type DoorData = Vec<u8>;
