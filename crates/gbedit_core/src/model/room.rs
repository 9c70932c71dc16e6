use serde::{Deserialize, Serialize};

use super::color::{DEFAULT_PALETTE, Palette};

/// One entry of the room info table. Asset fields are symbol names, not
/// owned values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub tilemap: String,
    pub palette: Palette,
    pub sprite_data: String,
    pub door_data: String,
    pub collision_table: u8,
    pub origin_x: u8,
    pub origin_y: u8,
}

impl Room {
    pub fn new(
        tilemap: impl Into<String>,
        sprite_data: impl Into<String>,
        door_data: impl Into<String>,
    ) -> Self {
        Self {
            tilemap: tilemap.into(),
            palette: DEFAULT_PALETTE,
            sprite_data: sprite_data.into(),
            door_data: door_data.into(),
            collision_table: 0,
            origin_x: 0,
            origin_y: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteData {
    pub x: u8,
    pub y: u8,
    /// Enumerator from `enum SpriteType`.
    pub id: String,
    pub part: u8,
}

impl SpriteData {
    pub fn new(x: u8, y: u8, id: impl Into<String>, part: u8) -> Self {
        Self {
            x,
            y,
            id: id.into(),
            part,
        }
    }
}
