use serde::{Deserialize, Serialize};

pub const OAM_FLAG_PRIORITY: u8 = 0x80;
pub const OAM_FLAG_Y_FLIP: u8 = 0x40;
pub const OAM_FLAG_X_FLIP: u8 = 0x20;
pub const OAM_FLAG_PALETTE: u8 = 0x10;

/// One hardware sprite of a frame, relative to the sprite origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OamEntry {
    pub y: i8,
    pub x: i8,
    pub tile_index: u8,
    pub properties: u8,
}

impl OamEntry {
    pub fn behind_background(&self) -> bool {
        self.properties & OAM_FLAG_PRIORITY != 0
    }

    pub fn y_flip(&self) -> bool {
        self.properties & OAM_FLAG_Y_FLIP != 0
    }

    pub fn x_flip(&self) -> bool {
        self.properties & OAM_FLAG_X_FLIP != 0
    }

    /// 0 selects OBP0, 1 selects OBP1.
    pub fn palette(&self) -> u8 {
        u8::from(self.properties & OAM_FLAG_PALETTE != 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub oam: Vec<OamEntry>,
    /// Timer ticks the frame stays on screen.
    pub duration: u8,
}

pub type Animation = Vec<AnimationFrame>;
