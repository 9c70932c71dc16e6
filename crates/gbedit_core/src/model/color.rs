use std::fmt;

use serde::{Deserialize, Serialize};

const PALETTE_MACRO: &str = "MAKE_PALETTE(";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Color {
    #[default]
    White,
    LightGrey,
    DarkGrey,
    Black,
    /// Render-only: sprite colour 0. Never produced by the palette decoder.
    Transparent,
}

pub type Palette = [Color; 4];

pub const DEFAULT_PALETTE: Palette = [
    Color::White,
    Color::LightGrey,
    Color::DarkGrey,
    Color::Black,
];

impl Color {
    /// Unrecognised names fall back to white.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "COLOR_WHITE" => Self::White,
            "COLOR_LIGHT_GRAY" => Self::LightGrey,
            "COLOR_DARK_GRAY" => Self::DarkGrey,
            "COLOR_BLACK" => Self::Black,
            _ => Self::White,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Self::White | Self::Transparent => "COLOR_WHITE",
            Self::LightGrey => "COLOR_LIGHT_GRAY",
            Self::DarkGrey => "COLOR_DARK_GRAY",
            Self::Black => "COLOR_BLACK",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::White => "White",
            Self::LightGrey => "Light grey",
            Self::DarkGrey => "Dark grey",
            Self::Black => "Black",
            Self::Transparent => "Transparent",
        }
    }

    /// Packed as 0xRRGGBBAA.
    pub fn rgba(&self) -> u32 {
        match *self {
            Self::White => 0xFFFF_FFFF,
            Self::LightGrey => 0xC0C0_C0FF,
            Self::DarkGrey => 0x8080_80FF,
            Self::Black => 0x0000_00FF,
            Self::Transparent => 0x0000_0000,
        }
    }

    pub fn as_vec4(&self) -> [f32; 4] {
        let packed = self.rgba();
        [
            ((packed >> 24) & 0xFF) as f32 / 255.0,
            ((packed >> 16) & 0xFF) as f32 / 255.0,
            ((packed >> 8) & 0xFF) as f32 / 255.0,
            (packed & 0xFF) as f32 / 255.0,
        ]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes `MAKE_PALETTE(A, B, C, D)`. Returns `None` when the token is not a
/// four-argument palette macro; individual names are never rejected.
pub fn parse_palette(token: &str) -> Option<Palette> {
    let token = token.trim();
    let inner = token.strip_prefix(PALETTE_MACRO)?;
    let inner = inner.strip_suffix(')')?;

    let names: Vec<&str> = inner.split(',').collect();
    if names.len() != 4 {
        return None;
    }

    let mut palette = DEFAULT_PALETTE;
    for (slot, name) in palette.iter_mut().zip(names) {
        *slot = Color::from_name(name);
    }
    Some(palette)
}

pub fn make_palette(palette: &Palette) -> String {
    format!(
        "{PALETTE_MACRO}{}, {}, {}, {})",
        palette[0].name(),
        palette[1].name(),
        palette[2].name(),
        palette[3].name()
    )
}
