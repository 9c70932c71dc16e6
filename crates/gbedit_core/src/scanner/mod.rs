pub mod headers;
pub mod sections;

use std::io::BufRead;
use std::path::Path;

use crate::core_api::CoreError;
use crate::model::{
    Animation, CollisionTable, Door, DoorData, Graphics, Physics, Room, SpriteData, Tilemap,
};
use crate::reader::LineReader;
use crate::symbols::SymbolKind;

use sections::{
    decode_animation, decode_collision_table, decode_collision_table_array, decode_door_data,
    decode_doors, decode_graphics_array, decode_physics, decode_rooms, decode_sprite_data,
    decode_tilesets,
};

/// One recognised asset declaration, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Graphics { name: String, graphics: Graphics },
    Tilemap { name: String, tilemap: Tilemap },
    Rooms { name: String, rooms: Vec<Room> },
    SpriteData { name: String, sprites: Vec<SpriteData> },
    Animation { name: String, animation: Animation },
    DoorData { name: String, doors: DoorData },
    Doors { name: String, doors: Vec<Door> },
    Tilesets { name: String, tilesets: Vec<String> },
    CollisionTable { name: String, table: CollisionTable },
    CollisionTableArray { name: String, tables: Vec<String> },
    Physics(Physics),
}

impl Declaration {
    /// Symbol name and kind, or `None` for the unnamed physics block.
    pub fn symbol(&self) -> Option<(&str, SymbolKind)> {
        let symbol = match self {
            Self::Graphics { name, .. } => (name, SymbolKind::Graphics),
            Self::Tilemap { name, .. } => (name, SymbolKind::Tilemap),
            Self::Rooms { name, .. } => (name, SymbolKind::RoomData),
            Self::SpriteData { name, .. } => (name, SymbolKind::SpriteData),
            Self::Animation { name, .. } => (name, SymbolKind::Animation),
            Self::DoorData { name, .. } => (name, SymbolKind::DoorData),
            Self::Doors { name, .. } => (name, SymbolKind::Doors),
            Self::Tilesets { name, .. } => (name, SymbolKind::Tilesets),
            Self::CollisionTable { name, .. } => (name, SymbolKind::CollisionTable),
            Self::CollisionTableArray { name, .. } => (name, SymbolKind::CollisionTableArray),
            Self::Physics(_) => return None,
        };
        Some((symbol.0.as_str(), symbol.1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    GraphicsArray,
    Rooms,
    SpriteData,
    Animation,
    DoorData,
    Doors,
    Tilesets,
    CollisionTable,
    CollisionTableArray,
    Physics,
}

pub const PHYSICS_MARKER: &str = "static void PlayerInitPhysics";

/// First matching predicate wins; anything else is passthrough text.
fn classify(line: &str) -> Option<Handler> {
    if line.contains("extern") {
        return None;
    }
    if sections::is_forward_declaration(line) {
        return None;
    }
    if line.starts_with(PHYSICS_MARKER) {
        return Some(Handler::Physics);
    }

    if line.starts_with("const u8 ") && (line.contains("Graphics") || line.contains("Tilemap")) {
        Some(Handler::GraphicsArray)
    } else if line.starts_with("const struct RoomInfo") {
        Some(Handler::Rooms)
    } else if line.starts_with("const struct RoomSprite") {
        Some(Handler::SpriteData)
    } else if line.starts_with("static const u8") && line.contains(sections::FRAME_MARKER) {
        Some(Handler::Animation)
    } else if line.starts_with("const u8 ") && line.contains("DoorData") {
        Some(Handler::DoorData)
    } else if line.starts_with("const struct Door ") {
        Some(Handler::Doors)
    } else if line.starts_with("const u8* const sTilesets") {
        Some(Handler::Tilesets)
    } else if line.starts_with("const u8 sCollisionTable_") {
        Some(Handler::CollisionTable)
    } else if line.starts_with("const u8* const sCollisionTables") {
        Some(Handler::CollisionTableArray)
    } else {
        None
    }
}

/// Runs the dispatch loop over one source stream and returns every
/// declaration it recognised, in file order.
pub fn scan_declarations<R: BufRead>(
    reader: R,
    path: &Path,
) -> Result<Vec<Declaration>, CoreError> {
    let mut r = LineReader::new(reader, path);
    let mut declarations = Vec::new();

    while let Some(line) = r.next_line()? {
        let Some(handler) = classify(&line) else {
            continue;
        };
        let declaration = match handler {
            Handler::GraphicsArray => decode_graphics_array(&mut r, &line)?,
            Handler::Rooms => decode_rooms(&mut r, &line)?,
            Handler::SpriteData => decode_sprite_data(&mut r, &line)?,
            Handler::Animation => decode_animation(&mut r, &line)?,
            Handler::DoorData => decode_door_data(&mut r, &line)?,
            Handler::Doors => decode_doors(&mut r, &line)?,
            Handler::Tilesets => decode_tilesets(&mut r, &line)?,
            Handler::CollisionTable => decode_collision_table(&mut r, &line)?,
            Handler::CollisionTableArray => decode_collision_table_array(&mut r, &line)?,
            Handler::Physics => decode_physics(&mut r)?,
        };
        if let Some((name, kind)) = declaration.symbol() {
            tracing::debug!(file = %path.display(), symbol = name, %kind, "decoded symbol");
        }
        declarations.push(declaration);
    }

    Ok(declarations)
}

pub fn scan_str(text: &str, path: &Path) -> Result<Vec<Declaration>, CoreError> {
    scan_declarations(text.as_bytes(), path)
}

#[cfg(test)]
mod tests {
    use super::{Handler, classify};

    #[test]
    fn classification_follows_declaration_prefixes() {
        assert_eq!(
            classify("const u8 sRoom0_Graphics[] = {"),
            Some(Handler::GraphicsArray)
        );
        assert_eq!(
            classify("const u8 sRoom0_Tilemap[] = {"),
            Some(Handler::GraphicsArray)
        );
        assert_eq!(classify("const u8 sRoom0_DoorData[] = {"), Some(Handler::DoorData));
        assert_eq!(classify("const struct Door sDoors[] = {"), Some(Handler::Doors));
        assert_eq!(
            classify("static const u8 sIdle_Frame0[OAM_DATA_SIZE(1)] = {"),
            Some(Handler::Animation)
        );
        assert_eq!(
            classify("static void PlayerInitPhysics(void)"),
            Some(Handler::Physics)
        );
    }

    #[test]
    fn externs_and_forward_declarations_pass_through() {
        assert_eq!(classify("extern const u8 sRoom0_Graphics[];"), None);
        assert_eq!(classify("const u8 sRoom0_Graphics[];"), None);
        assert_eq!(classify("#include \"rooms.h\""), None);
        assert_eq!(classify("const struct DoorInfo sInfo[] = {"), None);
        assert_eq!(classify("static void PlayerInitPhysics(void);"), None);
    }
}
