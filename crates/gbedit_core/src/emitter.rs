//! Text emitters, one per asset kind. Every emitter opens with a blank line
//! and ends with the closing `};` line, so appending them to a file keeps
//! one empty line between declarations.

use std::fmt::{self, Write};

use crate::core_api::{CoreError, CoreErrorCode, Project};
use crate::model::color::make_palette;
use crate::model::{
    Animation, CollisionTable, Door, DoorData, Graphics, Physics, Room, SpriteData, TILE_BYTES,
    Tilemap,
};
use crate::scanner::{Declaration, PHYSICS_MARKER};
use crate::scanner::sections::{
    DOOR_NONE, FRAME_MARKER, ORIGIN_X_SCALE, ORIGIN_Y_SCALE, PHYSICS_FIELDS, PHYSICS_OBJECT,
    ROOM_SPRITE_TERMINATOR, SPRITE_ANIM_TERMINATOR,
};
use crate::symbols::{SymbolInfo, SymbolKind};

const TAB: &str = "    ";

/// Renders the current value of `symbol` as C source.
pub fn emit_symbol(project: &Project, symbol: &SymbolInfo) -> Result<String, CoreError> {
    let name = symbol.name.as_str();
    let missing = || CoreError::unknown_symbol(name);
    let mut out = String::new();

    let written = match symbol.kind {
        SymbolKind::Graphics => {
            let graphics = project.graphics.get(name).ok_or_else(missing)?;
            emit_graphics(&mut out, name, graphics)
        }
        SymbolKind::Tilemap => {
            let tilemap = project.tilemaps.get(name).ok_or_else(missing)?;
            if !tilemap.is_rectangular() {
                return Err(CoreError::new(
                    CoreErrorCode::UnsupportedOperation,
                    format!("{name}: rows of different widths cannot be saved"),
                ));
            }
            emit_tilemap(&mut out, name, tilemap)
        }
        SymbolKind::SpriteData => {
            let sprites = project.sprites.get(name).ok_or_else(missing)?;
            emit_sprite_data(&mut out, name, sprites)
        }
        SymbolKind::DoorData => {
            let doors = project.door_data.get(name).ok_or_else(missing)?;
            emit_door_data(&mut out, name, doors)
        }
        SymbolKind::Animation => {
            let animation = project.animations.get(name).ok_or_else(missing)?;
            if animation.is_empty() {
                return Err(CoreError::new(
                    CoreErrorCode::UnsupportedOperation,
                    format!("{name}: an animation needs at least one frame"),
                ));
            }
            emit_animation(&mut out, name, animation)
        }
        SymbolKind::CollisionTable => {
            let table = project.collision_tables.get(name).ok_or_else(missing)?;
            emit_collision_table(&mut out, name, table)
        }
        SymbolKind::RoomData => emit_rooms(&mut out, name, &project.rooms),
        SymbolKind::Doors => emit_doors(&mut out, name, &project.doors),
        SymbolKind::Tilesets => emit_name_table(&mut out, name, &project.tilesets),
        SymbolKind::CollisionTableArray => {
            emit_name_table(&mut out, name, &project.collision_table_array)
        }
    };

    written.map_err(|_| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed to format {} {name}", symbol.kind),
        )
    })?;
    Ok(out)
}

/// Renders one declaration in the form the scanner decodes.
pub fn emit_declaration<W: Write>(out: &mut W, declaration: &Declaration) -> fmt::Result {
    match declaration {
        Declaration::Graphics { name, graphics } => emit_graphics(out, name, graphics),
        Declaration::Tilemap { name, tilemap } => emit_tilemap(out, name, tilemap),
        Declaration::Rooms { name, rooms } => emit_rooms(out, name, rooms),
        Declaration::SpriteData { name, sprites } => emit_sprite_data(out, name, sprites),
        Declaration::Animation { name, animation } => emit_animation(out, name, animation),
        Declaration::DoorData { name, doors } => emit_door_data(out, name, doors),
        Declaration::Doors { name, doors } => emit_doors(out, name, doors),
        Declaration::Tilesets { name, tilesets } => emit_name_table(out, name, tilesets),
        Declaration::CollisionTable { name, table } => emit_collision_table(out, name, table),
        Declaration::CollisionTableArray { name, tables } => emit_name_table(out, name, tables),
        Declaration::Physics(physics) => {
            writeln!(out, "\n{PHYSICS_MARKER}(void)\n{{")?;
            for line in physics_lines(physics) {
                writeln!(out, "{line}")?;
            }
            writeln!(out, "}}")
        }
    }
}

pub fn emit_graphics<W: Write>(out: &mut W, name: &str, graphics: &Graphics) -> fmt::Result {
    writeln!(out, "\nconst u8 {name}[] = {{")?;
    writeln!(out, "{TAB}{},\n", graphics.tile_count())?;
    for tile in graphics.as_bytes().chunks(TILE_BYTES) {
        let bytes: Vec<String> = tile.iter().map(|b| format!("{},", hex(*b))).collect();
        writeln!(out, "{TAB}{}", bytes.join(" "))?;
    }
    writeln!(out, "}};")
}

pub fn emit_tilemap<W: Write>(out: &mut W, name: &str, tilemap: &Tilemap) -> fmt::Result {
    writeln!(out, "\nconst u8 {name}[] = {{")?;
    writeln!(out, "{TAB}{}, {},\n", tilemap.width(), tilemap.height())?;
    for row in tilemap.rows() {
        let cells: String = row.iter().map(|b| format!("{},", hex(*b))).collect();
        writeln!(out, "{TAB}{cells}")?;
    }
    writeln!(out, "}};")
}

pub fn emit_sprite_data<W: Write>(out: &mut W, name: &str, sprites: &[SpriteData]) -> fmt::Result {
    writeln!(out, "\nconst struct RoomSprite {name}[] = {{")?;
    for (i, sprite) in sprites.iter().enumerate() {
        writeln!(out, "{TAB}[{i}] = {{")?;
        writeln!(out, "{TAB}{TAB}.x = {},", sprite.x)?;
        writeln!(out, "{TAB}{TAB}.y = {},", sprite.y)?;
        writeln!(out, "{TAB}{TAB}.id = {},", sprite.id)?;
        writeln!(out, "{TAB}{TAB}.part = {}", sprite.part)?;
        writeln!(out, "{TAB}}},")?;
    }
    writeln!(out, "{TAB}[{}] = {ROOM_SPRITE_TERMINATOR}", sprites.len())?;
    writeln!(out, "}};")
}

pub fn emit_door_data<W: Write>(out: &mut W, name: &str, doors: &DoorData) -> fmt::Result {
    writeln!(out, "\nconst u8 {name}[] = {{")?;
    for door in doors {
        writeln!(out, "{TAB}{door},")?;
    }
    writeln!(out, "{TAB}{DOOR_NONE}")?;
    writeln!(out, "}};")
}

/// Name of the OAM array holding frame `index` of animation `name`.
pub fn frame_array_name(name: &str, index: usize) -> String {
    format!("{name}{FRAME_MARKER}{index}")
}

pub fn emit_animation<W: Write>(out: &mut W, name: &str, animation: &Animation) -> fmt::Result {
    for (i, frame) in animation.iter().enumerate() {
        let count = frame.oam.len();
        writeln!(
            out,
            "\nstatic const u8 {}[OAM_DATA_SIZE({count})] = {{",
            frame_array_name(name, i)
        )?;
        writeln!(out, "{TAB}{count},")?;
        for oam in &frame.oam {
            writeln!(
                out,
                "{TAB}OAM_POS({}), OAM_POS({}), {}, {},",
                oam.y, oam.x, oam.tile_index, oam.properties
            )?;
        }
        writeln!(out, "}};")?;
    }

    writeln!(out, "\nconst struct AnimData {name}[] = {{")?;
    for (i, frame) in animation.iter().enumerate() {
        writeln!(out, "{TAB}[{i}] = {{")?;
        writeln!(out, "{TAB}{TAB}.oamPointer = {},", frame_array_name(name, i))?;
        writeln!(out, "{TAB}{TAB}.duration = {},", frame.duration)?;
        writeln!(out, "{TAB}}},")?;
    }
    writeln!(out, "{TAB}[{}] = {SPRITE_ANIM_TERMINATOR}", animation.len())?;
    writeln!(out, "}};")
}

pub fn emit_rooms<W: Write>(out: &mut W, name: &str, rooms: &[Room]) -> fmt::Result {
    writeln!(out, "\nconst struct RoomInfo {name}[] = {{")?;
    for (i, room) in rooms.iter().enumerate() {
        writeln!(out, "{TAB}[{i}] = {{")?;
        writeln!(out, "{TAB}{TAB}.tilemap = {},", room.tilemap)?;
        writeln!(out, "{TAB}{TAB}.bgPalette = {},", make_palette(&room.palette))?;
        writeln!(out, "{TAB}{TAB}.spriteData = {},", room.sprite_data)?;
        writeln!(out, "{TAB}{TAB}.doorData = {},", room.door_data)?;
        writeln!(out, "{TAB}{TAB}.collisionTable = {},", room.collision_table)?;
        writeln!(out, "{TAB}{TAB}.originX = {ORIGIN_X_SCALE} * {},", room.origin_x)?;
        writeln!(out, "{TAB}{TAB}.originY = {ORIGIN_Y_SCALE} * {},", room.origin_y)?;
        writeln!(out, "{TAB}}},")?;
    }
    writeln!(out, "}};")
}

pub fn emit_doors<W: Write>(out: &mut W, name: &str, doors: &[Door]) -> fmt::Result {
    writeln!(out, "\nconst struct Door {name}[] = {{")?;
    for (i, door) in doors.iter().enumerate() {
        writeln!(out, "{TAB}[{i}] = {{")?;
        writeln!(out, "{TAB}{TAB}.x = {},", door.x)?;
        writeln!(out, "{TAB}{TAB}.y = {},", door.y)?;
        writeln!(out, "{TAB}{TAB}.ownerRoom = {},", door.owner_room)?;
        writeln!(out, "{TAB}{TAB}.height = {},", door.height)?;
        writeln!(out, "{TAB}{TAB}.width = {},", door.width)?;
        writeln!(out, "{TAB}{TAB}.targetDoor = {},", door.target_door)?;
        writeln!(out, "{TAB}{TAB}.exitX = {},", door.exit_x)?;
        writeln!(out, "{TAB}{TAB}.exitY = {},", door.exit_y)?;
        writeln!(out, "{TAB}{TAB}.tileset = {},", door.tileset)?;
        writeln!(out, "{TAB}}},")?;
    }
    writeln!(out, "}};")
}

/// `const u8* const` tables: tilesets and the collision table array.
pub fn emit_name_table<W: Write>(out: &mut W, name: &str, entries: &[String]) -> fmt::Result {
    writeln!(out, "\nconst u8* const {name}[] = {{")?;
    for entry in entries {
        writeln!(out, "{TAB}{entry},")?;
    }
    writeln!(out, "}};")
}

pub fn emit_collision_table<W: Write>(
    out: &mut W,
    name: &str,
    table: &CollisionTable,
) -> fmt::Result {
    writeln!(out, "\nconst u8 {name}[] = {{")?;
    for clipdata in table {
        writeln!(out, "{TAB}{clipdata},")?;
    }
    writeln!(out, "}};")
}

/// The six assignment lines of the physics initializer body.
pub fn physics_lines(physics: &Physics) -> [String; 6] {
    let values = [
        i16::from(physics.x_acceleration),
        i16::from(physics.x_velocity_cap),
        i16::from(physics.y_velocity_cap),
        i16::from(physics.gravity_upwards),
        i16::from(physics.gravity_downwards),
        i16::from(physics.jumping_velocity),
    ];
    std::array::from_fn(|i| format!("{TAB}{PHYSICS_OBJECT}.{} = {};", PHYSICS_FIELDS[i], values[i]))
}

fn hex(byte: u8) -> String {
    format!("0x{byte:02X}")
}

#[cfg(test)]
mod tests {
    use super::{emit_door_data, emit_graphics, emit_sprite_data, emit_tilemap, physics_lines};
    use crate::model::{Graphics, Physics, SpriteData, Tilemap};

    #[test]
    fn graphics_lines_hold_one_tile_each() {
        let graphics = Graphics::from_bytes((0..32).collect()).unwrap();
        let mut out = String::new();
        emit_graphics(&mut out, "sFoo_Graphics", &graphics).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "const u8 sFoo_Graphics[] = {");
        assert_eq!(lines[2], "    2,");
        assert_eq!(lines[3], "");
        assert!(lines[4].starts_with("    0x00, 0x01, 0x02,"));
        assert!(lines[4].ends_with("0x0E, 0x0F,"));
        assert!(lines[5].starts_with("    0x10,"));
        assert_eq!(lines[6], "};");
    }

    #[test]
    fn tilemap_rows_are_packed() {
        let tilemap = Tilemap::from_rows(vec![vec![0, 0xAB], vec![1, 2]]);
        let mut out = String::new();
        emit_tilemap(&mut out, "sRoom_Tilemap", &tilemap).unwrap();
        assert_eq!(
            out,
            "\nconst u8 sRoom_Tilemap[] = {\n    2, 2,\n\n    0x00,0xAB,\n    0x01,0x02,\n};\n"
        );
    }

    #[test]
    fn sprite_table_ends_with_terminator_entry() {
        let sprites = vec![SpriteData::new(3, 4, "STYPE_BAT", 0)];
        let mut out = String::new();
        emit_sprite_data(&mut out, "sRoom_Sprites", &sprites).unwrap();
        assert!(out.contains("        .part = 0\n    },\n"));
        assert!(out.ends_with("    [1] = ROOM_SPRITE_TERMINATOR\n};\n"));
    }

    #[test]
    fn door_data_ends_with_door_none() {
        let mut out = String::new();
        emit_door_data(&mut out, "sRoom_DoorData", &vec![0, 3]).unwrap();
        assert_eq!(
            out,
            "\nconst u8 sRoom_DoorData[] = {\n    0,\n    3,\n    DOOR_NONE\n};\n"
        );
    }

    #[test]
    fn physics_values_print_signed() {
        let physics = Physics {
            jumping_velocity: -12,
            ..Physics::default()
        };
        let lines = physics_lines(&physics);
        assert_eq!(lines[0], "    gPlayerPhysics.xAcceleration = 0;");
        assert_eq!(lines[5], "    gPlayerPhysics.jumpingVelocity = -12;");
    }
}
