use std::io::BufRead;

use crate::core_api::CoreError;
use crate::model::color::parse_palette;
use crate::model::{
    AnimationFrame, CollisionTable, Door, DoorData, Graphics, OamEntry, Physics, Room,
    SpriteData, TILE_BYTES, Tilemap,
};
use crate::reader::LineReader;

use super::Declaration;

pub const ROOM_SPRITE_TERMINATOR: &str = "ROOM_SPRITE_TERMINATOR";
pub const DOOR_NONE: &str = "DOOR_NONE";
pub const SPRITE_ANIM_TERMINATOR: &str = "SPRITE_ANIM_TERMINATOR";
pub const OAM_DATA_SIZE: &str = "OAM_DATA_SIZE(";
pub const OAM_POS: &str = "OAM_POS(";
pub const ORIGIN_X_SCALE: &str = "SCREEN_SIZE_X_SUB_PIXEL";
pub const ORIGIN_Y_SCALE: &str = "SCREEN_SIZE_Y_SUB_PIXEL";
pub const PHYSICS_OBJECT: &str = "gPlayerPhysics";
pub const ANIM_TABLE_PREFIX: &str = "const struct AnimData";
pub const FRAME_MARKER: &str = "_Frame";

// --- Shared helpers ---

/// The identifier directly in front of the first `[`.
pub fn declared_name<R: BufRead>(r: &LineReader<R>, line: &str) -> Result<String, CoreError> {
    let Some(bracket) = line.find('[') else {
        return Err(r.error(format!("declaration has no array bracket: `{}`", line.trim())));
    };
    let name = line[..bracket]
        .split_whitespace()
        .last()
        .map(|token| token.trim_start_matches('*'))
        .unwrap_or_default();
    if !is_identifier(name) {
        return Err(r.error(format!("could not find symbol name in `{}`", line.trim())));
    }
    Ok(name.to_string())
}

pub fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `const u8 sFoo[];` style lines: a trailing `;` and no initializer.
pub fn is_forward_declaration(line: &str) -> bool {
    line.trim_end().ends_with(';') && !line.contains('=')
}

pub fn is_closing(line: &str) -> bool {
    line.trim_start().starts_with('}')
}

/// Structural lines inside designated-initializer tables: `[n] = {`, `{`.
fn is_entry_opener(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || t == "{" || t.starts_with('[')
}

fn strip_comma(token: &str) -> &str {
    let token = token.trim();
    token.strip_suffix(',').unwrap_or(token).trim()
}

/// Value of a `.field = value,` line.
fn field_value<'a, R: BufRead>(
    r: &LineReader<R>,
    line: &'a str,
    field: &str,
) -> Result<&'a str, CoreError> {
    let t = line.trim();
    let value = t
        .strip_prefix('.')
        .and_then(|rest| rest.strip_prefix(field))
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('='))
        .map(strip_comma)
        .filter(|value| !value.is_empty());
    value.ok_or_else(|| r.error(format!("expected `.{field} = ...`, found `{t}`")))
}

fn next_field<R: BufRead>(r: &mut LineReader<R>, field: &str) -> Result<String, CoreError> {
    let line = r.expect_line(field)?;
    field_value(r, &line, field).map(str::to_string)
}

fn next_number<T: TryFrom<i64>, R: BufRead>(
    r: &mut LineReader<R>,
    field: &str,
) -> Result<T, CoreError> {
    let value = next_field(r, field)?;
    parse_number(r, &value, field)
}

/// Decimal, or hexadecimal with a `0x` prefix, checked against `T`'s range.
pub fn parse_number<T: TryFrom<i64>, R: BufRead>(
    r: &LineReader<R>,
    token: &str,
    field: &str,
) -> Result<T, CoreError> {
    let token = token.trim();
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => token.parse::<i64>(),
    };
    let value =
        parsed.map_err(|_| r.error(format!("{field}: `{token}` is not a number")))?;
    T::try_from(value).map_err(|_| r.out_of_range(format!("{field}: {value} is out of range")))
}

fn parse_hex_byte<R: BufRead>(r: &LineReader<R>, token: &str) -> Result<u8, CoreError> {
    let token = token.trim();
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| r.error(format!("`{token}` is not a hexadecimal byte")))?;
    u8::try_from(value).map_err(|_| r.out_of_range(format!("byte {token} is out of range")))
}

/// Comma separated tokens of one body line, empty tokens dropped.
fn tokens(line: &str) -> Vec<&str> {
    line.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Body lines of a flat `= { ... };` array. Text after `{` on the
/// declaration line counts as the first body line.
fn flat_body<R: BufRead>(
    r: &mut LineReader<R>,
    declaration: &str,
    what: &str,
) -> Result<Vec<String>, CoreError> {
    let mut body = Vec::new();
    if let Some((_, rest)) = declaration.split_once('{') {
        if let Some((inline, _)) = rest.split_once('}') {
            body.push(inline.to_string());
            return Ok(body);
        }
        body.push(rest.to_string());
    }
    loop {
        let line = r.expect_line(what)?;
        if is_closing(&line) {
            return Ok(body);
        }
        body.push(line);
    }
}

fn consume_table_close<R: BufRead>(r: &mut LineReader<R>) -> Result<(), CoreError> {
    if r.peek_line()?.is_some_and(is_closing) {
        r.next_line()?;
    }
    Ok(())
}

fn expect_entry_close<R: BufRead>(r: &mut LineReader<R>, what: &str) -> Result<(), CoreError> {
    let line = r.expect_line(what)?;
    if !is_closing(&line) {
        return Err(r.error(format!("expected `}},` closing {what}, found `{}`", line.trim())));
    }
    Ok(())
}

// --- Graphics and tilemaps ---

pub fn decode_graphics_array<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<Declaration, CoreError> {
    let name = declared_name(r, line)?;
    if name.contains("Graphics") {
        let graphics = decode_graphics_body(r, line, &name)?;
        Ok(Declaration::Graphics { name, graphics })
    } else if name.contains("Tilemap") {
        let tilemap = decode_tilemap_body(r, line, &name)?;
        Ok(Declaration::Tilemap { name, tilemap })
    } else {
        Err(r.error(format!("{name} is neither graphics nor a tilemap")))
    }
}

fn decode_graphics_body<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
    name: &str,
) -> Result<Graphics, CoreError> {
    let mut declared_tiles = None;
    let mut bytes = Vec::new();

    for body_line in flat_body(r, line, "graphics data")? {
        let parts = tokens(&body_line);
        if parts.is_empty() {
            continue;
        }
        let is_data = parts
            .iter()
            .all(|p| p.starts_with("0x") || p.starts_with("0X"));
        if is_data {
            for part in parts {
                bytes.push(parse_hex_byte(r, part)?);
            }
        } else if declared_tiles.is_none() && bytes.is_empty() && parts.len() == 1 {
            declared_tiles = Some(parse_number::<usize, _>(r, parts[0], "tile count")?);
        } else {
            return Err(r.error(format!("unexpected graphics line `{}`", body_line.trim())));
        }
    }

    let byte_count = bytes.len();
    let graphics = Graphics::from_bytes(bytes).map_err(|len| {
        r.error(format!(
            "{name}: {len} bytes is not a whole number of {TILE_BYTES}-byte tiles"
        ))
    })?;
    if let Some(declared) = declared_tiles
        && declared != graphics.tile_count()
    {
        tracing::warn!(
            symbol = name,
            declared,
            actual = graphics.tile_count(),
            "graphics tile count header disagrees with {byte_count} data bytes"
        );
    }
    Ok(graphics)
}

fn decode_tilemap_body<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
    name: &str,
) -> Result<Tilemap, CoreError> {
    let mut dimensions: Option<(usize, usize)> = None;
    let mut rows = Vec::new();

    for body_line in flat_body(r, line, "tilemap data")? {
        let parts = tokens(&body_line);
        if parts.is_empty() {
            continue;
        }
        let Some((width, _)) = dimensions else {
            if parts.len() != 2 {
                return Err(r.error(format!(
                    "{name}: expected `width, height`, found `{}`",
                    body_line.trim()
                )));
            }
            let width = parse_number(r, parts[0], "tilemap width")?;
            let height = parse_number(r, parts[1], "tilemap height")?;
            dimensions = Some((width, height));
            continue;
        };
        if parts.len() != width {
            return Err(r.error(format!(
                "{name}: row {} has {} tiles, expected {width}",
                rows.len(),
                parts.len()
            )));
        }
        let row = parts
            .into_iter()
            .map(|part| parse_hex_byte(r, part))
            .collect::<Result<Vec<u8>, _>>()?;
        rows.push(row);
    }

    let Some((width, height)) = dimensions else {
        return Err(r.error(format!("{name}: missing tilemap dimensions")));
    };
    if width == 0 && rows.is_empty() {
        rows = vec![Vec::new(); height];
    }
    if rows.len() != height {
        return Err(r.error(format!(
            "{name}: found {} rows, expected {height}",
            rows.len()
        )));
    }
    Ok(Tilemap::from_rows(rows))
}

// --- Room info table ---

pub fn decode_rooms<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<Declaration, CoreError> {
    let name = declared_name(r, line)?;
    let mut rooms = Vec::new();

    loop {
        let line = r.expect_line("room table")?;
        if is_closing(&line) {
            break;
        }
        if is_entry_opener(&line) {
            continue;
        }

        let tilemap = field_value(r, &line, "tilemap")?.to_string();
        let palette_token = next_field(r, "bgPalette")?;
        let palette = parse_palette(&palette_token)
            .ok_or_else(|| r.error(format!("`{palette_token}` is not a MAKE_PALETTE call")))?;
        let sprite_data = next_field(r, "spriteData")?;
        let door_data = next_field(r, "doorData")?;
        let collision_table = next_number(r, "collisionTable")?;
        let origin_x = next_origin(r, "originX", ORIGIN_X_SCALE)?;
        let origin_y = next_origin(r, "originY", ORIGIN_Y_SCALE)?;
        expect_entry_close(r, "room entry")?;

        rooms.push(Room {
            tilemap,
            palette,
            sprite_data,
            door_data,
            collision_table,
            origin_x,
            origin_y,
        });
    }

    Ok(Declaration::Rooms { name, rooms })
}

fn next_origin<R: BufRead>(
    r: &mut LineReader<R>,
    field: &str,
    scale: &str,
) -> Result<u8, CoreError> {
    let value = next_field(r, field)?;
    let factor = value
        .strip_prefix(scale)
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('*'))
        .ok_or_else(|| r.error(format!("{field}: expected `{scale} * N`, found `{value}`")))?;
    parse_number(r, factor, field)
}

// --- Room sprites ---

pub fn decode_sprite_data<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<Declaration, CoreError> {
    let name = declared_name(r, line)?;
    let mut sprites = Vec::new();

    loop {
        let line = r.expect_line("sprite table")?;
        if line.contains(ROOM_SPRITE_TERMINATOR) {
            break;
        }
        if is_entry_opener(&line) {
            continue;
        }
        if is_closing(&line) {
            return Err(r.error(format!("{name} ends without {ROOM_SPRITE_TERMINATOR}")));
        }

        let x = parse_number(r, field_value(r, &line, "x")?, "x")?;
        let y = next_number(r, "y")?;
        let id = next_field(r, "id")?;
        let part = next_number(r, "part")?;
        expect_entry_close(r, "sprite entry")?;

        sprites.push(SpriteData { x, y, id, part });
    }
    consume_table_close(r)?;

    Ok(Declaration::SpriteData { name, sprites })
}

// --- Animations ---

struct FrameArray {
    name: String,
    oam: Vec<OamEntry>,
}

pub fn decode_animation<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<Declaration, CoreError> {
    let mut arrays = Vec::new();
    let mut line = line.to_string();

    while !line.trim_start().starts_with(ANIM_TABLE_PREFIX) {
        if !(line.starts_with("static const u8") && line.contains(FRAME_MARKER)) {
            return Err(r.error(format!(
                "expected an animation frame or AnimData table, found `{}`",
                line.trim()
            )));
        }
        arrays.push(decode_frame_array(r, &line)?);
        line = r.expect_non_blank("animation")?;
    }

    let name = declared_name(r, &line)?;
    let mut animation = Vec::new();

    loop {
        let line = r.expect_line("animation table")?;
        if line.contains(SPRITE_ANIM_TERMINATOR) {
            break;
        }
        if is_entry_opener(&line) {
            continue;
        }
        if is_closing(&line) {
            return Err(r.error(format!("{name} ends without {SPRITE_ANIM_TERMINATOR}")));
        }

        let pointer = field_value(r, &line, "oamPointer")?;
        let Some(frame) = arrays.iter().find(|array| array.name == pointer) else {
            return Err(r.error(format!("{name} references unknown frame {pointer}")));
        };
        let oam = frame.oam.clone();
        let duration = next_number(r, "duration")?;
        expect_entry_close(r, "animation entry")?;

        animation.push(AnimationFrame { oam, duration });
    }
    consume_table_close(r)?;

    Ok(Declaration::Animation { name, animation })
}

fn decode_frame_array<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<FrameArray, CoreError> {
    let name = declared_name(r, line)?;
    let count = line
        .split_once(OAM_DATA_SIZE)
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(count, _)| count)
        .ok_or_else(|| r.error(format!("{name}: missing {OAM_DATA_SIZE}N)")))?;
    let count: usize = parse_number(r, count, "OAM count")?;

    let count_line = r.expect_non_blank("OAM count")?;
    let stored: usize = parse_number(r, strip_comma(&count_line), "OAM count")?;
    if stored != count {
        return Err(r.error(format!(
            "{name}: array holds {stored} entries but is sized for {count}"
        )));
    }

    let mut oam = Vec::with_capacity(count);
    for _ in 0..count {
        let entry = r.expect_line("OAM entry")?;
        oam.push(decode_oam_entry(r, &entry)?);
    }

    let close = r.expect_non_blank("frame close")?;
    if !is_closing(&close) {
        return Err(r.error(format!("{name}: expected `}};`, found `{}`", close.trim())));
    }
    Ok(FrameArray { name, oam })
}

fn decode_oam_entry<R: BufRead>(r: &LineReader<R>, line: &str) -> Result<OamEntry, CoreError> {
    let parts = tokens(line);
    if parts.len() != 4 {
        return Err(r.error(format!("expected 4 OAM fields, found `{}`", line.trim())));
    }
    let position = |token: &str, field: &str| -> Result<i8, CoreError> {
        let inner = token
            .strip_prefix(OAM_POS)
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| r.error(format!("{field}: expected `{OAM_POS}N)`, found `{token}`")))?;
        parse_number(r, inner, field)
    };
    Ok(OamEntry {
        y: position(parts[0], "OAM y")?,
        x: position(parts[1], "OAM x")?,
        tile_index: parse_number(r, parts[2], "OAM tile")?,
        properties: parse_number(r, parts[3], "OAM properties")?,
    })
}

// --- Doors ---

pub fn decode_door_data<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<Declaration, CoreError> {
    let name = declared_name(r, line)?;
    let mut doors: DoorData = Vec::new();

    loop {
        let line = r.expect_line("door data")?;
        if line.contains(DOOR_NONE) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        if is_closing(&line) {
            return Err(r.error(format!("{name} ends without {DOOR_NONE}")));
        }
        doors.push(parse_number(r, strip_comma(&line), "door index")?);
    }
    consume_table_close(r)?;

    Ok(Declaration::DoorData { name, doors })
}

pub fn decode_doors<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<Declaration, CoreError> {
    let name = declared_name(r, line)?;
    let mut doors = Vec::new();

    loop {
        let line = r.expect_line("door table")?;
        if is_closing(&line) {
            break;
        }
        if is_entry_opener(&line) {
            continue;
        }

        let x = parse_number(r, field_value(r, &line, "x")?, "x")?;
        let door = Door {
            x,
            y: next_number(r, "y")?,
            owner_room: next_number(r, "ownerRoom")?,
            height: next_number(r, "height")?,
            width: next_number(r, "width")?,
            target_door: next_number(r, "targetDoor")?,
            exit_x: next_number(r, "exitX")?,
            exit_y: next_number(r, "exitY")?,
            tileset: next_number(r, "tileset")?,
        };
        expect_entry_close(r, "door entry")?;
        doors.push(door);
    }

    Ok(Declaration::Doors { name, doors })
}

// --- Name lists ---

/// One identifier per line until `}`.
fn decode_name_list<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
    what: &str,
) -> Result<Vec<String>, CoreError> {
    let mut names = Vec::new();
    for body_line in flat_body(r, line, what)? {
        for token in tokens(&body_line) {
            if !is_identifier(token) {
                return Err(r.error(format!("{what}: `{token}` is not an identifier")));
            }
            names.push(token.to_string());
        }
    }
    Ok(names)
}

pub fn decode_tilesets<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<Declaration, CoreError> {
    let name = declared_name(r, line)?;
    let tilesets = decode_name_list(r, line, "tileset table")?;
    Ok(Declaration::Tilesets { name, tilesets })
}

pub fn decode_collision_table<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<Declaration, CoreError> {
    let name = declared_name(r, line)?;
    let table: CollisionTable = decode_name_list(r, line, "collision table")?;
    Ok(Declaration::CollisionTable { name, table })
}

pub fn decode_collision_table_array<R: BufRead>(
    r: &mut LineReader<R>,
    line: &str,
) -> Result<Declaration, CoreError> {
    let name = declared_name(r, line)?;
    let tables = decode_name_list(r, line, "collision table array")?;
    Ok(Declaration::CollisionTableArray { name, tables })
}

// --- Physics ---

pub const PHYSICS_FIELDS: [&str; 6] = [
    "xAcceleration",
    "xVelocityCap",
    "yVelocityCap",
    "gravityUpwards",
    "gravityDownwards",
    "jumpingVelocity",
];

pub fn decode_physics<R: BufRead>(r: &mut LineReader<R>) -> Result<Declaration, CoreError> {
    let open = r.expect_non_blank("physics body")?;
    if open.trim() != "{" {
        return Err(r.error(format!("expected `{{`, found `{}`", open.trim())));
    }

    let mut values: [Option<i64>; 6] = [None; 6];
    for _ in 0..PHYSICS_FIELDS.len() {
        let line = r.expect_line("physics assignment")?;
        let (target, value) = line
            .trim()
            .strip_suffix(';')
            .and_then(|assignment| assignment.split_once('='))
            .ok_or_else(|| r.error(format!("expected `field = value;`, found `{}`", line.trim())))?;
        let field = target.trim().rsplit('.').next().unwrap_or_default();
        let Some(slot) = PHYSICS_FIELDS.iter().position(|known| *known == field) else {
            return Err(r.error(format!("unknown physics field `{field}`")));
        };
        if values[slot].is_some() {
            return Err(r.error(format!("physics field `{field}` assigned twice")));
        }
        values[slot] = Some(parse_number(r, value, field)?);
    }

    let field = |slot: usize| -> i64 { values[slot].unwrap_or_default() };
    let narrow = |slot: usize| -> Result<u8, CoreError> {
        u8::try_from(field(slot))
            .map_err(|_| r.out_of_range(format!("{} is out of range", PHYSICS_FIELDS[slot])))
    };
    let narrow_signed = |slot: usize| -> Result<i8, CoreError> {
        i8::try_from(field(slot))
            .map_err(|_| r.out_of_range(format!("{} is out of range", PHYSICS_FIELDS[slot])))
    };

    Ok(Declaration::Physics(Physics {
        x_acceleration: narrow(0)?,
        x_velocity_cap: narrow(1)?,
        y_velocity_cap: narrow_signed(2)?,
        gravity_upwards: narrow(3)?,
        gravity_downwards: narrow(4)?,
        jumping_velocity: narrow_signed(5)?,
    }))
}
