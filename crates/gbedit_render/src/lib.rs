use std::fmt::Write as _;
use std::path::Path;

use gbedit_core::Project;
use gbedit_core::model::{AnimationFrame, Door, Graphics, OamEntry, Physics, Room, SpriteData, Tilemap};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Whole-project JSON document with a fixed top-level key order.
pub fn render_json(project: &Project) -> JsonValue {
    let mut out = JsonMap::new();

    out.insert(
        "root".to_string(),
        JsonValue::String(project.root().display().to_string()),
    );
    out.insert("files".to_string(), files_to_json(project));
    out.insert(
        "graphics".to_string(),
        keyed(project.graphics.iter(), graphics_to_json),
    );
    out.insert(
        "tilemaps".to_string(),
        keyed(project.tilemaps.iter(), tilemap_to_json),
    );
    out.insert(
        "rooms".to_string(),
        JsonValue::Array(project.rooms.iter().map(room_to_json).collect()),
    );
    out.insert(
        "doors".to_string(),
        JsonValue::Array(project.doors.iter().map(door_to_json).collect()),
    );
    out.insert(
        "sprites".to_string(),
        keyed(project.sprites.iter(), |sprites| {
            JsonValue::Array(sprites.iter().map(sprite_to_json).collect())
        }),
    );
    out.insert(
        "door_data".to_string(),
        keyed(project.door_data.iter(), |doors| {
            JsonValue::Array(doors.iter().map(|d| JsonValue::from(*d)).collect())
        }),
    );
    out.insert(
        "animations".to_string(),
        keyed(project.animations.iter(), |frames| {
            JsonValue::Array(frames.iter().map(frame_to_json).collect())
        }),
    );
    out.insert("tilesets".to_string(), strings(&project.tilesets));
    out.insert(
        "collision_tables".to_string(),
        keyed(project.collision_tables.iter(), |table| strings(table)),
    );
    out.insert(
        "collision_table_array".to_string(),
        strings(&project.collision_table_array),
    );
    out.insert(
        "physics".to_string(),
        match &project.physics {
            Some(physics) => physics_to_json(physics),
            None => JsonValue::Null,
        },
    );
    out.insert("sprite_ids".to_string(), strings(&project.sprite_ids));
    out.insert(
        "clipdata_names".to_string(),
        strings(&project.clipdata_names),
    );

    JsonValue::Object(out)
}

fn keyed<'a, T: 'a>(
    entries: impl Iterator<Item = (&'a String, &'a T)>,
    to_json: impl Fn(&T) -> JsonValue,
) -> JsonValue {
    let mut m = JsonMap::new();
    for (name, value) in entries {
        m.insert(name.clone(), to_json(value));
    }
    JsonValue::Object(m)
}

fn strings(values: &[String]) -> JsonValue {
    JsonValue::Array(values.iter().cloned().map(JsonValue::String).collect())
}

fn relative_path(project: &Project, path: &Path) -> String {
    path.strip_prefix(project.root())
        .unwrap_or(path)
        .display()
        .to_string()
}

fn files_to_json(project: &Project) -> JsonValue {
    JsonValue::Array(
        project
            .symbols()
            .files()
            .map(|(path, symbols)| {
                let mut m = JsonMap::new();
                m.insert(
                    "path".to_string(),
                    JsonValue::String(relative_path(project, path)),
                );
                m.insert(
                    "symbols".to_string(),
                    JsonValue::Array(
                        symbols
                            .iter()
                            .map(|s| {
                                let mut sm = JsonMap::new();
                                sm.insert("kind".to_string(), JsonValue::from(s.kind.as_str()));
                                sm.insert("name".to_string(), JsonValue::String(s.name.clone()));
                                JsonValue::Object(sm)
                            })
                            .collect(),
                    ),
                );
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn graphics_to_json(graphics: &Graphics) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("tile_count".to_string(), JsonValue::from(graphics.tile_count()));
    m.insert(
        "bytes".to_string(),
        JsonValue::Array(graphics.as_bytes().iter().map(|b| JsonValue::from(*b)).collect()),
    );
    JsonValue::Object(m)
}

fn tilemap_to_json(tilemap: &Tilemap) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("width".to_string(), JsonValue::from(tilemap.width()));
    m.insert("height".to_string(), JsonValue::from(tilemap.height()));
    m.insert(
        "rows".to_string(),
        JsonValue::Array(
            tilemap
                .rows()
                .iter()
                .map(|row| JsonValue::Array(row.iter().map(|t| JsonValue::from(*t)).collect()))
                .collect(),
        ),
    );
    JsonValue::Object(m)
}

fn room_to_json(room: &Room) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("tilemap".to_string(), JsonValue::String(room.tilemap.clone()));
    m.insert(
        "palette".to_string(),
        JsonValue::Array(room.palette.iter().map(|c| JsonValue::from(c.name())).collect()),
    );
    m.insert(
        "sprite_data".to_string(),
        JsonValue::String(room.sprite_data.clone()),
    );
    m.insert("door_data".to_string(), JsonValue::String(room.door_data.clone()));
    m.insert(
        "collision_table".to_string(),
        JsonValue::from(room.collision_table),
    );
    m.insert("origin_x".to_string(), JsonValue::from(room.origin_x));
    m.insert("origin_y".to_string(), JsonValue::from(room.origin_y));
    JsonValue::Object(m)
}

fn door_to_json(door: &Door) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("x".to_string(), JsonValue::from(door.x));
    m.insert("y".to_string(), JsonValue::from(door.y));
    m.insert("owner_room".to_string(), JsonValue::from(door.owner_room));
    m.insert("height".to_string(), JsonValue::from(door.height));
    m.insert("width".to_string(), JsonValue::from(door.width));
    m.insert("target_door".to_string(), JsonValue::from(door.target_door));
    m.insert("exit_x".to_string(), JsonValue::from(door.exit_x));
    m.insert("exit_y".to_string(), JsonValue::from(door.exit_y));
    m.insert("tileset".to_string(), JsonValue::from(door.tileset));
    JsonValue::Object(m)
}

fn sprite_to_json(sprite: &SpriteData) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("x".to_string(), JsonValue::from(sprite.x));
    m.insert("y".to_string(), JsonValue::from(sprite.y));
    m.insert("id".to_string(), JsonValue::String(sprite.id.clone()));
    m.insert("part".to_string(), JsonValue::from(sprite.part));
    JsonValue::Object(m)
}

fn frame_to_json(frame: &AnimationFrame) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("duration".to_string(), JsonValue::from(frame.duration));
    m.insert(
        "oam".to_string(),
        JsonValue::Array(frame.oam.iter().map(oam_to_json).collect()),
    );
    JsonValue::Object(m)
}

fn oam_to_json(oam: &OamEntry) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("y".to_string(), JsonValue::from(oam.y));
    m.insert("x".to_string(), JsonValue::from(oam.x));
    m.insert("tile_index".to_string(), JsonValue::from(oam.tile_index));
    m.insert("properties".to_string(), JsonValue::from(oam.properties));
    m.insert(
        "behind_background".to_string(),
        JsonValue::Bool(oam.behind_background()),
    );
    m.insert("y_flip".to_string(), JsonValue::Bool(oam.y_flip()));
    m.insert("x_flip".to_string(), JsonValue::Bool(oam.x_flip()));
    m.insert("obj_palette".to_string(), JsonValue::from(oam.palette()));
    JsonValue::Object(m)
}

fn physics_to_json(physics: &Physics) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "x_acceleration".to_string(),
        JsonValue::from(physics.x_acceleration),
    );
    m.insert(
        "x_velocity_cap".to_string(),
        JsonValue::from(physics.x_velocity_cap),
    );
    m.insert(
        "y_velocity_cap".to_string(),
        JsonValue::from(physics.y_velocity_cap),
    );
    m.insert(
        "gravity_upwards".to_string(),
        JsonValue::from(physics.gravity_upwards),
    );
    m.insert(
        "gravity_downwards".to_string(),
        JsonValue::from(physics.gravity_downwards),
    );
    m.insert(
        "jumping_velocity".to_string(),
        JsonValue::from(physics.jumping_velocity),
    );
    JsonValue::Object(m)
}

/// Plain-text inventory: each file with its symbols, then asset counts.
pub fn render_listing(project: &Project) -> String {
    let mut out = String::new();

    for (path, symbols) in project.symbols().files() {
        writeln!(&mut out, "{}", relative_path(project, path))
            .expect("writing to String cannot fail");
        for symbol in symbols {
            writeln!(&mut out, "  {} {}", symbol.kind, symbol.name)
                .expect("writing to String cannot fail");
        }
    }
    if let Some(path) = project.physics_file() {
        writeln!(&mut out, "{}", relative_path(project, path))
            .expect("writing to String cannot fail");
        writeln!(&mut out, "  Physics PlayerInitPhysics").expect("writing to String cannot fail");
    }

    writeln!(&mut out).expect("writing to String cannot fail");
    let counts = [
        ("graphics", project.graphics.len()),
        ("tilemaps", project.tilemaps.len()),
        ("rooms", project.rooms.len()),
        ("doors", project.doors.len()),
        ("sprite tables", project.sprites.len()),
        ("door data", project.door_data.len()),
        ("animations", project.animations.len()),
        ("tilesets", project.tilesets.len()),
        ("collision tables", project.collision_tables.len()),
        ("sprite ids", project.sprite_ids.len()),
        ("clipdata names", project.clipdata_names.len()),
    ];
    for (label, count) in counts {
        writeln!(&mut out, "{label:<18}{count}").expect("writing to String cannot fail");
    }

    out
}
