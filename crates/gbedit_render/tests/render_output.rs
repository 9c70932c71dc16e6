use std::path::PathBuf;

use gbedit_core::{Engine, Project};
use gbedit_render::{render_json, render_listing};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_project() -> Project {
    Engine::new()
        .open_project(workspace_root().join("tests/fixtures/project"))
        .expect("fixture should load")
}

#[test]
fn json_uses_canonical_top_level_order() {
    let value = render_json(&fixture_project());
    let keys: Vec<&str> = value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();

    assert_eq!(
        keys,
        vec![
            "root",
            "files",
            "graphics",
            "tilemaps",
            "rooms",
            "doors",
            "sprites",
            "door_data",
            "animations",
            "tilesets",
            "collision_tables",
            "collision_table_array",
            "physics",
            "sprite_ids",
            "clipdata_names",
        ]
    );
}

#[test]
fn json_carries_asset_values() {
    let value = render_json(&fixture_project());

    assert_eq!(value["graphics"]["sRoom0_Graphics"]["tile_count"], 2);
    assert_eq!(value["tilemaps"]["sRoom0_Tilemap"]["width"], 4);
    assert_eq!(value["tilemaps"]["sRoom0_Tilemap"]["rows"][1][0], 2);
    assert_eq!(value["rooms"][0]["palette"][1], "COLOR_BLACK");
    assert_eq!(value["doors"][0]["exit_y"], -4);
    assert_eq!(value["doors"][1]["target_door"], 255);
    assert_eq!(value["sprites"]["sRoom0_Sprites"][0]["id"], "STYPE_BAT");
    assert_eq!(value["animations"]["sPlayerIdle"][1]["duration"], 12);
    assert_eq!(value["animations"]["sPlayerIdle"][0]["oam"][0]["y"], -16);
    let flipped = &value["animations"]["sPlayerIdle"][1]["oam"][0];
    assert_eq!(flipped["properties"], 32);
    assert_eq!(flipped["x_flip"], true);
    assert_eq!(flipped["y_flip"], false);
    assert_eq!(flipped["behind_background"], false);
    assert_eq!(flipped["obj_palette"], 0);
    assert_eq!(value["physics"]["jumping_velocity"], -40);
    assert_eq!(value["clipdata_names"][2], "CLIPDATA_DOOR");

    let files = value["files"].as_array().expect("files array");
    assert_eq!(files.len(), 4);
    assert_eq!(files[0]["path"], "src/rooms/room0.c");
    assert_eq!(files[0]["symbols"][0]["kind"], "Graphics");
}

#[test]
fn json_physics_is_null_when_absent() {
    let mut project = fixture_project();
    project.physics = None;
    assert!(render_json(&project)["physics"].is_null());
}

#[test]
fn listing_groups_symbols_under_files() {
    let listing = render_listing(&fixture_project());

    assert!(listing.contains("src/rooms/tables.c\n  RoomData sRooms\n  Doors sDoors\n"));
    assert!(listing.contains("src/sprites/player_anim.c\n  Animation sPlayerIdle\n"));
    assert!(listing.contains("src/player.c\n  Physics PlayerInitPhysics\n"));
    assert!(listing.contains("\ndoors             3\n"));
    assert!(listing.ends_with("clipdata names    3\n"));
}
