use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use gbedit_core::model::Physics;
use gbedit_core::symbols::NameIssue;
use gbedit_core::surgeon::{remove_duplicate_includes, replace_symbol};
use gbedit_core::{CoreErrorCode, Engine, Project, SymbolInfo, SymbolKind};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn temp_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}", std::process::id(), nanos))
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("failed to create fixture copy");
    for entry in fs::read_dir(from).expect("failed to list fixture") {
        let entry = entry.expect("failed to read fixture entry");
        let target = to.join(entry.file_name());
        if entry.file_type().expect("file type").is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).expect("failed to copy fixture file");
        }
    }
}

fn fixture_copy(prefix: &str) -> PathBuf {
    let dir = temp_test_dir(prefix);
    copy_dir(&workspace_root().join("tests/fixtures/project"), &dir);
    dir
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).expect("failed to read project file")
}

fn assert_same_assets(a: &Project, b: &Project) {
    assert_eq!(a.graphics, b.graphics);
    assert_eq!(a.tilemaps, b.tilemaps);
    assert_eq!(a.rooms, b.rooms);
    assert_eq!(a.doors, b.doors);
    assert_eq!(a.sprites, b.sprites);
    assert_eq!(a.door_data, b.door_data);
    assert_eq!(a.animations, b.animations);
    assert_eq!(a.tilesets, b.tilesets);
    assert_eq!(a.collision_tables, b.collision_tables);
    assert_eq!(a.collision_table_array, b.collision_table_array);
    assert_eq!(a.physics, b.physics);
}

#[test]
fn save_then_reload_preserves_every_asset() {
    let root = fixture_copy("gbedit_reload");
    let engine = Engine::new();
    let project = engine.open_project(&root).unwrap();

    let summary = project.save().expect("save should succeed");
    assert_eq!(summary.files, 5);
    assert_eq!(summary.symbols, 14);
    assert!(summary.physics);

    let reloaded = engine.open_project(&root).unwrap();
    assert_same_assets(&project, &reloaded);

    fs::remove_dir_all(root).ok();
}

#[test]
fn saving_twice_is_a_fixed_point() {
    let root = fixture_copy("gbedit_fixed_point");
    let engine = Engine::new();

    engine.open_project(&root).unwrap().save().unwrap();
    let first: Vec<String> = ["src/rooms/room0.c", "src/rooms/tables.c", "src/sprites/player_anim.c"]
        .iter()
        .map(|file| read(&root, file))
        .collect();

    engine.open_project(&root).unwrap().save().unwrap();
    let second: Vec<String> = ["src/rooms/room0.c", "src/rooms/tables.c", "src/sprites/player_anim.c"]
        .iter()
        .map(|file| read(&root, file))
        .collect();

    assert_eq!(first, second);
    fs::remove_dir_all(root).ok();
}

#[test]
fn passthrough_lines_survive_in_order() {
    let root = fixture_copy("gbedit_passthrough");
    let project = Engine::new().open_project(&root).unwrap();
    project.save().unwrap();

    let text = read(&root, "src/rooms/room0.c");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "#include \"rooms.h\"");
    let comment = lines.iter().position(|l| *l == "// Room 0: entrance hall.").unwrap();
    let extern_line = lines
        .iter()
        .position(|l| *l == "extern const u8 sRoom1_Graphics[];")
        .unwrap();
    let helper = lines.iter().position(|l| *l == "u8 Room0Helper(u8 value)").unwrap();
    assert!(comment < extern_line && extern_line < helper);
    assert_eq!(lines[helper + 2], "    return value + 1;");
    // The existing include is not duplicated.
    assert_eq!(text.matches("#include \"rooms.h\"").count(), 1);
    // Re-emitted blocks follow the passthrough text.
    assert!(text.find("const u8 sRoom0_Graphics[]").unwrap() > text.find("Room0Helper").unwrap());

    fs::remove_dir_all(root).ok();
}

#[test]
fn emitted_graphics_use_uppercase_hex() {
    let root = fixture_copy("gbedit_hex");
    Engine::new().open_project(&root).unwrap().save().unwrap();

    let text = read(&root, "src/rooms/room0.c");
    assert!(text.contains(
        "\nconst u8 sRoom0_Graphics[] = {\n    2,\n\n    0x00, 0x00, 0x7E, 0x7E, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x7E, 0x7E, 0x00, 0x00,\n"
    ));
    fs::remove_dir_all(root).ok();
}

#[test]
fn include_is_added_for_subdirectory_files() {
    let root = fixture_copy("gbedit_include");
    Engine::new().open_project(&root).unwrap().save().unwrap();

    let text = read(&root, "src/sprites/player_anim.c");
    assert!(text.starts_with("#include \"sprites.h\"\n"));
    assert_eq!(text.matches("#include \"sprites.h\"").count(), 1);

    let tables = read(&root, "src/rooms/tables.c");
    assert_eq!(tables.matches("#include").count(), 2);
    fs::remove_dir_all(root).ok();
}

#[test]
fn replacing_one_symbol_leaves_the_others_intact() {
    let root = fixture_copy("gbedit_replace");
    let mut project = Engine::new().open_project(&root).unwrap();
    let before = read(&root, "src/rooms/room1.c");
    let start = before.find("const u8 sRoom1_Graphics").unwrap();
    let end = start + before[start..].find("};").unwrap() + 2;
    let graphics_block = before[start..end].to_string();

    project
        .tilemaps
        .get_mut("sRoom1_Tilemap")
        .unwrap()
        .set(1, 1, 0x09);
    let path = root.join("src/rooms/room1.c");
    replace_symbol(
        &project,
        &path,
        &SymbolInfo::new(SymbolKind::Tilemap, "sRoom1_Tilemap"),
    )
    .unwrap();

    let after = read(&root, "src/rooms/room1.c");
    assert!(after.contains(&graphics_block));
    assert!(after.contains("    0x00,0x09,\n};\n"));
    assert_eq!(after.matches("sRoom1_Tilemap").count(), 1);
    assert!(after.ends_with("    0x00,0x09,\n};\n"));

    let reloaded = Engine::new().open_project(&root).unwrap();
    assert_eq!(reloaded.tilemaps["sRoom1_Tilemap"].get(1, 1), Some(0x09));
    assert_eq!(reloaded.graphics, project.graphics);
    fs::remove_dir_all(root).ok();
}

#[test]
fn physics_is_rewritten_in_place() {
    let root = fixture_copy("gbedit_physics");
    let mut project = Engine::new().open_project(&root).unwrap();
    let before = read(&root, "src/player.c");

    project.save().unwrap();
    assert_eq!(read(&root, "src/player.c"), before);

    project.physics = Some(Physics {
        gravity_downwards: 7,
        jumping_velocity: -48,
        ..project.physics.unwrap()
    });
    project.save().unwrap();

    let after = read(&root, "src/player.c");
    assert!(after.contains("    gPlayerPhysics.gravityDownwards = 7;\n"));
    assert!(after.contains("    gPlayerPhysics.jumpingVelocity = -48;\n"));
    assert!(after.ends_with("void PlayerInit(void)\n{\n    PlayerInitPhysics();\n}\n"));
    assert_eq!(after.lines().count(), before.lines().count());

    let reloaded = Engine::new().open_project(&root).unwrap();
    assert_eq!(reloaded.physics, project.physics);
    fs::remove_dir_all(root).ok();
}

#[test]
fn added_resources_are_written_and_reloaded() {
    let root = fixture_copy("gbedit_add");
    let mut project = Engine::new().open_project(&root).unwrap();

    project
        .add_resource(SymbolKind::Tilemap, Path::new("src/rooms/room1.c"), "sRoom2_Tilemap")
        .unwrap();
    project
        .add_resource(SymbolKind::Animation, Path::new("src/sprites/player_anim.c"), "sPlayerRun")
        .unwrap();
    project.save().unwrap();

    let reloaded = Engine::new().open_project(&root).unwrap();
    let tilemap = &reloaded.tilemaps["sRoom2_Tilemap"];
    assert_eq!((tilemap.width(), tilemap.height()), (20, 18));
    let run = &reloaded.animations["sPlayerRun"];
    assert_eq!(run.len(), 1);
    assert_eq!(run[0].duration, 60);
    assert_eq!(run[0].oam.len(), 1);
    fs::remove_dir_all(root).ok();
}

#[test]
fn add_resource_rejects_bad_requests() {
    let root = fixture_copy("gbedit_add_errors");
    let mut project = Engine::new().open_project(&root).unwrap();
    let file = Path::new("src/rooms/room0.c");

    let err = project
        .add_resource(SymbolKind::Graphics, file, "sRoom0_Graphics")
        .unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidName);

    let err = project.add_resource(SymbolKind::Doors, file, "sMoreDoors").unwrap_err();
    assert_eq!(err.code, CoreErrorCode::UnsupportedOperation);

    let err = project
        .add_resource(SymbolKind::Graphics, Path::new("src/missing.c"), "sNew_Graphics")
        .unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidProject);
    assert!(!project.symbols().contains("sNew_Graphics"));
    fs::remove_dir_all(root).ok();
}

#[test]
fn every_addable_kind_survives_a_reload() {
    let root = fixture_copy("gbedit_add_kinds");
    let mut project = Engine::new().open_project(&root).unwrap();
    let rooms = Path::new("src/rooms/room1.c");

    for (kind, name) in [
        (SymbolKind::Graphics, "sRoom2_Graphics"),
        (SymbolKind::Tilemap, "sRoom2_Tilemap"),
        (SymbolKind::SpriteData, "sRoom2_Sprites"),
        (SymbolKind::DoorData, "sRoom2_DoorData"),
        (SymbolKind::CollisionTable, "sCollisionTable_Room2"),
    ] {
        project.add_resource(kind, rooms, name).unwrap();
    }
    project
        .add_resource(SymbolKind::Animation, Path::new("src/sprites/player_anim.c"), "sPlayerRun")
        .unwrap();
    project.save().unwrap();

    let reloaded = Engine::new().open_project(&root).unwrap();
    assert_same_assets(&project, &reloaded);
    assert_eq!(reloaded.graphics["sRoom2_Graphics"].tile_count(), 1);
    assert!(reloaded.sprites["sRoom2_Sprites"].is_empty());
    assert!(reloaded.door_data["sRoom2_DoorData"].is_empty());
    assert!(reloaded.collision_tables["sCollisionTable_Room2"].is_empty());
    let in_room1: Vec<&str> = reloaded
        .symbols()
        .symbols_in(&root.join(rooms))
        .iter()
        .map(|symbol| symbol.name.as_str())
        .collect();
    assert!(in_room1.contains(&"sCollisionTable_Room2"));
    fs::remove_dir_all(root).ok();
}

#[test]
fn names_the_scanner_would_not_recognise_are_rejected() {
    let root = fixture_copy("gbedit_add_markers");
    let mut project = Engine::new().open_project(&root).unwrap();
    let file = Path::new("src/rooms/room1.c");
    let registered = project.symbols().symbols_in(&root.join(file)).len();

    for (kind, name) in [
        (SymbolKind::Graphics, "sHero"),
        (SymbolKind::Graphics, "sHero_Tilemap"),
        (SymbolKind::Tilemap, "sRoom2Map"),
        (SymbolKind::CollisionTable, "sRoom1Clip"),
        (SymbolKind::DoorData, "sRoom2Doors"),
    ] {
        let err = project.add_resource(kind, file, name).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::InvalidName, "{name}");
        assert!(err.message.contains("not be recognised"), "{}", err.message);
        assert!(!project.symbols().contains(name));
        assert_eq!(
            project.validate_resource_name(kind, name),
            Err(NameIssue::NotRecognised(kind))
        );
    }
    assert_eq!(project.validate_resource_name(SymbolKind::Graphics, "sHero_Graphics"), Ok(()));

    assert_eq!(project.symbols().symbols_in(&root.join(file)).len(), registered);
    fs::remove_dir_all(root).ok();
}

#[test]
fn add_resource_only_targets_source_files() {
    let root = fixture_copy("gbedit_add_paths");
    let mut project = Engine::new().open_project(&root).unwrap();
    let makefile = fs::read(root.join("Makefile")).unwrap();

    for file in [
        "Makefile",
        "include/sprite.h",
        "src/../../outside.c",
        "src/rooms/../rooms/room0.c",
    ] {
        let err = project
            .add_resource(SymbolKind::Graphics, Path::new(file), "sStray_Graphics")
            .unwrap_err();
        assert_eq!(err.code, CoreErrorCode::InvalidProject, "{file}");
    }
    assert!(!project.symbols().contains("sStray_Graphics"));

    project.save().unwrap();
    assert_eq!(fs::read(root.join("Makefile")).unwrap(), makefile);
    fs::remove_dir_all(root).ok();
}

#[test]
fn non_utf8_comments_load_and_survive_a_save() {
    let root = fixture_copy("gbedit_latin1");
    let file = root.join("src/rooms/room1.c");
    let mut bytes = fs::read(&file).unwrap();
    bytes.extend_from_slice(b"// caf\xE9 au lait\n");
    fs::write(&file, &bytes).unwrap();

    let project = Engine::new().open_project(&root).unwrap();
    assert!(project.tilemaps.contains_key("sRoom1_Tilemap"));
    project.save().unwrap();

    let saved = fs::read(&file).unwrap();
    assert!(
        saved
            .windows(b"// caf\xE9 au lait".len())
            .any(|window| window == b"// caf\xE9 au lait")
    );
    let reloaded = Engine::new().open_project(&root).unwrap();
    assert_same_assets(&project, &reloaded);
    fs::remove_dir_all(root).ok();
}

#[test]
fn irregular_tilemap_is_not_saved() {
    let root = fixture_copy("gbedit_irregular");
    let mut project = Engine::new().open_project(&root).unwrap();
    let files = ["src/player.c", "src/rooms/room0.c", "src/rooms/room1.c"];
    let before: Vec<Vec<u8>> = files
        .iter()
        .map(|file| fs::read(root.join(file)).unwrap())
        .collect();

    project
        .graphics
        .get_mut("sRoom0_Graphics")
        .unwrap()
        .set_pixel(0, 0, 0, 3)
        .unwrap();
    project.physics.as_mut().unwrap().gravity_downwards = 9;
    project.tilemaps.insert(
        "sRoom1_Tilemap".to_string(),
        gbedit_core::model::Tilemap::from_rows(vec![vec![0, 1], vec![2]]),
    );

    let err = project.save().unwrap_err();
    assert_eq!(err.code, CoreErrorCode::UnsupportedOperation);
    let after: Vec<Vec<u8>> = files
        .iter()
        .map(|file| fs::read(root.join(file)).unwrap())
        .collect();
    assert_eq!(before, after);
    fs::remove_dir_all(root).ok();
}

#[test]
fn include_dedup_is_idempotent() {
    let lines: Vec<String> = [
        "#include \"rooms.h\"",
        "#include \"door.h\"",
        "int x;",
        "#include \"rooms.h\"",
        "#include  \"rooms.h\"",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect();

    let once = remove_duplicate_includes(lines);
    assert_eq!(once.len(), 4);
    assert_eq!(remove_duplicate_includes(once.clone()), once);
}
