use std::path::PathBuf;

use gbedit_core::config::ProjectConfig;
use gbedit_core::core_api::{ActionQueue, AddTile, DeleteTile, EditTilemap, PlotPixels};
use gbedit_core::model::{DOOR_TARGET_NONE, Door, Graphics, Room, TILESET_NONE, Tilemap};
use gbedit_core::{CoreErrorCode, Engine, Project};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn door(target_door: u8, tileset: u8) -> Door {
    Door {
        x: 0,
        y: 0,
        owner_room: 0,
        height: 2,
        width: 1,
        target_door,
        exit_x: 0,
        exit_y: 0,
        tileset,
    }
}

fn project_with_doors(targets: &[u8]) -> Project {
    let mut project = Project::new("/nonexistent", ProjectConfig::default());
    for (i, target) in targets.iter().enumerate() {
        let mut d = door(*target, TILESET_NONE);
        d.x = i as u16;
        project.add_door(d);
    }
    project
}

fn targets(project: &Project) -> Vec<u8> {
    project.doors.iter().map(|d| d.target_door).collect()
}

#[test]
fn deleting_middle_door_decrements_later_targets() {
    let mut project = project_with_doors(&[2, 0, 0]);
    let deletion = project.delete_door(1).unwrap();

    assert_eq!(deletion.removed.x, 1);
    assert!(deletion.orphaned.is_empty());
    assert_eq!(targets(&project), vec![1, 0]);
}

#[test]
fn deleting_targeted_door_orphans_its_sources() {
    let mut project = project_with_doors(&[2, 0, 0]);
    let deletion = project.delete_door(0).unwrap();

    assert_eq!(targets(&project), vec![DOOR_TARGET_NONE, DOOR_TARGET_NONE]);
    assert_eq!(deletion.orphaned, vec![0, 1]);
}

#[test]
fn door_without_target_is_left_alone() {
    let mut project = project_with_doors(&[DOOR_TARGET_NONE, 2, 1]);
    let deletion = project.delete_door(0).unwrap();

    assert!(deletion.orphaned.is_empty());
    assert_eq!(targets(&project), vec![1, 0]);
}

#[test]
fn door_deletion_renumbers_room_door_lists() {
    let mut project = Engine::new()
        .open_project(workspace_root().join("tests/fixtures/project"))
        .unwrap();

    let deletion = project.delete_door(1).unwrap();
    assert_eq!(deletion.removed.x, 152);
    assert_eq!(deletion.orphaned, vec![1]);
    assert_eq!(project.doors[0].target_door, 1);
    assert_eq!(project.doors[1].target_door, DOOR_TARGET_NONE);
    assert_eq!(project.door_data["sRoom0_DoorData"], vec![0]);
    assert_eq!(project.door_data["sRoom1_DoorData"], vec![1]);

    let err = project.delete_door(5).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidHandle);
}

#[test]
fn door_index_finds_structural_match() {
    let project = project_with_doors(&[2, 0, 0]);
    let mut probe = door(0, TILESET_NONE);
    probe.x = 2;
    assert_eq!(project.door_index(&probe), Some(2));
    probe.x = 9;
    assert_eq!(project.door_index(&probe), None);
}

#[test]
fn tileset_deletion_shifts_door_tilesets() {
    let mut project = Project::new("/nonexistent", ProjectConfig::default());
    project.add_tileset("sA_Graphics");
    project.add_tileset("sB_Graphics");
    project.add_tileset("sC_Graphics");
    project.add_door(door(DOOR_TARGET_NONE, 0));
    project.add_door(door(DOOR_TARGET_NONE, 1));
    project.add_door(door(DOOR_TARGET_NONE, 2));
    project.add_door(door(DOOR_TARGET_NONE, TILESET_NONE));

    let removed = project.delete_tileset(1).unwrap();
    assert_eq!(removed, "sB_Graphics");
    assert_eq!(project.tilesets, vec!["sA_Graphics", "sC_Graphics"]);
    let tilesets: Vec<u8> = project.doors.iter().map(|d| d.tileset).collect();
    assert_eq!(tilesets, vec![0, TILESET_NONE, 1, TILESET_NONE]);

    assert_eq!(
        project.delete_tileset(2).unwrap_err().code,
        CoreErrorCode::InvalidHandle
    );
}

#[test]
fn handles_edit_in_place_and_reject_stale_indices() {
    let mut project = project_with_doors(&[1, 0]);
    let room = project.add_room(Room::new("sA_Tilemap", "sA_Sprites", "sA_DoorData"));
    assert_eq!(room, 0);

    project.room_mut(room).unwrap().origin_x = 3;
    project.door_mut(1).unwrap().exit_y = -2;
    assert_eq!(project.room(room).unwrap().origin_x, 3);
    assert_eq!(project.door(1).unwrap().exit_y, -2);

    project.delete_door(1).unwrap();
    assert_eq!(
        project.door_mut(1).unwrap_err().code,
        CoreErrorCode::InvalidHandle
    );
    assert_eq!(
        project.room_mut(1).unwrap_err().code,
        CoreErrorCode::InvalidHandle
    );
    assert_eq!(project.doors.len(), 1);
}

fn project_with_assets() -> Project {
    let mut project = Project::new("/nonexistent", ProjectConfig::default());
    project
        .tilemaps
        .insert("sMap".to_string(), Tilemap::new(4, 4));
    project
        .graphics
        .insert("sGfx".to_string(), Graphics::blank(2));
    project
}

#[test]
fn tilemap_stroke_undoes_to_original_values() {
    let mut project = project_with_assets();
    let mut history = ActionQueue::new();

    let mut stroke = EditTilemap::new("sMap");
    stroke.paint(&mut project, 1, 1, 5).unwrap();
    stroke.paint(&mut project, 2, 1, 5).unwrap();
    stroke.paint(&mut project, 1, 1, 7).unwrap();
    history.push(&mut project, stroke, false).unwrap();

    assert_eq!(project.tilemaps["sMap"].get(1, 1), Some(7));
    assert_eq!(history.undo(&mut project).unwrap(), Some("Edit tilemap"));
    assert_eq!(project.tilemaps["sMap"].get(1, 1), Some(0));
    assert_eq!(project.tilemaps["sMap"].get(2, 1), Some(0));

    assert!(history.can_redo());
    history.redo(&mut project).unwrap();
    assert_eq!(project.tilemaps["sMap"].get(1, 1), Some(7));
    assert_eq!(project.tilemaps["sMap"].get(2, 1), Some(5));
}

#[test]
fn out_of_bounds_paint_is_rejected() {
    let mut project = project_with_assets();
    let mut stroke = EditTilemap::new("sMap");
    let err = stroke.paint(&mut project, 4, 0, 1).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidHandle);
    assert!(stroke.is_empty());

    let mut stroke = EditTilemap::new("sMissing");
    let err = stroke.paint(&mut project, 0, 0, 1).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::UnknownSymbol);
}

#[test]
fn pixel_stroke_reverts_whole_rows() {
    let mut project = project_with_assets();
    let mut history = ActionQueue::new();

    let mut stroke = PlotPixels::new("sGfx");
    stroke.plot(&mut project, 1, 0, 3, 3).unwrap();
    stroke.plot(&mut project, 1, 7, 3, 1).unwrap();
    history.push(&mut project, stroke, false).unwrap();
    assert_eq!(project.graphics["sGfx"].row_planes(1, 3), Some((0x81, 0x80)));

    history.undo(&mut project).unwrap();
    assert_eq!(project.graphics["sGfx"].row_planes(1, 3), Some((0, 0)));
    history.redo(&mut project).unwrap();
    assert_eq!(project.graphics["sGfx"].pixel(1, 0, 3), Some(3));
    assert_eq!(project.graphics["sGfx"].pixel(1, 7, 3), Some(1));
}

#[test]
fn tile_insert_and_delete_round_trip_through_history() {
    let mut project = project_with_assets();
    project
        .graphics
        .get_mut("sGfx")
        .unwrap()
        .set_pixel(0, 0, 0, 3);
    let mut history = ActionQueue::new();

    history
        .push(&mut project, AddTile::new("sGfx", 1), true)
        .unwrap();
    assert_eq!(project.graphics["sGfx"].tile_count(), 3);

    let delete = DeleteTile::new(&project, "sGfx", 0).unwrap();
    history.push(&mut project, delete, true).unwrap();
    assert_eq!(project.graphics["sGfx"].tile_count(), 2);
    assert_eq!(project.graphics["sGfx"].pixel(0, 0, 0), Some(0));

    history.undo(&mut project).unwrap();
    assert_eq!(project.graphics["sGfx"].pixel(0, 0, 0), Some(3));
    history.undo(&mut project).unwrap();
    assert_eq!(project.graphics["sGfx"].tile_count(), 2);
    assert_eq!(history.undo(&mut project).unwrap(), None);
}

#[test]
fn history_is_bounded_and_drops_redo_on_push() {
    let mut project = project_with_assets();
    let mut history = ActionQueue::new();

    for i in 0..12u8 {
        let mut stroke = EditTilemap::new("sMap");
        stroke.paint(&mut project, 0, 0, i + 1).unwrap();
        history.push(&mut project, stroke, false).unwrap();
    }
    assert_eq!(history.len(), 10);

    let mut undone = 0;
    while history.undo(&mut project).unwrap().is_some() {
        undone += 1;
    }
    assert_eq!(undone, 10);
    // The two oldest strokes fell off the log.
    assert_eq!(project.tilemaps["sMap"].get(0, 0), Some(2));

    history.redo(&mut project).unwrap();
    let mut stroke = EditTilemap::new("sMap");
    stroke.paint(&mut project, 3, 3, 9).unwrap();
    history.push(&mut project, stroke, false).unwrap();
    assert!(!history.can_redo());
    assert_eq!(history.len(), 2);
}
