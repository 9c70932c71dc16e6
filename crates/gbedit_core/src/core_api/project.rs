use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::config::ProjectConfig;
use crate::model::{
    AnimationFrame, CollisionTable, DOOR_TARGET_NONE, Door, DoorData, Graphics, OamEntry, Physics,
    Room, SpriteData, TILESET_NONE, Tilemap, animation::Animation,
};
use crate::emitter::emit_declaration;
use crate::scanner::{Declaration, scan_str};
use crate::symbols::{NameIssue, SymbolKind, SymbolRegistry};

use super::error::{CoreError, CoreErrorCode};

/// One screen of tiles.
pub const DEFAULT_TILEMAP_WIDTH: usize = 20;
pub const DEFAULT_TILEMAP_HEIGHT: usize = 18;
pub const DEFAULT_FRAME_DURATION: u8 = 60;

/// Everything loaded from one project tree. Editors hold symbol names or
/// indices into this value, never references.
#[derive(Debug, Clone, Default)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
    symbols: SymbolRegistry,
    physics_file: Option<PathBuf>,

    pub graphics: BTreeMap<String, Graphics>,
    pub tilemaps: BTreeMap<String, Tilemap>,
    pub rooms: Vec<Room>,
    pub doors: Vec<Door>,
    pub sprites: BTreeMap<String, Vec<SpriteData>>,
    pub door_data: BTreeMap<String, DoorData>,
    pub animations: BTreeMap<String, Animation>,
    /// Graphics symbol names usable as door tilesets.
    pub tilesets: Vec<String>,
    pub collision_tables: BTreeMap<String, CollisionTable>,
    /// Collision table symbol names, indexed by `Room::collision_table`.
    pub collision_table_array: Vec<String>,
    pub physics: Option<Physics>,

    /// `enum SpriteType` enumerators.
    pub sprite_ids: Vec<String>,
    /// `enum ClipdataValue` enumerators.
    pub clipdata_names: Vec<String>,
}

/// Outcome of [`Project::delete_door`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorDeletion {
    pub removed: Door,
    /// Post-deletion indices of doors whose target was the removed door.
    /// Their `target_door` is now [`DOOR_TARGET_NONE`] and needs reassigning.
    pub orphaned: Vec<usize>,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
            ..Self::default()
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn symbols(&self) -> &SymbolRegistry {
        &self.symbols
    }

    pub fn physics_file(&self) -> Option<&Path> {
        self.physics_file.as_deref()
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.config.source_dir)
    }

    pub fn register_symbol(&mut self, file: impl Into<PathBuf>, name: &str, kind: SymbolKind) {
        self.symbols.register(file, name, kind);
    }

    pub fn validate_new_name(&self, name: &str) -> Result<(), NameIssue> {
        self.symbols.validate_new_name(name)
    }

    /// Stores a decoded declaration and records where it came from.
    pub fn insert_declaration(&mut self, file: &Path, declaration: Declaration) {
        if let Some((name, kind)) = declaration.symbol() {
            self.symbols.register(file, name, kind);
        }
        match declaration {
            Declaration::Graphics { name, graphics } => {
                self.graphics.insert(name, graphics);
            }
            Declaration::Tilemap { name, tilemap } => {
                self.tilemaps.insert(name, tilemap);
            }
            Declaration::Rooms { rooms, .. } => self.rooms.extend(rooms),
            Declaration::SpriteData { name, sprites } => {
                self.sprites.insert(name, sprites);
            }
            Declaration::Animation { name, animation } => {
                self.animations.insert(name, animation);
            }
            Declaration::DoorData { name, doors } => {
                self.door_data.insert(name, doors);
            }
            Declaration::Doors { doors, .. } => self.doors.extend(doors),
            Declaration::Tilesets { tilesets, .. } => self.tilesets.extend(tilesets),
            Declaration::CollisionTable { name, table } => {
                self.collision_tables.insert(name, table);
            }
            Declaration::CollisionTableArray { tables, .. } => {
                self.collision_table_array.extend(tables)
            }
            Declaration::Physics(physics) => {
                self.physics = Some(physics);
                self.physics_file = Some(file.to_path_buf());
            }
        }
    }

    /// Checks `name` for a new asset of `kind`. On top of the registry
    /// rules, the declaration written for it must scan back as the same
    /// kind, since the scanner classifies arrays by markers in their names.
    pub fn validate_resource_name(&self, kind: SymbolKind, name: &str) -> Result<(), NameIssue> {
        self.validate_new_name(name)?;
        match default_declaration(kind, name) {
            Some(declaration) if !reads_back(&declaration) => {
                Err(NameIssue::NotRecognised(kind))
            }
            _ => Ok(()),
        }
    }

    /// Creates a default-valued asset of `kind` named `name` in `file`
    /// (relative to the project root, or absolute inside it).
    pub fn add_resource(
        &mut self,
        kind: SymbolKind,
        file: &Path,
        name: &str,
    ) -> Result<(), CoreError> {
        if kind.is_singleton() {
            return Err(CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                format!("{kind} is a project-wide table and cannot be added by name"),
            ));
        }
        self.validate_resource_name(kind, name).map_err(|issue| {
            CoreError::new(CoreErrorCode::InvalidName, format!("{name}: {issue}"))
        })?;
        let path = self.source_file_path(file)?;

        tracing::info!(symbol = %name, %kind, file = %path.display(), "added resource");
        if let Some(declaration) = default_declaration(kind, name) {
            self.insert_declaration(&path, declaration);
        }
        Ok(())
    }

    /// Resolves `file` to an existing source file under the source directory.
    fn source_file_path(&self, file: &Path) -> Result<PathBuf, CoreError> {
        let path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.root.join(file)
        };
        let climbs = file
            .components()
            .any(|component| matches!(component, Component::ParentDir));
        let extension = path.extension().and_then(|ext| ext.to_str());
        if climbs
            || !path.starts_with(self.source_dir())
            || extension != Some(self.config.source_extension.as_str())
            || !path.is_file()
        {
            return Err(CoreError::new(
                CoreErrorCode::InvalidProject,
                format!("{} is not a source file of this project", path.display()),
            ));
        }
        Ok(path)
    }

    pub fn add_room(&mut self, room: Room) -> usize {
        self.rooms.push(room);
        self.rooms.len() - 1
    }

    pub fn add_door(&mut self, door: Door) -> usize {
        self.doors.push(door);
        self.doors.len() - 1
    }

    pub fn add_tileset(&mut self, graphics: impl Into<String>) -> usize {
        self.tilesets.push(graphics.into());
        self.tilesets.len() - 1
    }

    pub fn door(&self, index: usize) -> Result<&Door, CoreError> {
        self.doors.get(index).ok_or_else(|| invalid_handle("door", index))
    }

    pub fn door_mut(&mut self, index: usize) -> Result<&mut Door, CoreError> {
        self.doors
            .get_mut(index)
            .ok_or_else(|| invalid_handle("door", index))
    }

    pub fn room(&self, index: usize) -> Result<&Room, CoreError> {
        self.rooms.get(index).ok_or_else(|| invalid_handle("room", index))
    }

    pub fn room_mut(&mut self, index: usize) -> Result<&mut Room, CoreError> {
        self.rooms
            .get_mut(index)
            .ok_or_else(|| invalid_handle("room", index))
    }

    /// Index of the first door structurally equal to `door`.
    pub fn door_index(&self, door: &Door) -> Option<usize> {
        self.doors.iter().position(|d| d == door)
    }

    /// Removes a door and renumbers every reference to the door table.
    pub fn delete_door(&mut self, index: usize) -> Result<DoorDeletion, CoreError> {
        if index >= self.doors.len() {
            return Err(invalid_handle("door", index));
        }
        let removed = self.doors.remove(index);

        for doors in self.door_data.values_mut() {
            doors.retain(|&d| usize::from(d) != index);
            for d in doors.iter_mut() {
                if usize::from(*d) > index {
                    *d -= 1;
                }
            }
        }

        let mut orphaned = Vec::new();
        for (position, door) in self.doors.iter_mut().enumerate() {
            if !door.has_target() {
                continue;
            }
            let target = usize::from(door.target_door);
            if target > index {
                door.target_door -= 1;
            } else if target == index {
                door.target_door = DOOR_TARGET_NONE;
                orphaned.push(position);
            }
        }

        if !orphaned.is_empty() {
            tracing::warn!(
                deleted = index,
                ?orphaned,
                "doors lost their target and need reassigning"
            );
        }
        Ok(DoorDeletion { removed, orphaned })
    }

    /// Removes a tileset and renumbers every door that loads one.
    pub fn delete_tileset(&mut self, index: usize) -> Result<String, CoreError> {
        if index >= self.tilesets.len() {
            return Err(invalid_handle("tileset", index));
        }
        let removed = self.tilesets.remove(index);

        for door in &mut self.doors {
            if !door.loads_tileset() {
                continue;
            }
            let tileset = usize::from(door.tileset);
            if tileset == index {
                door.tileset = TILESET_NONE;
            } else if tileset > index {
                door.tileset -= 1;
            }
        }
        Ok(removed)
    }
}

/// The value a newly added asset starts with. `None` for project-wide tables.
fn default_declaration(kind: SymbolKind, name: &str) -> Option<Declaration> {
    let name = name.to_string();
    let declaration = match kind {
        SymbolKind::Graphics => Declaration::Graphics {
            name,
            graphics: Graphics::blank(1),
        },
        SymbolKind::Tilemap => Declaration::Tilemap {
            name,
            tilemap: Tilemap::new(DEFAULT_TILEMAP_WIDTH, DEFAULT_TILEMAP_HEIGHT),
        },
        SymbolKind::Animation => Declaration::Animation {
            name,
            animation: vec![AnimationFrame {
                oam: vec![OamEntry::default()],
                duration: DEFAULT_FRAME_DURATION,
            }],
        },
        SymbolKind::SpriteData => Declaration::SpriteData {
            name,
            sprites: Vec::new(),
        },
        SymbolKind::DoorData => Declaration::DoorData {
            name,
            doors: Vec::new(),
        },
        SymbolKind::CollisionTable => Declaration::CollisionTable {
            name,
            table: Vec::new(),
        },
        SymbolKind::RoomData
        | SymbolKind::Doors
        | SymbolKind::Tilesets
        | SymbolKind::CollisionTableArray => return None,
    };
    Some(declaration)
}

fn reads_back(declaration: &Declaration) -> bool {
    let mut text = String::new();
    if emit_declaration(&mut text, declaration).is_err() {
        return false;
    }
    matches!(
        scan_str(&text, Path::new("<new resource>")).as_deref(),
        Ok([scanned]) if scanned == declaration
    )
}

fn invalid_handle(what: &str, index: usize) -> CoreError {
    CoreError::new(
        CoreErrorCode::InvalidHandle,
        format!("{what} {index} does not exist"),
    )
}
