use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Every new symbol name must start with this character.
pub const SYMBOL_PREFIX: char = 's';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymbolKind {
    Graphics,
    Tilemap,
    SpriteData,
    DoorData,
    Animation,
    RoomData,
    Doors,
    Tilesets,
    CollisionTable,
    CollisionTableArray,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 10] = [
        Self::Graphics,
        Self::Tilemap,
        Self::SpriteData,
        Self::DoorData,
        Self::Animation,
        Self::RoomData,
        Self::Doors,
        Self::Tilesets,
        Self::CollisionTable,
        Self::CollisionTableArray,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Graphics => "Graphics",
            Self::Tilemap => "Tilemap",
            Self::SpriteData => "SpriteData",
            Self::DoorData => "DoorData",
            Self::Animation => "Animation",
            Self::RoomData => "RoomData",
            Self::Doors => "Doors",
            Self::Tilesets => "Tilesets",
            Self::CollisionTable => "CollisionTable",
            Self::CollisionTableArray => "CollisionTableArray",
        }
    }

    /// Case-insensitive lookup by [`SymbolKind::as_str`] name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    /// Kinds backed by exactly one project-wide table.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            Self::RoomData | Self::Doors | Self::Tilesets | Self::CollisionTableArray
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub kind: SymbolKind,
    pub name: String,
}

impl SymbolInfo {
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameIssue {
    Empty,
    MissingPrefix,
    AlreadyExists,
    /// The declaration emitted for this name would not scan back as `kind`.
    NotRecognised(SymbolKind),
}

impl fmt::Display for NameIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Empty => f.write_str("symbol name is empty"),
            Self::MissingPrefix => write!(f, "symbol name should start with '{SYMBOL_PREFIX}'"),
            Self::AlreadyExists => f.write_str("a symbol with this name already exists"),
            Self::NotRecognised(kind) => {
                write!(f, "a {kind} with this name would not be recognised on reload")
            }
        }
    }
}

/// Which symbols live in which source file, in discovery order, plus the
/// flat set of every name in use.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    associations: BTreeMap<PathBuf, Vec<SymbolInfo>>,
    existing: BTreeSet<String>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name` to `file`'s manifest. Registering the same symbol in
    /// the same file twice is a no-op so it is never emitted twice.
    pub fn register(&mut self, file: impl Into<PathBuf>, name: &str, kind: SymbolKind) {
        let symbols = self.associations.entry(file.into()).or_default();
        let info = SymbolInfo::new(kind, name);
        if !symbols.contains(&info) {
            symbols.push(info);
        }
        self.existing.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.existing.contains(name)
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &[SymbolInfo])> {
        self.associations
            .iter()
            .map(|(path, symbols)| (path.as_path(), symbols.as_slice()))
    }

    pub fn symbols_in(&self, file: &Path) -> &[SymbolInfo] {
        self.associations.get(file).map_or(&[], Vec::as_slice)
    }

    pub fn file_of(&self, name: &str) -> Option<(&Path, &SymbolInfo)> {
        self.associations.iter().find_map(|(path, symbols)| {
            symbols
                .iter()
                .find(|info| info.name == name)
                .map(|info| (path.as_path(), info))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.existing.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.associations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }

    pub fn validate_new_name(&self, name: &str) -> Result<(), NameIssue> {
        if name.is_empty() {
            return Err(NameIssue::Empty);
        }
        if !name.starts_with(SYMBOL_PREFIX) {
            return Err(NameIssue::MissingPrefix);
        }
        if self.contains(name) {
            return Err(NameIssue::AlreadyExists);
        }
        Ok(())
    }
}
