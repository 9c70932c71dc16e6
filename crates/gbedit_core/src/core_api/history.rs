use std::collections::VecDeque;
use std::fmt;

use crate::model::{Graphics, TILE_BYTES, Tilemap};

use super::error::{CoreError, CoreErrorCode};
use super::project::Project;

pub const HISTORY_CAPACITY: usize = 10;

/// A reversible edit. Actions name the asset they touch, so they stay valid
/// across unrelated inserts and removals.
pub trait Action: fmt::Debug {
    fn name(&self) -> &'static str;
    fn apply(&self, project: &mut Project) -> Result<(), CoreError>;
    fn revert(&self, project: &mut Project) -> Result<(), CoreError>;
}

/// Bounded undo log with a cursor: entries before it can be undone, entries
/// after it can be redone.
#[derive(Debug)]
pub struct ActionQueue {
    actions: VecDeque<Box<dyn Action>>,
    cursor: usize,
    capacity: usize,
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            actions: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Records `action`, applying it first when `perform` is set. Anything
    /// redoable is discarded; the oldest entry goes when the log is full.
    pub fn push<A: Action + 'static>(
        &mut self,
        project: &mut Project,
        action: A,
        perform: bool,
    ) -> Result<(), CoreError> {
        if perform {
            action.apply(project)?;
        }
        self.actions.truncate(self.cursor);
        if self.actions.len() == self.capacity {
            self.actions.pop_front();
            self.cursor -= 1;
        }
        tracing::debug!(action = action.name(), "recorded edit");
        self.actions.push_back(Box::new(action));
        self.cursor += 1;
        Ok(())
    }

    /// Returns the name of the undone action, or `None` with nothing to undo.
    pub fn undo(&mut self, project: &mut Project) -> Result<Option<&'static str>, CoreError> {
        if self.cursor == 0 {
            return Ok(None);
        }
        let action = &self.actions[self.cursor - 1];
        action.revert(project)?;
        self.cursor -= 1;
        Ok(Some(action.name()))
    }

    pub fn redo(&mut self, project: &mut Project) -> Result<Option<&'static str>, CoreError> {
        let Some(action) = self.actions.get(self.cursor) else {
            return Ok(None);
        };
        action.apply(project)?;
        self.cursor += 1;
        Ok(Some(action.name()))
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.actions.len()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.cursor = 0;
    }
}

fn tilemap_mut<'a>(project: &'a mut Project, name: &str) -> Result<&'a mut Tilemap, CoreError> {
    project
        .tilemaps
        .get_mut(name)
        .ok_or_else(|| CoreError::unknown_symbol(name))
}

fn graphics_mut<'a>(project: &'a mut Project, name: &str) -> Result<&'a mut Graphics, CoreError> {
    project
        .graphics
        .get_mut(name)
        .ok_or_else(|| CoreError::unknown_symbol(name))
}

fn out_of_bounds(what: String) -> CoreError {
    CoreError::new(CoreErrorCode::InvalidHandle, format!("{what} is out of bounds"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellEdit {
    x: usize,
    y: usize,
    old: u8,
    new: u8,
}

/// One brush stroke on a tilemap.
#[derive(Debug, Clone)]
pub struct EditTilemap {
    tilemap: String,
    edits: Vec<CellEdit>,
}

impl EditTilemap {
    pub fn new(tilemap: impl Into<String>) -> Self {
        Self {
            tilemap: tilemap.into(),
            edits: Vec::new(),
        }
    }

    /// Sets one cell and records it. Repainting a cell in the same stroke
    /// keeps its original value for undo.
    pub fn paint(
        &mut self,
        project: &mut Project,
        x: usize,
        y: usize,
        value: u8,
    ) -> Result<(), CoreError> {
        let tilemap = tilemap_mut(project, &self.tilemap)?;
        let old = tilemap
            .set(x, y, value)
            .ok_or_else(|| out_of_bounds(format!("{} cell ({x}, {y})", self.tilemap)))?;

        match self.edits.iter_mut().find(|e| e.x == x && e.y == y) {
            Some(edit) => edit.new = value,
            None => self.edits.push(CellEdit { x, y, old, new: value }),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    fn write(&self, project: &mut Project, undo: bool) -> Result<(), CoreError> {
        let tilemap = tilemap_mut(project, &self.tilemap)?;
        let edits: Box<dyn Iterator<Item = &CellEdit>> = if undo {
            Box::new(self.edits.iter().rev())
        } else {
            Box::new(self.edits.iter())
        };
        for edit in edits {
            let value = if undo { edit.old } else { edit.new };
            tilemap
                .set(edit.x, edit.y, value)
                .ok_or_else(|| out_of_bounds(format!("{} cell ({}, {})", self.tilemap, edit.x, edit.y)))?;
        }
        Ok(())
    }
}

impl Action for EditTilemap {
    fn name(&self) -> &'static str {
        "Edit tilemap"
    }

    fn apply(&self, project: &mut Project) -> Result<(), CoreError> {
        self.write(project, false)
    }

    fn revert(&self, project: &mut Project) -> Result<(), CoreError> {
        self.write(project, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowEdit {
    tile: usize,
    row: usize,
    old: (u8, u8),
    new: (u8, u8),
}

/// One pencil stroke on a graphics sheet, stored as whole pixel rows.
#[derive(Debug, Clone)]
pub struct PlotPixels {
    graphics: String,
    rows: Vec<RowEdit>,
}

impl PlotPixels {
    pub fn new(graphics: impl Into<String>) -> Self {
        Self {
            graphics: graphics.into(),
            rows: Vec::new(),
        }
    }

    pub fn plot(
        &mut self,
        project: &mut Project,
        tile: usize,
        x: usize,
        y: usize,
        color: u8,
    ) -> Result<(), CoreError> {
        let graphics = graphics_mut(project, &self.graphics)?;
        let bounds = || out_of_bounds(format!("{} tile {tile} pixel ({x}, {y})", self.graphics));
        let old = graphics.row_planes(tile, y).ok_or_else(bounds)?;
        graphics.set_pixel(tile, x, y, color).ok_or_else(bounds)?;
        let new = graphics.row_planes(tile, y).ok_or_else(bounds)?;

        match self.rows.iter_mut().find(|r| r.tile == tile && r.row == y) {
            Some(edit) => edit.new = new,
            None => self.rows.push(RowEdit {
                tile,
                row: y,
                old,
                new,
            }),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn write(&self, project: &mut Project, undo: bool) -> Result<(), CoreError> {
        let graphics = graphics_mut(project, &self.graphics)?;
        for edit in &self.rows {
            let planes = if undo { edit.old } else { edit.new };
            graphics
                .set_row_planes(edit.tile, edit.row, planes)
                .ok_or_else(|| {
                    out_of_bounds(format!("{} tile {} row {}", self.graphics, edit.tile, edit.row))
                })?;
        }
        Ok(())
    }
}

impl Action for PlotPixels {
    fn name(&self) -> &'static str {
        "Plot pixels"
    }

    fn apply(&self, project: &mut Project) -> Result<(), CoreError> {
        self.write(project, false)
    }

    fn revert(&self, project: &mut Project) -> Result<(), CoreError> {
        self.write(project, true)
    }
}

#[derive(Debug, Clone)]
pub struct AddTile {
    graphics: String,
    index: usize,
    tile: [u8; TILE_BYTES],
}

impl AddTile {
    /// A blank tile inserted at `index`.
    pub fn new(graphics: impl Into<String>, index: usize) -> Self {
        Self::with_data(graphics, index, [0; TILE_BYTES])
    }

    pub fn with_data(graphics: impl Into<String>, index: usize, tile: [u8; TILE_BYTES]) -> Self {
        Self {
            graphics: graphics.into(),
            index,
            tile,
        }
    }
}

impl Action for AddTile {
    fn name(&self) -> &'static str {
        "Add tile"
    }

    fn apply(&self, project: &mut Project) -> Result<(), CoreError> {
        graphics_mut(project, &self.graphics)?
            .insert_tile(self.index, self.tile)
            .ok_or_else(|| out_of_bounds(format!("{} tile {}", self.graphics, self.index)))
    }

    fn revert(&self, project: &mut Project) -> Result<(), CoreError> {
        graphics_mut(project, &self.graphics)?
            .remove_tile(self.index)
            .map(|_| ())
            .ok_or_else(|| out_of_bounds(format!("{} tile {}", self.graphics, self.index)))
    }
}

#[derive(Debug, Clone)]
pub struct DeleteTile {
    graphics: String,
    index: usize,
    removed: [u8; TILE_BYTES],
}

impl DeleteTile {
    /// Captures the tile's current bytes so the deletion can be reverted.
    pub fn new(project: &Project, graphics: impl Into<String>, index: usize) -> Result<Self, CoreError> {
        let graphics = graphics.into();
        let removed = project
            .graphics
            .get(&graphics)
            .ok_or_else(|| CoreError::unknown_symbol(&graphics))?
            .tile(index)
            .ok_or_else(|| out_of_bounds(format!("{graphics} tile {index}")))?;
        Ok(Self {
            graphics,
            index,
            removed,
        })
    }
}

impl Action for DeleteTile {
    fn name(&self) -> &'static str {
        "Delete tile"
    }

    fn apply(&self, project: &mut Project) -> Result<(), CoreError> {
        graphics_mut(project, &self.graphics)?
            .remove_tile(self.index)
            .map(|_| ())
            .ok_or_else(|| out_of_bounds(format!("{} tile {}", self.graphics, self.index)))
    }

    fn revert(&self, project: &mut Project) -> Result<(), CoreError> {
        graphics_mut(project, &self.graphics)?
            .insert_tile(self.index, self.removed)
            .ok_or_else(|| out_of_bounds(format!("{} tile {}", self.graphics, self.index)))
    }
}
