use serde::{Deserialize, Serialize};

/// Row-major grid of tile indices. Rows are independent so an irregular
/// source never panics on access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tilemap {
    rows: Vec<Vec<u8>>,
}

impl Tilemap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rows: vec![vec![0; width]; height],
        }
    }

    pub fn from_rows(rows: Vec<Vec<u8>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Width of the first row, which is what the declaration header records.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|row| row.len() == width)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.rows.get(y)?.get(x).copied()
    }

    /// Returns the previous value.
    pub fn set(&mut self, x: usize, y: usize, value: u8) -> Option<u8> {
        let cell = self.rows.get_mut(y)?.get_mut(x)?;
        Some(std::mem::replace(cell, value))
    }

    /// Paint-bucket fill of the 4-connected region containing (x, y).
    /// Returns every cell that changed; all of them previously held the
    /// value found at (x, y).
    pub fn flood_fill(&mut self, x: usize, y: usize, value: u8) -> Vec<(usize, usize)> {
        let mut changed = Vec::new();
        let Some(target) = self.get(x, y) else {
            return changed;
        };
        if target == value {
            return changed;
        }

        let mut pending = vec![(x, y)];
        while let Some((cx, cy)) = pending.pop() {
            if self.get(cx, cy) != Some(target) {
                continue;
            }
            self.rows[cy][cx] = value;
            changed.push((cx, cy));

            if cx > 0 {
                pending.push((cx - 1, cy));
            }
            if cy > 0 {
                pending.push((cx, cy - 1));
            }
            pending.push((cx + 1, cy));
            pending.push((cx, cy + 1));
        }

        changed
    }
}
