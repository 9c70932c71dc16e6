use serde::{Deserialize, Serialize};

/// Bytes per 8x8 2bpp tile.
pub const TILE_BYTES: usize = 16;
/// Pixels per tile edge.
pub const TILE_PIXELS: usize = 8;

/// Tile data as stored in ROM: two interleaved bit-planes per pixel row, so
/// row `r` of a tile is the byte pair at `r * 2` (low plane) and `r * 2 + 1`
/// (high plane). Bit 7 is the leftmost pixel.
///
/// The length is always a multiple of [`TILE_BYTES`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graphics {
    bytes: Vec<u8>,
}

impl Graphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blank(tiles: usize) -> Self {
        Self {
            bytes: vec![0; tiles * TILE_BYTES],
        }
    }

    /// Fails with the offending length when it is not a whole number of tiles.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, usize> {
        if bytes.len() % TILE_BYTES != 0 {
            return Err(bytes.len());
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn tile_count(&self) -> usize {
        self.bytes.len() / TILE_BYTES
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn tile(&self, index: usize) -> Option<[u8; TILE_BYTES]> {
        let start = index.checked_mul(TILE_BYTES)?;
        let slice = self.bytes.get(start..start + TILE_BYTES)?;
        let mut tile = [0u8; TILE_BYTES];
        tile.copy_from_slice(slice);
        Some(tile)
    }

    /// Returns the (low, high) plane bytes of one pixel row.
    pub fn row_planes(&self, tile: usize, row: usize) -> Option<(u8, u8)> {
        let offset = row_offset(tile, row, self.tile_count())?;
        Some((self.bytes[offset], self.bytes[offset + 1]))
    }

    pub fn set_row_planes(&mut self, tile: usize, row: usize, planes: (u8, u8)) -> Option<()> {
        let offset = row_offset(tile, row, self.tile_count())?;
        self.bytes[offset] = planes.0;
        self.bytes[offset + 1] = planes.1;
        Some(())
    }

    /// Colour index 0..=3 of one pixel.
    pub fn pixel(&self, tile: usize, x: usize, y: usize) -> Option<u8> {
        if x >= TILE_PIXELS {
            return None;
        }
        let (low, high) = self.row_planes(tile, y)?;
        let bit = 7 - x;
        Some(((low >> bit) & 1) | (((high >> bit) & 1) << 1))
    }

    pub fn set_pixel(&mut self, tile: usize, x: usize, y: usize, value: u8) -> Option<()> {
        if x >= TILE_PIXELS {
            return None;
        }
        let (low, high) = self.row_planes(tile, y)?;
        let mask = 1u8 << (7 - x);
        let low = if value & 1 != 0 { low | mask } else { low & !mask };
        let high = if value & 2 != 0 { high | mask } else { high & !mask };
        self.set_row_planes(tile, y, (low, high))
    }

    pub fn insert_tile(&mut self, index: usize, tile: [u8; TILE_BYTES]) -> Option<()> {
        if index > self.tile_count() {
            return None;
        }
        let at = index * TILE_BYTES;
        self.bytes.splice(at..at, tile);
        Some(())
    }

    pub fn remove_tile(&mut self, index: usize) -> Option<[u8; TILE_BYTES]> {
        let tile = self.tile(index)?;
        let at = index * TILE_BYTES;
        self.bytes.drain(at..at + TILE_BYTES);
        Some(tile)
    }
}

fn row_offset(tile: usize, row: usize, tile_count: usize) -> Option<usize> {
    if tile >= tile_count || row >= TILE_PIXELS {
        return None;
    }
    Some(tile * TILE_BYTES + row * 2)
}
