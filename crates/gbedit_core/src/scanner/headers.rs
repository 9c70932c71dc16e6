use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Where one enum body starts and ends, and which enumerators to keep.
#[derive(Debug, Clone, Copy)]
pub struct EnumMarkers {
    pub open: &'static str,
    pub end: &'static str,
    pub prefix: &'static str,
}

pub const SPRITE_TYPES: EnumMarkers = EnumMarkers {
    open: "enum SpriteType",
    end: "STYPE_END",
    prefix: "STYPE",
};

pub const CLIPDATA_VALUES: EnumMarkers = EnumMarkers {
    open: "enum ClipdataValue",
    end: "CLIPDATA_END",
    prefix: "CLIPDATA",
};

/// Enumerator names between the `open` line and the `end` sentinel.
pub fn scan_enum<R: BufRead>(reader: R, markers: EnumMarkers) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut inside = false;

    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        if !inside {
            inside = line.contains(markers.open);
            continue;
        }
        if line.contains(markers.end) {
            break;
        }
        if !line.contains(markers.prefix) {
            continue;
        }
        let name = line
            .trim()
            .split([',', '=', ' ', '\t'])
            .next()
            .unwrap_or_default();
        if name.starts_with(markers.prefix) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

/// A missing header yields an empty table; the pickers just stay empty.
pub fn load_enum(path: &Path, markers: EnumMarkers) -> io::Result<Vec<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(header = %path.display(), "enum header not found, {} table left empty", markers.open);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };
    scan_enum(BufReader::new(file), markers)
}
