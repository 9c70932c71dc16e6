//! In-place rewriting of source files: symbol blocks are cut out, the
//! surrounding text is kept line for line, and fresh blocks are appended.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core_api::{CoreError, CoreErrorCode, Project};
use crate::emitter::{emit_symbol, physics_lines};
use crate::layout::{BlockId, FileLayout, LineRange};
use crate::model::Physics;
use crate::scanner::PHYSICS_MARKER;
use crate::scanner::sections::{
    FRAME_MARKER, SPRITE_ANIM_TERMINATOR, is_closing, is_forward_declaration,
};
use crate::symbols::{SymbolInfo, SymbolKind};

pub const INCLUDE_TOKEN: &str = "#include";

/// What one [`save_project`] call wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub files: usize,
    pub symbols: usize,
    pub physics: bool,
}

fn identifiers(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
}

fn is_frame_array_of(identifier: &str, animation: &str) -> bool {
    identifier
        .strip_prefix(animation)
        .and_then(|rest| rest.strip_prefix(FRAME_MARKER))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

/// True when `line` opens the definition of `symbol`.
pub fn declares(line: &str, symbol: &SymbolInfo) -> bool {
    if !line.contains("const") || line.contains("extern") || is_forward_declaration(line) {
        return false;
    }
    identifiers(line).any(|identifier| {
        identifier == symbol.name
            || (symbol.kind == SymbolKind::Animation && is_frame_array_of(identifier, &symbol.name))
    })
}

/// Lines owned by `symbol`: its declaration through the closing `};`, plus
/// the blank separator line directly above it.
pub fn locate_block(lines: &[String], symbol: &SymbolInfo) -> Option<LineRange> {
    let start = lines.iter().position(|line| declares(line, symbol))?;

    let opener = &lines[start];
    let single_line = opener.contains('{') && opener.trim_end().ends_with("};");
    let last = if single_line {
        start
    } else if symbol.kind == SymbolKind::Animation {
        let terminator = (start..lines.len()).find(|&i| lines[i].contains(SPRITE_ANIM_TERMINATOR))?;
        (terminator + 1..lines.len()).find(|&i| is_closing(&lines[i]))?
    } else {
        (start + 1..lines.len()).find(|&i| lines[i].trim_start().starts_with("};"))?
    };

    let start = match start.checked_sub(1) {
        Some(above) if lines[above].trim().is_empty() => above,
        _ => start,
    };
    Some(LineRange {
        start,
        end: last + 1,
    })
}

/// Layout of `lines` with one block per symbol found in them. Symbols
/// without a block in the text are skipped.
pub fn file_layout(lines: &[String], symbols: &[SymbolInfo]) -> Result<FileLayout, CoreError> {
    let blocks = symbols
        .iter()
        .enumerate()
        .filter_map(|(index, symbol)| locate_block(lines, symbol).map(|range| (index, range)))
        .collect();
    FileLayout::from_symbol_blocks(lines.len(), blocks)
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Every passthrough line of `layout`, with trailing blank lines dropped.
pub fn strip_blocks<L: AsRef<[u8]> + Clone>(lines: &[L], layout: &FileLayout) -> Vec<L> {
    let mut kept: Vec<L> = layout
        .blocks
        .iter()
        .filter(|block| block.id == BlockId::Passthrough)
        .flat_map(|block| lines[block.range.start..block.range.end].iter().cloned())
        .collect();
    while kept.last().is_some_and(|line| is_blank(line.as_ref())) {
        kept.pop();
    }
    kept
}

/// Drops every include line identical to one seen earlier.
pub fn remove_duplicate_includes<L: AsRef<[u8]> + Clone + PartialEq>(lines: Vec<L>) -> Vec<L> {
    let mut seen: Vec<L> = Vec::new();
    lines
        .into_iter()
        .filter(|line| {
            if !contains_bytes(line.as_ref(), INCLUDE_TOKEN.as_bytes()) {
                return true;
            }
            if seen.contains(line) {
                return false;
            }
            seen.push(line.clone());
            true
        })
        .collect()
}

/// `#include "<dir>.h"` for a file in a subdirectory of the source dir.
pub fn include_line(source_dir: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(source_dir).ok()?;
    let directory = relative.parent()?.file_name()?.to_str()?;
    Some(format!("{INCLUDE_TOKEN} \"{directory}.h\""))
}

/// Replaces the six assignments inside the `PlayerInitPhysics` definition.
/// Prototypes of the function are skipped.
pub fn rewrite_physics<L: AsRef<[u8]> + From<String>>(
    lines: &mut [L],
    physics: &Physics,
    path: &Path,
) -> Result<(), CoreError> {
    let parse_error = |message: String| {
        CoreError::new(
            CoreErrorCode::Parse,
            format!("{}: {message}", path.display()),
        )
    };
    let view = lossy_view(lines);

    let marker = view
        .iter()
        .position(|line| line.starts_with(PHYSICS_MARKER) && !is_forward_declaration(line))
        .ok_or_else(|| parse_error(format!("no `{PHYSICS_MARKER}` found")))?;
    let open = (marker + 1..view.len())
        .find(|&i| !view[i].trim().is_empty())
        .filter(|&i| view[i].trim() == "{")
        .ok_or_else(|| parse_error("physics initializer has no `{` line".to_string()))?;

    let body = open + 1..open + 1 + 6;
    if body.end > view.len()
        || !view[body.clone()]
            .iter()
            .all(|line| line.contains('=') && line.trim_end().ends_with(';'))
    {
        return Err(parse_error(
            "physics initializer does not start with six assignments".to_string(),
        ));
    }

    for (line, replacement) in lines[body].iter_mut().zip(physics_lines(physics)) {
        *line = L::from(replacement);
    }
    Ok(())
}

/// Lines of a file without their terminators. Bytes are kept as read so
/// passthrough text in any encoding survives a save.
pub fn split_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect()
}

/// UTF-8 view of raw lines for matching; invalid bytes become U+FFFD.
fn lossy_view<L: AsRef<[u8]>>(lines: &[L]) -> Vec<String> {
    lines
        .iter()
        .map(|line| String::from_utf8_lossy(line.as_ref()).into_owned())
        .collect()
}

fn join_lines(lines: &[Vec<u8>]) -> Vec<u8> {
    let mut out = lines.join(&b'\n');
    out.push(b'\n');
    out
}

fn read_source(path: &Path) -> Result<Vec<u8>, CoreError> {
    fs::read(path).map_err(|e| CoreError::io("read", path, e))
}

fn text_lines(text: &str) -> impl Iterator<Item = Vec<u8>> + '_ {
    text.lines().map(|line| line.as_bytes().to_vec())
}

/// Writes `contents` next to `path` and renames it over the original.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), CoreError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("{} has no file name", path.display()),
            )
        })?;
    let temp: PathBuf = path.with_file_name(format!(".{file_name}.gbedit-tmp"));

    fs::write(&temp, contents).map_err(|e| CoreError::io("write", &temp, e))?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(CoreError::io("replace", path, e));
    }
    Ok(())
}

/// Rebuilds one file's lines: blocks removed, physics rewritten, include
/// appended, symbols re-emitted, duplicate includes dropped.
pub fn rebuild_file(
    project: &Project,
    path: &Path,
    lines: Vec<Vec<u8>>,
) -> Result<Vec<Vec<u8>>, CoreError> {
    let symbols = project.symbols().symbols_in(path);
    let layout = file_layout(&lossy_view(&lines), symbols)?;
    let mut rebuilt = strip_blocks(&lines, &layout);

    if project.physics_file() == Some(path)
        && let Some(physics) = &project.physics
    {
        rewrite_physics(&mut rebuilt, physics, path)?;
    }

    if !symbols.is_empty() {
        if let Some(include) = include_line(&project.source_dir(), path) {
            rebuilt.push(include.into_bytes());
        }
        for symbol in symbols {
            let block = emit_symbol(project, symbol)?;
            tracing::debug!(file = %path.display(), symbol = %symbol.name, kind = %symbol.kind, "emitted symbol");
            rebuilt.extend(text_lines(&block));
        }
    }

    Ok(remove_duplicate_includes(rebuilt))
}

/// A rebuilt file that has not been written yet.
struct PendingFile<'a> {
    path: &'a Path,
    original: Vec<u8>,
    rebuilt: Vec<u8>,
}

impl PendingFile<'_> {
    fn is_changed(&self) -> bool {
        self.original != self.rebuilt
    }
}

fn prepare_file<'a>(project: &Project, path: &'a Path) -> Result<PendingFile<'a>, CoreError> {
    let original = read_source(path)?;
    let rebuilt = join_lines(&rebuild_file(project, path, split_lines(&original))?);
    Ok(PendingFile {
        path,
        original,
        rebuilt,
    })
}

/// Writes every changed file. When a write fails, the files already
/// written get their original bytes back.
fn commit(pending: &[PendingFile<'_>]) -> Result<(), CoreError> {
    for (index, file) in pending.iter().enumerate() {
        if !file.is_changed() {
            continue;
        }
        if let Err(err) = write_atomic(file.path, &file.rebuilt) {
            for done in pending[..index].iter().rev().filter(|f| f.is_changed()) {
                if let Err(restore) = write_atomic(done.path, &done.original) {
                    tracing::error!(file = %done.path.display(), error = %restore, "could not restore file");
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

/// Rewrites one file with a single atomic write.
pub fn save_file(project: &Project, path: &Path) -> Result<(), CoreError> {
    commit(&[prepare_file(project, path)?])
}

/// Removes the existing block of `symbol` from `path` and appends a fresh
/// emission of its current value.
pub fn replace_symbol(project: &Project, path: &Path, symbol: &SymbolInfo) -> Result<(), CoreError> {
    let lines = split_lines(&read_source(path)?);
    let layout = file_layout(&lossy_view(&lines), std::slice::from_ref(symbol))?;
    let mut rebuilt = strip_blocks(&lines, &layout);
    let block = emit_symbol(project, symbol)?;
    rebuilt.extend(text_lines(&block));
    write_atomic(path, &join_lines(&rebuilt))
}

/// Saves every file that holds a registered symbol, plus the physics file.
/// Every file is rebuilt in memory before the first one is written, so an
/// asset that cannot be emitted leaves the whole tree untouched.
pub fn save_project(project: &Project) -> Result<SaveSummary, CoreError> {
    let mut summary = SaveSummary::default();
    let mut pending = Vec::new();

    for (path, symbols) in project.symbols().files() {
        pending.push(prepare_file(project, path)?);
        summary.files += 1;
        summary.symbols += symbols.len();
    }

    if let (Some(path), Some(_)) = (project.physics_file(), project.physics) {
        if project.symbols().symbols_in(path).is_empty() {
            pending.push(prepare_file(project, path)?);
            summary.files += 1;
        }
        summary.physics = true;
    }

    commit(&pending)?;

    tracing::info!(
        files = summary.files,
        symbols = summary.symbols,
        changed = pending.iter().filter(|file| file.is_changed()).count(),
        physics = summary.physics,
        "saved project"
    );
    Ok(summary)
}
