use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::core_api::{CoreError, CoreErrorCode, Project};
use crate::scanner::headers::{CLIPDATA_VALUES, SPRITE_TYPES, load_enum};
use crate::scanner::scan_declarations;

pub fn check_root_directory(root: &Path) -> Result<(), CoreError> {
    if !root.is_dir() {
        return Err(CoreError::new(
            CoreErrorCode::InvalidProject,
            format!("{} is not a directory", root.display()),
        ));
    }
    Ok(())
}

/// Checks that `root` looks like a game project: a directory holding the
/// build marker file.
pub fn check_project_root(root: &Path, config: &ProjectConfig) -> Result<(), CoreError> {
    check_root_directory(root)?;
    if !root.join(&config.build_marker).is_file() {
        return Err(CoreError::new(
            CoreErrorCode::InvalidProject,
            format!(
                "{} has no {} and is not a project root",
                root.display(),
                config.build_marker.display()
            ),
        ));
    }
    Ok(())
}

/// Every file below `dir` with the given extension, in sorted path order.
pub fn source_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, CoreError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|e| CoreError::io("list", &current, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::io("list", &current, e))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| CoreError::io("inspect", &path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|ext| ext.to_str()) == Some(extension) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

pub fn parse_file(project: &mut Project, path: &Path) -> Result<usize, CoreError> {
    let file = File::open(path).map_err(|e| CoreError::io("open", path, e))?;
    let declarations = scan_declarations(BufReader::new(file), path)?;
    let count = declarations.len();
    for declaration in declarations {
        project.insert_declaration(path, declaration);
    }
    Ok(count)
}

/// Full load: scan every source file, then the two enum headers.
pub fn parse_project(root: &Path, config: ProjectConfig) -> Result<Project, CoreError> {
    check_project_root(root, &config)?;

    let source_dir = root.join(&config.source_dir);
    if !source_dir.is_dir() {
        return Err(CoreError::new(
            CoreErrorCode::InvalidProject,
            format!("source directory {} does not exist", source_dir.display()),
        ));
    }

    let files = source_files(&source_dir, &config.source_extension)?;
    let sprite_header = root.join(&config.sprite_header);
    let clipdata_header = root.join(&config.clipdata_header);
    let mut project = Project::new(root, config);

    let mut declarations = 0usize;
    for path in &files {
        declarations += parse_file(&mut project, path)?;
    }

    project.sprite_ids = load_enum(&sprite_header, SPRITE_TYPES)
        .map_err(|e| CoreError::io("read", &sprite_header, e))?;
    project.clipdata_names = load_enum(&clipdata_header, CLIPDATA_VALUES)
        .map_err(|e| CoreError::io("read", &clipdata_header, e))?;

    tracing::info!(
        root = %root.display(),
        files = files.len(),
        declarations,
        symbols = project.symbols().len(),
        sprite_ids = project.sprite_ids.len(),
        clipdata = project.clipdata_names.len(),
        "loaded project"
    );
    Ok(project)
}
