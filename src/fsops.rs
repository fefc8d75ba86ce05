// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Filesystem glue
//!
//! Thin, glob-aware copy/delete helpers used by the stage functions when
//! staging build outputs, docker resources, and credential files.

use std::fs;
use std::path::Path;

use crate::errors::{StagehandError, StagehandResult};

/// Copy everything matching a glob pattern to a destination
///
/// A directory destination receives each match under its own base name;
/// a file destination is overwritten (parent directories are created).
/// Directory sources are copied recursively.
pub fn copy_matching(pattern: &str, dest: &Path) -> StagehandResult<()> {
    let sources: Vec<_> = glob::glob(pattern)?
        .filter_map(Result::ok)
        .collect();

    if sources.is_empty() {
        return Err(StagehandError::FileNotFound {
            path: pattern.into(),
            help: Some("No files matched the copy pattern".to_string()),
        });
    }

    for source in sources {
        let dest_path = if dest.is_dir() {
            match source.file_name() {
                Some(name) => dest.join(name),
                None => dest.to_path_buf(),
            }
        } else {
            dest.to_path_buf()
        };

        if source.is_dir() {
            copy_dir_recursive(&source, &dest_path)?;
        } else {
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&source, &dest_path).map_err(|e| StagehandError::FileCopyError {
                from: source.clone(),
                to: dest_path.clone(),
                error: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Copy the contents of a directory into another (the `src/.` idiom)
pub fn copy_dir_contents(source_dir: &Path, dest_dir: &Path) -> StagehandResult<()> {
    if !source_dir.is_dir() {
        return Err(StagehandError::FileNotFound {
            path: source_dir.to_path_buf(),
            help: Some("Expected a directory to copy from".to_string()),
        });
    }

    fs::create_dir_all(dest_dir)?;
    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        let target = dest_dir.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| StagehandError::FileCopyError {
                from: entry.path(),
                to: target.clone(),
                error: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Delete a file or directory; a missing path is an error
pub fn remove_path(path: &Path) -> StagehandResult<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else if path.is_file() || path.is_symlink() {
        fs::remove_file(path)?;
    } else {
        return Err(StagehandError::FileNotFound {
            path: path.to_path_buf(),
            help: None,
        });
    }

    Ok(())
}

fn copy_dir_recursive(source: &Path, dest: &Path) -> StagehandResult<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| StagehandError::FileCopyError {
                from: entry.path(),
                to: target.clone(),
                error: e.to_string(),
            })?;
        }
    }

    Ok(())
}
