//! Recursive collection of Go source files under a root directory.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::TransformError;
use crate::syntax::{parse_source, SourceFile};

/// Canonical extension of collected files.
pub const GO_EXTENSION: &str = "go";

/// Walks `root` depth-first in lexicographic order and parses every `.go` file.
///
/// Directories are traversed but never collected. The returned order is the
/// walk order and is kept by every later phase.
///
/// # Errors
///
/// Fails on the first unreadable directory entry, unreadable file or file
/// that does not parse. No partial collection is returned.
pub fn collect_files(root: &Path) -> anyhow::Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(GO_EXTENSION) {
            continue;
        }
        files.push(read_file(root, path)?);
    }
    info!(root = %root.display(), count = files.len(), "collected source files");
    Ok(files)
}

/// Reads and parses one file, recording its path relative to `root`.
pub fn read_file(root: &Path, path: &Path) -> anyhow::Result<SourceFile> {
    let relative = path.strip_prefix(root).with_context(|| {
        format!(
            "internal error: {} is not below walk root {}",
            path.display(),
            root.display()
        )
    })?;
    let source = std::fs::read_to_string(path)
        .map_err(|e| TransformError::io("read", path, e))?;
    let file = parse_source(relative, &source)?;
    debug!(file = %relative.display(), package = %file.package, decls = file.decls.len(), "parsed");
    Ok(file)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_collects_go_files_in_walk_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.go", "package b\n");
        write(dir.path(), "a/z.go", "package a\n");
        write(dir.path(), "a/notes.txt", "not go");
        write(dir.path(), "a/inner/y.go", "package inner\n");
        write(dir.path(), "c.go.bak", "package c\n");

        let files = collect_files(dir.path()).unwrap();
        let paths: Vec<PathBuf> = files.iter().map(|f| f.relative_path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a/inner/y.go"),
                PathBuf::from("a/z.go"),
                PathBuf::from("b.go"),
            ]
        );
        assert_eq!(files[0].package, "inner");
    }

    #[test]
    fn test_parse_failure_aborts_collection() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.go", "package a\n");
        write(dir.path(), "b.go", "package b\n\ntype Broken struct {\n");

        let err = collect_files(dir.path()).unwrap_err();
        match err.downcast_ref::<TransformError>() {
            Some(TransformError::Parse { path, .. }) => assert_eq!(path, Path::new("b.go")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_files(&dir.path().join("absent")).is_err());
    }
}
