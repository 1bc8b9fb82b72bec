use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::FileTransformation;
use crate::error::TransformError;
use crate::generator::{GoWriter, WriteReport, WriteReports};
use crate::syntax::SourceFile;

/// Writes every file it sees to `output`, keeping its relative path and
/// inserting `suffix` before the extension.
///
/// `dir1/dir2/file.go` with suffix `_gen` ends up in
/// `output/dir1/dir2/file_gen.go`. Preparing the transformation removes stale
/// `*_gen.go` files from earlier runs.
#[derive(Debug)]
pub struct WriteOut {
    output: PathBuf,
    suffix: String,
    writer: GoWriter,
    reports: Vec<WriteReport>,
}

impl WriteOut {
    pub fn new(output: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self::with_writer(output, suffix, GoWriter::from_env())
    }

    pub fn with_writer(
        output: impl Into<PathBuf>,
        suffix: impl Into<String>,
        writer: GoWriter,
    ) -> Self {
        WriteOut {
            output: output.into(),
            suffix: suffix.into(),
            writer,
            reports: Vec::new(),
        }
    }

    /// Destination of a file with the given relative path.
    pub fn target(&self, relative_path: &Path) -> PathBuf {
        self.output.join(add_suffix(relative_path, &self.suffix))
    }

    /// Reports of every file written so far, including formatting failures.
    pub fn reports(&self) -> &[WriteReport] {
        &self.reports
    }
}

impl WriteReports for WriteOut {
    fn take_reports(&mut self) -> Vec<WriteReport> {
        std::mem::take(&mut self.reports)
    }
}

impl FileTransformation for WriteOut {
    fn prepare(&mut self) -> anyhow::Result<()> {
        prepare_dir(&self.output, &self.suffix).context("write out: failed to prepare directory")
    }

    fn apply(&mut self, file: &mut SourceFile) -> anyhow::Result<()> {
        let path = self.target(&file.relative_path);
        let report = self
            .writer
            .write_source_file(&path, file)
            .context("write out: failed to write file")?;
        self.reports.push(report);
        Ok(())
    }
}

/// Inserts `suffix` right before the file extension.
pub fn add_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned());
    let Some(stem) = stem else {
        return path.to_path_buf();
    };
    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(name)
}

/// Ensures `dir` exists and removes every file below it named `*<suffix>.go`.
pub fn prepare_dir(dir: &Path, suffix: &str) -> Result<(), TransformError> {
    match fs::metadata(dir) {
        Ok(_) => {
            let pattern = format!("{suffix}.go");
            let removed = delete_files(dir, |path| {
                path.file_name()
                    .is_some_and(|name| name.to_string_lossy().ends_with(&pattern))
            })?;
            info!(dir = %dir.display(), removed, "cleaned output directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "creating output directory");
            fs::create_dir_all(dir).map_err(|e| TransformError::io("create directory", dir, e))
        }
        Err(e) => Err(TransformError::io("stat", dir, e)),
    }
}

/// Recursively deletes every file below `root` matching `predicate`.
///
/// Returns the number of removed files.
pub fn delete_files(
    root: &Path,
    mut predicate: impl FnMut(&Path) -> bool,
) -> Result<usize, TransformError> {
    let mut removed = 0;
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            TransformError::io("walk", path, io::Error::from(e))
        })?;
        if entry.file_type().is_dir() || !predicate(entry.path()) {
            continue;
        }
        fs::remove_file(entry.path()).map_err(|e| TransformError::io("remove", entry.path(), e))?;
        removed += 1;
    }
    Ok(removed)
}
