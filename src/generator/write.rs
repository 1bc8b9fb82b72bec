use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::format::Formatter;
use super::templates::GoTemplate;
use crate::error::TransformError;
use crate::syntax::{print_file, SourceFile};

/// Outcome of a successful write.
#[derive(Debug)]
pub struct WriteReport {
    /// Path that was written
    pub path: PathBuf,
    /// Formatting failure; the unformatted buffer was written instead
    pub format_error: Option<TransformError>,
}

impl WriteReport {
    /// Whether the written buffer went through the formatter.
    pub fn is_formatted(&self) -> bool {
        self.format_error.is_none()
    }
}

/// Something that writes Go files and keeps the outcome of each write.
pub trait WriteReports {
    /// Hands over the reports gathered since the previous call.
    fn take_reports(&mut self) -> Vec<WriteReport>;
}

/// Formats Go buffers and writes them to disk.
#[derive(Debug, Clone, Default)]
pub struct GoWriter {
    formatter: Formatter,
}

impl GoWriter {
    pub fn new(formatter: Formatter) -> Self {
        GoWriter { formatter }
    }

    /// Writer configured from `TAGGEN_GOFMT`.
    pub fn from_env() -> Self {
        Self::new(Formatter::from_env())
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Formats `source` and writes it to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// [`TransformError::Io`] when the directory or file cannot be written.
    /// Formatting failures are reported in the returned [`WriteReport`].
    pub fn write_file(&self, path: &Path, source: &str) -> Result<WriteReport, TransformError> {
        let (contents, format_error) = match self.formatter.format(path, source) {
            Ok(formatted) => (formatted, None),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "writing unformatted output");
                (source.to_string(), Some(err))
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| TransformError::io("create directory", parent, e))?;
        }
        fs::write(path, contents).map_err(|e| TransformError::io("write", path, e))?;
        info!(path = %path.display(), "wrote Go file");

        Ok(WriteReport {
            path: path.to_path_buf(),
            format_error,
        })
    }

    /// Renders `template` against `context` and writes the result.
    pub fn write_template<S: Serialize>(
        &self,
        path: &Path,
        template: &GoTemplate,
        context: S,
    ) -> Result<WriteReport, TransformError> {
        let rendered = template.render(context)?;
        self.write_file(path, &rendered)
    }

    /// Prints a syntax tree and writes it.
    pub fn write_source_file(
        &self,
        path: &Path,
        file: &SourceFile,
    ) -> Result<WriteReport, TransformError> {
        self.write_file(path, &print_file(file))
    }
}
