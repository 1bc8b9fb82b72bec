//! # Error Taxonomy
//!
//! Every failure the pipeline can produce falls into one of the variants of
//! [`TransformError`]. Layers above the leaves propagate with [`anyhow::Result`]
//! and attach context (file, phase, handler) with [`anyhow::Context`], so the
//! top-level caller sees the full chain while tests can still recover the typed
//! cause with `err.downcast_ref::<TransformError>()`.
//!
//! | Variant      | Raised by                          | Effect                         |
//! |--------------|------------------------------------|--------------------------------|
//! | `Parse`      | file collection                    | aborts the whole scan          |
//! | `Annotation` | literal annotation parsing         | aborts that tag's dispatch     |
//! | `Shape`      | handlers expecting a struct/iface  | aborts that handler's match    |
//! | `Io`         | file writes, removals, directories | aborts the current phase       |
//! | `Subprocess` | inception program execution        | aborts the deferred render     |
//! | `Template`   | template compilation/rendering     | aborts the current render      |
//! | `Format`     | the Go formatter                   | non-fatal, reported only       |

use std::path::PathBuf;

use crate::annotation::AnnotationError;

/// Errors raised by the tag-driven generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A Go source file could not be parsed.
    #[error("failed to parse {path}:{line}:{column}: {message}")]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// 1-based line of the first syntax error
        line: usize,
        /// 1-based column of the first syntax error
        column: usize,
        /// Parser diagnostic
        message: String,
    },

    /// A marker member carried a malformed literal annotation.
    #[error("invalid annotation on {declaration}: {source}")]
    Annotation {
        /// Name of the tagged declaration
        declaration: String,
        /// Underlying annotation format error
        #[source]
        source: AnnotationError,
    },

    /// A handler received a declaration of the wrong kind.
    #[error("{declaration} is not a {expected} (found {found})")]
    Shape {
        /// Name of the tagged declaration
        declaration: String,
        /// Kind the handler requires
        expected: &'static str,
        /// Kind actually found
        found: &'static str,
    },

    /// Filesystem failure.
    #[error("{action} failed for {path}: {source}")]
    Io {
        /// What was being attempted (create, write, remove, ...)
        action: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A generated program failed to run or exited unsuccessfully.
    #[error("{program} failed ({status}) with stderr: {stderr}\nstdout: {stdout}")]
    Subprocess {
        /// Command line that was executed
        program: String,
        /// Exit status description
        status: String,
        /// Captured standard error, verbatim
        stderr: String,
        /// Captured standard output, verbatim
        stdout: String,
    },

    /// A template failed to compile or render.
    #[error("template {name}: {message}")]
    Template {
        /// Template name
        name: String,
        /// Engine diagnostic
        message: String,
    },

    /// The Go formatter rejected or could not process a buffer.
    #[error("formatting failed for {path}: {message}")]
    Format {
        /// Destination path of the buffer
        path: PathBuf,
        /// Formatter diagnostic
        message: String,
    },
}

impl TransformError {
    /// Shorthand for building an [`TransformError::Io`].
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransformError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Wraps a minijinja error with the template name.
    pub fn template(name: impl Into<String>, err: &minijinja::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        TransformError::Template {
            name: name.into(),
            message,
        }
    }
}
