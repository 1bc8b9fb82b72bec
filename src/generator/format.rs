use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::error::TransformError;

/// Environment variable overriding the formatter command line.
pub const GOFMT_ENV: &str = "TAGGEN_GOFMT";

/// How Go buffers are formatted before they are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Formatter {
    /// Write buffers as rendered
    Disabled,
    /// `goimports`, falling back to `gofmt` when it is not installed
    #[default]
    GoImports,
    /// A command reading source on stdin and printing the result on stdout
    Command {
        program: String,
        args: Vec<String>,
    },
}

impl Formatter {
    /// Reads `TAGGEN_GOFMT`; unset means [`Formatter::GoImports`].
    pub fn from_env() -> Self {
        match std::env::var(GOFMT_ENV) {
            Ok(value) => Self::parse(&value),
            Err(_) => Formatter::GoImports,
        }
    }

    /// Parses a command line such as `gofmt -s`, or `none`/`off`.
    pub fn parse(value: &str) -> Self {
        let mut words = value.split_whitespace().map(str::to_string);
        match words.next() {
            None => Formatter::GoImports,
            Some(word) if matches!(word.to_lowercase().as_str(), "none" | "off") => {
                Formatter::Disabled
            }
            Some(program) => Formatter::Command {
                program,
                args: words.collect(),
            },
        }
    }

    /// Formats `source`, destined for `path`.
    ///
    /// # Errors
    ///
    /// [`TransformError::Format`] when the formatter cannot be started or
    /// rejects the buffer.
    pub fn format(&self, path: &Path, source: &str) -> Result<String, TransformError> {
        let format_error = |message: String| TransformError::Format {
            path: path.to_path_buf(),
            message,
        };

        let output = match self {
            Formatter::Disabled => return Ok(source.to_string()),
            Formatter::GoImports => {
                let mut args = Vec::new();
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    args.push("-srcdir".to_string());
                    args.push(dir.display().to_string());
                }
                match pipe_through("goimports", &args, source) {
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        debug!("goimports not found, falling back to gofmt");
                        pipe_through("gofmt", &[], source)
                            .map_err(|e| format_error(format!("failed to run gofmt: {e}")))?
                    }
                    other => {
                        other.map_err(|e| format_error(format!("failed to run goimports: {e}")))?
                    }
                }
            }
            Formatter::Command { program, args } => pipe_through(program, args, source)
                .map_err(|e| format_error(format!("failed to run {program}: {e}")))?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format_error(format!(
                "formatter exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| format_error(format!("formatter produced invalid UTF-8: {e}")))
    }
}

/// Runs `program` with `input` on stdin and collects its output.
fn pipe_through(program: &str, args: &[String], input: &str) -> io::Result<Output> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::other("stdin was not captured"))?;

    // Feed stdin from a second thread so a large buffer cannot deadlock
    // against a full stdout pipe.
    std::thread::scope(|scope| {
        let writer = scope.spawn(move || stdin.write_all(input.as_bytes()));
        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
        if output.status.success() {
            written?;
        }
        Ok(output)
    })
}
