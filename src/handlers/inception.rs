use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use tracing::{debug, info};

use super::entry::{TemplateCollection, TemplateEntry};
use super::DeferredWrite;
use crate::error::TransformError;
use crate::generator::{GoTemplate, GoWriter, WriteReport, WriteReports};
use crate::tags::{TagContext, TagHandler, TaggedDeclaration};

/// Environment variable overriding the `go` binary.
pub const GO_BIN_ENV: &str = "TAGGEN_GO_BIN";

/// Captured output of a program run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs a freshly generated source file as a program.
pub trait ProgramRunner {
    /// Runs `program` with `args`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// [`TransformError::Subprocess`] if the program cannot be started or
    /// exits unsuccessfully.
    fn run(&mut self, program: &Path, args: &[String]) -> Result<ProgramOutput, TransformError>;
}

impl<F> ProgramRunner for F
where
    F: FnMut(&Path, &[String]) -> Result<ProgramOutput, TransformError>,
{
    fn run(&mut self, program: &Path, args: &[String]) -> Result<ProgramOutput, TransformError> {
        self(program, args)
    }
}

/// Runs programs through an external command: `<command> <leading...> <file> <args...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRunner {
    command: String,
    leading_args: Vec<String>,
}

impl CommandRunner {
    pub fn new(command: impl Into<String>, leading_args: Vec<String>) -> Self {
        CommandRunner {
            command: command.into(),
            leading_args,
        }
    }

    /// `go run`, with the binary taken from `TAGGEN_GO_BIN` when set.
    pub fn go() -> Self {
        let go_bin = std::env::var(GO_BIN_ENV).unwrap_or_else(|_| "go".to_string());
        Self::new(go_bin, vec!["run".to_string()])
    }
}

impl ProgramRunner for CommandRunner {
    fn run(&mut self, program: &Path, args: &[String]) -> Result<ProgramOutput, TransformError> {
        let command_line = std::iter::once(self.command.clone())
            .chain(self.leading_args.iter().cloned())
            .chain(std::iter::once(program.display().to_string()))
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(command = %command_line, "running generated program");

        let output = Command::new(&self.command)
            .args(&self.leading_args)
            .arg(program)
            .args(args)
            .output()
            .map_err(|e| TransformError::Subprocess {
                program: command_line.clone(),
                status: format!("failed to start: {e}"),
                stderr: String::new(),
                stdout: String::new(),
            })?;

        let captured = ProgramOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !output.status.success() {
            return Err(TransformError::Subprocess {
                program: command_line,
                status: output.status.to_string(),
                stderr: captured.stderr,
                stdout: captured.stdout,
            });
        }
        Ok(captured)
    }
}

/// Renders all collected entries into a Go program and runs it.
///
/// This lets generated code use reflection over the very types being
/// processed: the first stage emits a program that imports them, the second
/// stage runs it and the program writes the final artifacts itself. The run
/// blocks without a timeout.
pub struct InceptionTemplater {
    output: PathBuf,
    template: GoTemplate,
    collection: TemplateCollection,
    args: Vec<String>,
    deferred: bool,
    runner: Box<dyn ProgramRunner>,
    writer: GoWriter,
    last_report: Option<WriteReport>,
    last_output: Option<ProgramOutput>,
}

impl InceptionTemplater {
    /// Renders to `output` and runs it with `go run output args...`.
    pub fn new(output: impl Into<PathBuf>, template: GoTemplate, args: Vec<String>) -> Self {
        InceptionTemplater {
            output: output.into(),
            template,
            collection: TemplateCollection::default(),
            args,
            deferred: false,
            runner: Box::new(CommandRunner::go()),
            writer: GoWriter::from_env(),
            last_report: None,
            last_output: None,
        }
    }

    pub fn deferred(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    pub fn with_mapper(mut self, mapper: impl FnMut(&mut TemplateEntry) + 'static) -> Self {
        self.collection.set_mapper(mapper);
        self
    }

    pub fn with_runner(mut self, runner: impl ProgramRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_writer(mut self, writer: GoWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        self.collection.entries()
    }

    /// Report of the most recent render of the program.
    pub fn last_report(&self) -> Option<&WriteReport> {
        self.last_report.as_ref()
    }

    /// Output captured from the most recent successful run.
    pub fn last_output(&self) -> Option<&ProgramOutput> {
        self.last_output.as_ref()
    }
}

impl TagHandler for InceptionTemplater {
    fn handle_tag(
        &mut self,
        ctx: &mut TagContext<'_>,
        tag: &TaggedDeclaration,
    ) -> anyhow::Result<()> {
        self.collection.add(ctx, tag)?;
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        if self.deferred {
            debug!(output = %self.output.display(), "inception deferred");
            return Ok(());
        }
        self.write_templates()
    }
}

impl WriteReports for InceptionTemplater {
    fn take_reports(&mut self) -> Vec<WriteReport> {
        self.last_report.take().into_iter().collect()
    }
}

impl DeferredWrite for InceptionTemplater {
    fn write_templates(&mut self) -> anyhow::Result<()> {
        let report = self
            .writer
            .write_template(&self.output, &self.template, self.collection.context())
            .with_context(|| format!("inception render to {}", self.output.display()))?;
        self.last_report = Some(report);

        let output = self
            .runner
            .run(&self.output, &self.args)
            .with_context(|| format!("inception run of {}", self.output.display()))?;
        info!(program = %self.output.display(), stdout = %output.stdout.trim_end(), "inception finished");
        self.last_output = Some(output);
        Ok(())
    }

    fn is_deferred(&self) -> bool {
        self.deferred
    }
}
