use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::annotation::{self, Annotation};
use crate::collect::collect_files;
use crate::config::{Config, CONFIG_FILE};
use crate::error::TransformError;
use crate::generator::{Formatter, GoTemplate, GoWriter, WriteReport, WriteReports, GOFMT_ENV};
use crate::handlers::{
    go_file_name, CollectionTemplater, DeferredWrite, FieldAdder, InceptionTemplater, Templater,
};
use crate::tags::{discover, TagProcessor, DEFAULT_NAMESPACE};
use crate::transform::{
    add_import, add_named_import, change_package_name, drop_build_ignore, Pipeline, WriteOut,
};

/// Command-line interface for taggen
#[derive(Parser, Debug)]
#[command(name = "taggen")]
#[command(about = "Tag-driven Go code generation", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline described by a config file
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },
    /// List tagged declarations under a directory without writing anything
    Scan {
        /// Root directory to scan for Go files
        dir: PathBuf,

        /// Reserved namespace segment of marker packages
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,

        /// Print JSON instead of one line per match
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Outcome of [`run_config`].
#[derive(Debug)]
pub struct RunSummary {
    /// Number of Go files processed
    pub files: usize,
    /// Number of deferred handlers rendered after the pipeline
    pub deferred: usize,
    /// Files that were written without going through the formatter
    pub unformatted: Vec<WriteReport>,
}

/// One tagged declaration reported by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    pub file: PathBuf,
    pub declaration: String,
    pub tag_type: String,
    pub annotation: Annotation,
}

/// Execute the command provided by the user
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, a source file fails to
/// parse, or any transformation or handler fails.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run { config } => {
            let loaded = Config::load(&config)?;
            let summary = run_config(&loaded)?;
            for report in &summary.unformatted {
                if let Some(err) = &report.format_error {
                    eprintln!(
                        "warning: {} was written unformatted: {err}",
                        report.path.display()
                    );
                }
            }
            info!(
                config = %config.display(),
                files = summary.files,
                deferred = summary.deferred,
                unformatted = summary.unformatted.len(),
                "run complete"
            );
            Ok(())
        }
        Commands::Scan {
            dir,
            namespace,
            json,
        } => {
            let entries = scan(&dir, &namespace)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    println!(
                        "{}: {} {}",
                        entry.file.display(),
                        entry.declaration,
                        entry.tag_type
                    );
                }
            }
            Ok(())
        }
    }
}

/// Runs the pipeline a [`Config`] describes.
///
/// # Errors
///
/// The first failure of loading a template, reading the input tree, a
/// transformation, a handler or a deferred render. A formatter failure is not
/// an error: the file is written unformatted and listed in
/// [`RunSummary::unformatted`].
pub fn run_config(config: &Config) -> anyhow::Result<RunSummary> {
    let writer = writer_for(config);
    let mut deferred: Vec<Rc<RefCell<dyn DeferredWrite>>> = Vec::new();
    let mut writers: Vec<Rc<RefCell<dyn WriteReports>>> = Vec::new();

    let mut processor = TagProcessor::with_namespace(config.namespace.as_str());
    for field in &config.fields {
        processor.add_handler(
            field.tag.as_str(),
            FieldAdder::new(field.name.as_str(), field.ty.as_str())
                .with_import(field.import.as_str())
                .with_tag(field.field_tag.as_str()),
        );
    }
    for templater in &config.templaters {
        let template = load_template(&templater.template)?;
        let handler = Rc::new(RefCell::new(
            Templater::new(
                &templater.output_dir,
                template,
                go_file_name(templater.file_suffix.as_str()),
            )
            .with_writer(writer.clone()),
        ));
        let reporting = Rc::clone(&handler);
        writers.push(reporting);
        processor.add_handler(templater.tag.as_str(), handler);
    }
    for collection in &config.collections {
        let template = load_template(&collection.template)?;
        let handler = Rc::new(RefCell::new(
            CollectionTemplater::new(&collection.output, template)
                .deferred(collection.defer)
                .with_writer(writer.clone()),
        ));
        if collection.defer {
            let batched = Rc::clone(&handler);
            deferred.push(batched);
        }
        let reporting = Rc::clone(&handler);
        writers.push(reporting);
        processor.add_handler(collection.tag.as_str(), handler);
    }
    for inception in &config.inceptions {
        let template = load_template(&inception.template)?;
        let handler = Rc::new(RefCell::new(
            InceptionTemplater::new(&inception.output, template, inception.args.clone())
                .deferred(inception.defer)
                .with_writer(writer.clone()),
        ));
        if inception.defer {
            let batched = Rc::clone(&handler);
            deferred.push(batched);
        }
        let reporting = Rc::clone(&handler);
        writers.push(reporting);
        processor.add_handler(inception.tag.as_str(), handler);
    }

    let mut write_out = config
        .output
        .as_ref()
        .map(|output| WriteOut::with_writer(output, config.suffix.as_str(), writer));

    let mut pipeline = Pipeline::new();
    if config.drop_build_ignore {
        pipeline.add(drop_build_ignore());
    }
    pipeline.add(processor);
    if let Some(package) = &config.package {
        pipeline.add(change_package_name(package.as_str()));
    }
    for path in &config.imports {
        pipeline.add(add_import(path.as_str()));
    }
    for (name, path) in &config.named_imports {
        pipeline.add(add_named_import(name.as_str(), path.as_str()));
    }
    if let Some(write_out) = write_out.as_mut() {
        pipeline.add(write_out);
    }

    let files = pipeline.apply_dir(&config.input)?;
    drop(pipeline);

    for handler in &deferred {
        handler.borrow_mut().write_templates()?;
    }

    let mut reports = Vec::new();
    if let Some(write_out) = write_out.as_mut() {
        reports.extend(write_out.take_reports());
    }
    for handler in &writers {
        reports.extend(handler.borrow_mut().take_reports());
    }
    reports.retain(|report| !report.is_formatted());

    Ok(RunSummary {
        files: files.len(),
        deferred: deferred.len(),
        unformatted: reports,
    })
}

/// Lists every tagged declaration under `dir` with its parsed annotation.
///
/// Files on disk are left untouched.
///
/// # Errors
///
/// Unreadable or unparsable files, or a malformed annotation.
pub fn scan(dir: &Path, namespace: &str) -> anyhow::Result<Vec<ScanEntry>> {
    let mut entries = Vec::new();
    for mut file in collect_files(dir)? {
        for tag in discover(&mut file, namespace) {
            let annotation = annotation::parse(&tag.literal_tag)
                .map_err(|source| TransformError::Annotation {
                    declaration: tag.name.clone(),
                    source,
                })
                .with_context(|| format!("scanning {}", file.relative_path.display()))?;
            entries.push(ScanEntry {
                file: file.relative_path.clone(),
                declaration: tag.name,
                tag_type: tag.tag_type,
                annotation,
            });
        }
    }
    Ok(entries)
}

/// `TAGGEN_GOFMT` wins over the config's `formatter` key.
fn writer_for(config: &Config) -> GoWriter {
    match &config.formatter {
        Some(command) if std::env::var_os(GOFMT_ENV).is_none() => {
            GoWriter::new(Formatter::parse(command))
        }
        _ => GoWriter::from_env(),
    }
}

fn load_template(path: &Path) -> anyhow::Result<GoTemplate> {
    GoTemplate::from_path(path)
        .with_context(|| format!("Failed to load template: {}", path.display()))
}
