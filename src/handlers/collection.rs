use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use super::entry::{TemplateCollection, TemplateEntry};
use super::DeferredWrite;
use crate::generator::{GoTemplate, GoWriter, WriteReport, WriteReports};
use crate::tags::{TagContext, TagHandler, TaggedDeclaration};

/// Collects every tagged declaration of a run and renders them into one file.
///
/// The template sees `entries`, the ordered list of [`TemplateEntry`] values,
/// and `package`, the package of the first entry:
///
/// ```text
/// package {{ package }}
///
/// var Registry = []any{
/// {%- for e in entries %}
///     {{ e.name }}{},
/// {%- endfor %}
/// }
/// ```
///
/// Rendering happens in `finalize`, unless the templater is deferred; then the
/// caller triggers it through [`DeferredWrite::write_templates`].
#[derive(Debug)]
pub struct CollectionTemplater {
    output: PathBuf,
    template: GoTemplate,
    collection: TemplateCollection,
    deferred: bool,
    writer: GoWriter,
    last_report: Option<WriteReport>,
}

impl CollectionTemplater {
    pub fn new(output: impl Into<PathBuf>, template: GoTemplate) -> Self {
        CollectionTemplater {
            output: output.into(),
            template,
            collection: TemplateCollection::default(),
            deferred: false,
            writer: GoWriter::from_env(),
            last_report: None,
        }
    }

    /// Skips the render in `finalize`.
    pub fn deferred(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    /// Applies `mapper` to each entry as it is collected; derived values go
    /// into `entry.data`.
    pub fn with_mapper(mut self, mapper: impl FnMut(&mut TemplateEntry) + 'static) -> Self {
        self.collection.set_mapper(mapper);
        self
    }

    pub fn with_writer(mut self, writer: GoWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        self.collection.entries()
    }

    /// Report of the most recent render.
    pub fn last_report(&self) -> Option<&WriteReport> {
        self.last_report.as_ref()
    }
}

impl TagHandler for CollectionTemplater {
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
            debug!(output = %self.output.display(), "collection render deferred");
            return Ok(());
        }
        self.write_templates()
    }
}

impl WriteReports for CollectionTemplater {
    fn take_reports(&mut self) -> Vec<WriteReport> {
        self.last_report.take().into_iter().collect()
    }
}

impl DeferredWrite for CollectionTemplater {
    fn write_templates(&mut self) -> anyhow::Result<()> {
        let report = self
            .writer
            .write_template(&self.output, &self.template, self.collection.context())
            .with_context(|| {
                format!(
                    "collection templater {} → {}",
                    self.template.name(),
                    self.output.display()
                )
            })?;
        info!(
            output = %self.output.display(),
            entries = self.collection.entries().len(),
            "rendered collection"
        );
        self.last_report = Some(report);
        Ok(())
    }

    fn is_deferred(&self) -> bool {
        self.deferred
    }
}
