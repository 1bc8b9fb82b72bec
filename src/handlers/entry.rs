use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::annotation;
use crate::error::TransformError;
use crate::tags::{TagContext, TaggedDeclaration};

/// Template-facing view of one tagged declaration.
///
/// In a template the fields are available as `name`, `package`, `tags.<key>`
/// and `data.<key>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateEntry {
    /// Declared type name
    pub name: String,
    /// Package of the file declaring it
    pub package: String,
    /// Annotation reduced to the first value per key
    pub tags: IndexMap<String, String>,
    /// Free-form data added by template mappers
    pub data: Map<String, Value>,
}

impl TemplateEntry {
    /// Builds the entry for a match, parsing its literal annotation.
    ///
    /// # Errors
    ///
    /// [`TransformError::Annotation`] naming the declaration if the annotation
    /// is malformed.
    pub fn from_tag(
        ctx: &TagContext<'_>,
        tag: &TaggedDeclaration,
    ) -> Result<Self, TransformError> {
        let parsed =
            annotation::parse(&tag.literal_tag).map_err(|source| TransformError::Annotation {
                declaration: tag.name.clone(),
                source,
            })?;
        Ok(TemplateEntry {
            name: tag.name.clone(),
            package: ctx.file.package.clone(),
            tags: annotation::unique(&parsed),
            data: Map::new(),
        })
    }
}

/// Post-processing step applied to each entry as it is collected.
pub type TemplateMapper = Box<dyn FnMut(&mut TemplateEntry)>;

/// Ordered accumulation of entries across a whole run.
#[derive(Default)]
pub struct TemplateCollection {
    entries: Vec<TemplateEntry>,
    mapper: Option<TemplateMapper>,
}

impl fmt::Debug for TemplateCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCollection")
            .field("entries", &self.entries)
            .field("mapper", &self.mapper.is_some())
            .finish()
    }
}

/// Context handed to batched templates.
#[derive(Debug, Serialize)]
pub(crate) struct CollectionContext<'a> {
    pub entries: &'a [TemplateEntry],
    pub package: &'a str,
}

impl TemplateCollection {
    /// Installs the mapper; it applies to entries added from now on.
    pub fn set_mapper(&mut self, mapper: impl FnMut(&mut TemplateEntry) + 'static) {
        self.mapper = Some(Box::new(mapper));
    }

    /// Builds, maps and appends the entry for a match.
    pub fn add(
        &mut self,
        ctx: &TagContext<'_>,
        tag: &TaggedDeclaration,
    ) -> Result<(), TransformError> {
        let mut entry = TemplateEntry::from_tag(ctx, tag)?;
        if let Some(mapper) = self.mapper.as_mut() {
            mapper(&mut entry);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Entries in discovery order.
    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub(crate) fn context(&self) -> CollectionContext<'_> {
        CollectionContext {
            entries: &self.entries,
            package: self
                .entries
                .first()
                .map(|entry| entry.package.as_str())
                .unwrap_or_default(),
        }
    }
}
