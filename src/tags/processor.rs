use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use indexmap::IndexMap;
use tracing::{debug, info};

use super::discovery::{find_tagged_types, TaggedDeclaration, DEFAULT_NAMESPACE};
use super::imports::ImportMap;
use crate::syntax::SourceFile;
use crate::transform::FileTransformation;

/// Everything a handler sees about the file being processed.
pub struct TagContext<'f> {
    /// The file, already stripped of the markers found so far
    pub file: &'f mut SourceFile,
    /// Alias map of the file's imports
    pub imports: ImportMap,
}

/// Reacts to tagged declarations.
///
/// A handler is registered against one fully resolved tag type and gets a
/// chance to react to each file and to each matching declaration in it.
/// Only [`TagHandler::handle_tag`] is mandatory.
pub trait TagHandler {
    /// Called for every file before any of its tags are dispatched.
    fn begin_file(&mut self, _ctx: &mut TagContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once per matching declaration, in discovery order.
    fn handle_tag(
        &mut self,
        ctx: &mut TagContext<'_>,
        tag: &TaggedDeclaration,
    ) -> anyhow::Result<()>;

    /// Called for every file after all of its tags were dispatched.
    fn finish_file(&mut self, _ctx: &mut TagContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once after all files were processed.
    fn finalize(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<H: TagHandler + ?Sized> TagHandler for &mut H {
    fn begin_file(&mut self, ctx: &mut TagContext<'_>) -> anyhow::Result<()> {
        (**self).begin_file(ctx)
    }

    fn handle_tag(
        &mut self,
        ctx: &mut TagContext<'_>,
        tag: &TaggedDeclaration,
    ) -> anyhow::Result<()> {
        (**self).handle_tag(ctx, tag)
    }

    fn finish_file(&mut self, ctx: &mut TagContext<'_>) -> anyhow::Result<()> {
        (**self).finish_file(ctx)
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        (**self).finalize()
    }
}

impl<H: TagHandler + ?Sized> TagHandler for Box<H> {
    fn begin_file(&mut self, ctx: &mut TagContext<'_>) -> anyhow::Result<()> {
        (**self).begin_file(ctx)
    }

    fn handle_tag(
        &mut self,
        ctx: &mut TagContext<'_>,
        tag: &TaggedDeclaration,
    ) -> anyhow::Result<()> {
        (**self).handle_tag(ctx, tag)
    }

    fn finish_file(&mut self, ctx: &mut TagContext<'_>) -> anyhow::Result<()> {
        (**self).finish_file(ctx)
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        (**self).finalize()
    }
}

/// Shared handlers stay reachable by the caller, e.g. to trigger a deferred
/// render after the run.
impl<H: TagHandler + ?Sized> TagHandler for Rc<RefCell<H>> {
    fn begin_file(&mut self, ctx: &mut TagContext<'_>) -> anyhow::Result<()> {
        self.borrow_mut().begin_file(ctx)
    }

    fn handle_tag(
        &mut self,
        ctx: &mut TagContext<'_>,
        tag: &TaggedDeclaration,
    ) -> anyhow::Result<()> {
        self.borrow_mut().handle_tag(ctx, tag)
    }

    fn finish_file(&mut self, ctx: &mut TagContext<'_>) -> anyhow::Result<()> {
        self.borrow_mut().finish_file(ctx)
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        self.borrow_mut().finalize()
    }
}

/// Tag type → handlers, in registration order.
pub type HandlerMap<'h> = IndexMap<String, Vec<Box<dyn TagHandler + 'h>>>;

/// Discovers tagged declarations and dispatches them to registered handlers.
///
/// Per file: `begin_file` on every handler, discovery, `handle_tag` for each
/// match on every handler of its tag type, `finish_file` on every handler.
/// After all files, `finalize` on every handler exactly once. Tag types are
/// iterated in first-registration order and handlers in registration order,
/// so the whole protocol is deterministic. The first error aborts the run.
pub struct TagProcessor<'h> {
    handlers: HandlerMap<'h>,
    namespace: String,
}

impl Default for TagProcessor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h> TagProcessor<'h> {
    /// Processor recognising markers from packages whose last path segment is `tags`.
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    /// Processor with a custom reserved namespace segment.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        TagProcessor {
            handlers: IndexMap::new(),
            namespace: namespace.into(),
        }
    }

    /// Reserved namespace segment.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Appends a handler for the fully resolved tag type, e.g.
    /// `github.com/foo/tags/Bar`.
    pub fn add_handler(&mut self, tag_type: impl Into<String>, handler: impl TagHandler + 'h) {
        let tag_type = tag_type.into();
        debug!(tag_type = %tag_type, "registering tag handler");
        self.handlers
            .entry(tag_type)
            .or_default()
            .push(Box::new(handler));
    }

    /// Registered tag types in first-registration order.
    pub fn tag_types(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Processes every file in order, then finalizes all handlers.
    pub fn run(&mut self, files: &mut [SourceFile]) -> anyhow::Result<()> {
        for file in files.iter_mut() {
            self.process_file(file)?;
        }
        self.finalize_handlers()
    }

    /// Runs the per-file phases on one file.
    pub fn process_file(&mut self, file: &mut SourceFile) -> anyhow::Result<()> {
        let path = file.relative_path.clone();
        let imports = ImportMap::from_file(file);
        let mut ctx = TagContext { file, imports };

        self.each_handler(|tag_type, handler| {
            handler
                .begin_file(&mut ctx)
                .with_context(|| format!("begin_file of {tag_type} handler"))
        })
        .with_context(|| format!("tag processing of {} failed", path.display()))?;

        self.dispatch(&mut ctx)
            .with_context(|| format!("tag processing of {} failed", path.display()))?;

        self.each_handler(|tag_type, handler| {
            handler
                .finish_file(&mut ctx)
                .with_context(|| format!("finish_file of {tag_type} handler"))
        })
        .with_context(|| format!("tag processing of {} failed", path.display()))
    }

    /// Calls `finalize` on every handler once.
    pub fn finalize_handlers(&mut self) -> anyhow::Result<()> {
        self.each_handler(|tag_type, handler| {
            handler
                .finalize()
                .with_context(|| format!("finalize of {tag_type} handler"))
        })
        .context("tag processor finalize failed")
    }

    fn dispatch(&mut self, ctx: &mut TagContext<'_>) -> anyhow::Result<()> {
        let tagged = find_tagged_types(ctx.file, &ctx.imports, &self.namespace);
        info!(
            file = %ctx.file.relative_path.display(),
            matches = tagged.len(),
            "discovered tagged declarations"
        );
        for tag in &tagged {
            let Some(handlers) = self.handlers.get_mut(&tag.tag_type) else {
                debug!(tag_type = %tag.tag_type, declaration = %tag.name, "no handler registered");
                continue;
            };
            for handler in handlers.iter_mut() {
                handler.handle_tag(ctx, tag).with_context(|| {
                    format!("handling {} on {}", tag.tag_type, tag.name)
                })?;
            }
        }
        Ok(())
    }

    fn each_handler(
        &mut self,
        mut call: impl FnMut(&str, &mut dyn TagHandler) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        for (tag_type, handlers) in self.handlers.iter_mut() {
            for handler in handlers.iter_mut() {
                call(tag_type, handler.as_mut())?;
            }
        }
        Ok(())
    }
}

impl FileTransformation for TagProcessor<'_> {
    fn apply(&mut self, file: &mut SourceFile) -> anyhow::Result<()> {
        self.process_file(file)
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        self.finalize_handlers()
    }
}
