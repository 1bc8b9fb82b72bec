//! # Handlers Module
//!
//! Stock [`TagHandler`](crate::tags::TagHandler) implementations.
//!
//! | Handler                  | Per match                  | Finalize                        |
//! |--------------------------|----------------------------|---------------------------------|
//! | [`FieldAdder`]           | appends a field to struct  | nothing                         |
//! | [`Templater`]            | renders one file           | nothing                         |
//! | [`CollectionTemplater`]  | collects an entry          | renders all entries into a file |
//! | [`InceptionTemplater`]   | collects an entry          | renders a program and runs it   |
//!
//! The batched handlers can be deferred: `finalize` then does nothing and the
//! caller triggers the render through [`DeferredWrite::write_templates`], for
//! example after other handlers finished. Keep a deferred handler reachable by
//! registering it as `Rc<RefCell<_>>`:
//!
//! ```rust,no_run
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use taggen::generator::GoTemplate;
//! use taggen::handlers::{CollectionTemplater, DeferredWrite};
//! use taggen::tags::TagProcessor;
//!
//! # fn main() -> anyhow::Result<()> {
//! let template = GoTemplate::new("registry", "package {{ package }}\n")?;
//! let registry = Rc::new(RefCell::new(
//!     CollectionTemplater::new("gen/registry.go", template).deferred(true),
//! ));
//!
//! let mut processor = TagProcessor::new();
//! processor.add_handler("example.org/project/tags/Exported", Rc::clone(&registry));
//! processor.run(&mut taggen::collect::collect_files("models".as_ref())?)?;
//!
//! registry.borrow_mut().write_templates()?;
//! # Ok(())
//! # }
//! ```

mod collection;
mod entry;
mod field_adder;
mod inception;
mod templater;

pub use collection::CollectionTemplater;
pub use entry::{TemplateCollection, TemplateEntry, TemplateMapper};
pub use field_adder::FieldAdder;
pub use inception::{CommandRunner, InceptionTemplater, ProgramOutput, ProgramRunner, GO_BIN_ENV};
pub use templater::{go_file_name, snake_case, NameFn, Templater};

/// Batched handlers whose render can be triggered explicitly.
///
/// Each call renders again; calling twice writes the output twice.
pub trait DeferredWrite {
    /// Renders (and for inception, runs) the accumulated entries now.
    fn write_templates(&mut self) -> anyhow::Result<()>;

    /// Whether `finalize` skips the render.
    fn is_deferred(&self) -> bool;
}
