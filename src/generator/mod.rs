//! # Generator Module
//!
//! Output side of the pipeline: rendering templates, formatting Go source and
//! persisting it.
//!
//! ## Overview
//!
//! - **[`GoTemplate`]** - a runtime-loaded `minijinja` template producing Go source
//! - **[`Formatter`]** - pipes buffers through `goimports` (or `gofmt`)
//! - **[`GoWriter`]** - formats and writes buffers, templates and syntax trees
//!
//! ```text
//! SourceFile ─ print_file ─┐
//!                          ├─> Formatter ─> fs::write ─> WriteReport
//! GoTemplate ─ render ─────┘
//! ```
//!
//! ## Formatting failures
//!
//! A buffer the formatter rejects is still written, unformatted. The failure
//! is logged and returned in [`WriteReport::format_error`] so a cosmetic problem
//! never discards a generation pass. Only I/O failures abort a write.
//!
//! ## Environment
//!
//! - `TAGGEN_GOFMT` - formatter command line; `none` or `off` disables formatting
//!
//! ```rust
//! use taggen::generator::{Formatter, GoTemplate, GoWriter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let writer = GoWriter::new(Formatter::Disabled);
//! let template = GoTemplate::new("model", "type {{ name }} struct{}\n")?;
//! let report = writer.write_template(
//!     &dir.path().join("user.go"),
//!     &template,
//!     &serde_json::json!({ "name": "User" }),
//! )?;
//! assert!(report.format_error.is_none());
//! # Ok(())
//! # }
//! ```

mod format;
mod templates;
mod write;

pub use format::{Formatter, GOFMT_ENV};
pub use templates::GoTemplate;
pub use write::{GoWriter, WriteReport, WriteReports};
