//! # taggen
//!
//! **taggen** is a tag-driven source-to-source code generator for Go. Declarations opt into
//! generation by embedding a marker type from a package whose import path ends in a reserved
//! segment (`tags` by default). taggen discovers those markers, strips them, parses their
//! literal annotations and routes each match to the handlers registered for its fully
//! resolved tag type.
//!
//! ```go
//! package models
//!
//! import "example.org/project/tags"
//!
//! type User struct {
//!     tags.Exported `table:"users"`
//!     Name string
//! }
//! ```
//!
//! A handler registered for `example.org/project/tags/Exported` receives `User` with the
//! annotation `table → ["users"]`; the struct written back keeps only `Name string`, and the
//! marker package import is dropped once nothing else in the file uses it.
//!
//! ## Architecture
//!
//! - **[`syntax`]** - Go parsing (tree-sitter) into an owned, mutable model and printing
//! - **[`collect`]** - Directory walk collecting parsed `.go` files
//! - **[`annotation`]** - Struct-tag style annotation parser
//! - **[`tags`]** - Marker discovery, import resolution and handler orchestration
//! - **[`handlers`]** - Stock handlers: field injection, per-declaration and batched templates,
//!   two-stage "inception" programs
//! - **[`transform`]** - Generic per-file transformation pipeline and write-out
//! - **[`generator`]** - Template rendering and formatted Go output
//! - **[`config`]** - `taggen.toml` run configuration
//! - **[`cli`]** - The `taggen` binary's commands
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ### Processing Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as taggen run
//!     participant Collect as collect::collect_files
//!     participant Pipeline as transform::Pipeline
//!     participant Tags as tags::TagProcessor
//!     participant Handler as TagHandler
//!     participant Out as generator::GoWriter
//!
//!     CLI->>Collect: input directory
//!     Collect-->>CLI: Vec<SourceFile>
//!     CLI->>Pipeline: prepare every transformation
//!     loop each transformation, each file
//!         Pipeline->>Tags: apply(file)
//!         Tags->>Tags: discover + strip markers
//!         Tags->>Handler: begin_file / handle_tag / finish_file
//!     end
//!     Pipeline->>Tags: finalize
//!     Tags->>Handler: finalize (batched renders)
//!     Handler->>Out: render + format + write
//!     CLI->>Handler: write_templates (deferred handlers)
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use taggen::generator::GoTemplate;
//! use taggen::handlers::{go_file_name, FieldAdder, Templater};
//! use taggen::tags::TagProcessor;
//! use taggen::transform::{Pipeline, WriteOut};
//!
//! # fn main() -> anyhow::Result<()> {
//! let exported = "example.org/project/tags/Exported";
//! let mut processor = TagProcessor::new();
//! processor.add_handler(exported, FieldAdder::new("ID", "int64"));
//! processor.add_handler(
//!     exported,
//!     Templater::new(
//!         "gen/repos",
//!         GoTemplate::new("repo", "package {{ package }}\n\ntype {{ name }}Repo struct{}\n")?,
//!         go_file_name("_repo"),
//!     ),
//! );
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.add(processor).add(WriteOut::new("gen", "_gen"));
//! pipeline.apply_dir("models".as_ref())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment
//!
//! | Variable                      | Effect                                              |
//! |-------------------------------|-----------------------------------------------------|
//! | `TAGGEN_GOFMT`                | formatter command line, or `none`/`off`             |
//! | `TAGGEN_GO_BIN`               | `go` binary used to run inception programs          |
//! | `TAGGEN_LOG_LEVEL`            | `trace`, `debug`, `info` (default), `warn`, `error` |
//! | `TAGGEN_LOG_FORMAT`           | `pretty` (default) or `json`                        |
//! | `TAGGEN_LOG_TARGET_FILTER`    | extra `EnvFilter` directives                        |
//! | `TAGGEN_LOG_INCLUDE_LOCATION` | include file and line in log records                |

pub mod annotation;
pub mod cli;
pub mod collect;
pub mod config;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod logging;
pub mod syntax;
pub mod tags;
pub mod transform;

pub use error::TransformError;
