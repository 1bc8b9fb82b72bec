//! # Syntax Module
//!
//! An owned, mutable model of the parts of a Go file that generators work on,
//! lowered from a `tree-sitter-go` concrete syntax tree and printable back to
//! source.
//!
//! ## Model
//!
//! ```text
//! SourceFile
//! ├── header: Vec<Comment>          // build constraints, file docs
//! ├── package: String
//! ├── import_doc: Vec<Comment>      // comments above the import declaration
//! ├── imports: Vec<ImportSpec>      // each with its own doc and line comment
//! └── decls: Vec<Decl>
//!     ├── Type(TypeDecl) ── specs: Vec<TypeSpec>
//!     │                     └── body: Struct(FieldList) | Interface(FieldList) | Other
//!     ├── Comment
//!     └── Verbatim                  // funcs, vars, consts: untouched text
//! ```
//!
//! Struct fields and interface elements share the [`Field`] type: an entry with
//! no names is embedded. Comments are kept next to the entry they describe:
//! lines directly above an entry become its doc, a comment on the same line
//! becomes its line comment, and leftovers at the end of a group are kept as
//! trailing comments of that group.
//!
//! Type declarations are addressed by [`DeclId`] handles so handlers can keep
//! mutating a declaration after discovery.
//!
//! ## Round trip
//!
//! ```rust
//! use std::path::Path;
//! use taggen::syntax::{parse_source, print_file};
//!
//! let src = "package models\n\ntype User struct {\n\tName string\n}\n";
//! let file = parse_source(Path::new("user.go"), src).unwrap();
//! assert_eq!(print_file(&file), src);
//! ```

mod ast;
mod parse;
mod print;
#[cfg(test)]
mod tests;

pub use ast::*;
pub use parse::parse_source;
pub use print::print_file;
