//! # Tags Module
//!
//! Discovery of tagged type declarations and dispatch to tag handlers.
//!
//! A struct or interface opts into processing by embedding a member whose type
//! lives in a package named `tags`:
//!
//! ```go
//! import "example.org/project/tags"
//!
//! type User struct {
//!     tags.Exported `table:"users"`
//!     Name string
//! }
//! ```
//!
//! Discovery resolves `tags.Exported` through the file's imports to
//! `example.org/project/tags/Exported`, removes the member from `User` and
//! reports the literal annotation `table:"users"`. Handlers register against
//! the fully resolved tag type.
//!
//! ## Matching rules
//!
//! - only unnamed (embedded) members are considered
//! - a bare identifier resolves through the file's own package name
//! - a selector resolves its first segment through the import aliases
//! - the resolved package path must end in the reserved namespace segment
//! - interface markers never carry an annotation
//!
//! Markers are collected in a forward scan and removed afterwards from the
//! highest index down, so several markers in one declaration are all removed.
//! The import that supplied the markers is removed too when no other code in
//! the file refers to it.

mod discovery;
mod imports;
mod processor;

pub use discovery::{
    find_tagged_types, is_tag_namespace, remove_indices, TaggedDeclaration, DEFAULT_NAMESPACE,
};
pub use imports::ImportMap;
pub use processor::{HandlerMap, TagContext, TagHandler, TagProcessor};

use crate::syntax::SourceFile;

/// Runs discovery on one file with a freshly built import map.
///
/// Markers are stripped from the file as a side effect.
pub fn discover(file: &mut SourceFile, namespace: &str) -> Vec<TaggedDeclaration> {
    let imports = ImportMap::from_file(file);
    find_tagged_types(file, &imports, namespace)
}
