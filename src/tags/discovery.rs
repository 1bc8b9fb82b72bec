use tracing::debug;

use super::imports::ImportMap;
use crate::syntax::{DeclId, Field, SourceFile, TypeBody};

/// Default reserved namespace segment for marker packages.
pub const DEFAULT_NAMESPACE: &str = "tags";

/// One discovered marker match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedDeclaration {
    /// Fully resolved tag type, e.g. `example.org/project/tags/Exported`
    pub tag_type: String,
    /// Literal annotation without delimiters; empty when absent and always
    /// empty for interfaces
    pub literal_tag: String,
    /// Handle to the tagged type spec in its file
    pub decl: DeclId,
    /// Declared name of the tagged type
    pub name: String,
}

/// Whether an import path belongs to the reserved namespace.
///
/// The last path segment must equal `namespace`, so `mod/tags` matches while
/// `mod/antitags` does not.
pub fn is_tag_namespace(import_path: &str, namespace: &str) -> bool {
    import_path.rsplit('/').next() == Some(namespace)
}

/// Finds every marker member in the file's top-level types, removes it and
/// reports one [`TaggedDeclaration`] per marker.
///
/// Types are visited in symbol-table (source) order and markers in member
/// order. Declarations left without members keep an empty body. A marker
/// package import that nothing refers to once the markers are gone is
/// dropped as well, so the file still compiles.
pub fn find_tagged_types(
    file: &mut SourceFile,
    imports: &ImportMap,
    namespace: &str,
) -> Vec<TaggedDeclaration> {
    let mut output = Vec::new();
    let mut qualifiers: Vec<String> = Vec::new();
    let handles: Vec<(String, DeclId)> = file.symbols().into_iter().collect();
    for (name, id) in handles {
        let Some(spec) = file.type_spec_mut(id) else {
            continue;
        };
        let (fields, carries_tags) = match &mut spec.body {
            TypeBody::Struct(fields) => (fields, true),
            TypeBody::Interface(elems) => (elems, false),
            TypeBody::Other(_) => continue,
        };

        let mut to_remove = Vec::new();
        for (idx, field) in fields.list.iter().enumerate() {
            let Some(tag_type) = marker_type(field, imports, namespace) else {
                continue;
            };
            let literal_tag = if carries_tags {
                field.tag_text().unwrap_or_default().to_string()
            } else {
                String::new()
            };
            if let Some([qualifier, _]) = field.ty.selector_path() {
                if !qualifiers.contains(qualifier) {
                    qualifiers.push(qualifier.clone());
                }
            }
            to_remove.push(idx);
            output.push(TaggedDeclaration {
                tag_type,
                literal_tag,
                decl: id,
                name: name.clone(),
            });
        }
        if !to_remove.is_empty() {
            debug!(declaration = %name, markers = to_remove.len(), "stripping tag markers");
        }
        remove_indices(&mut fields.list, &to_remove);
    }
    drop_unused_imports(file, &qualifiers, namespace);
    output
}

/// Removes marker package imports visible under one of `qualifiers` that the
/// rest of the file no longer mentions.
fn drop_unused_imports(file: &mut SourceFile, qualifiers: &[String], namespace: &str) {
    let unused: Vec<usize> = file
        .imports
        .iter()
        .enumerate()
        .filter(|(_, spec)| {
            is_tag_namespace(&spec.path, namespace)
                && qualifiers.iter().any(|q| q == spec.visible_name())
                && !file.uses_qualifier(spec.visible_name())
        })
        .map(|(idx, _)| idx)
        .collect();
    for &idx in &unused {
        debug!(import = %file.imports[idx].path, "dropping unused marker import");
    }
    remove_indices(&mut file.imports, &unused);
}

/// Resolved tag type of an embedded member, if it is a marker.
fn marker_type(field: &Field, imports: &ImportMap, namespace: &str) -> Option<String> {
    if !field.is_embedded() {
        return None;
    }
    let path = field.ty.selector_path()?;
    let (package, tag_type) = imports.resolve_type(path)?;
    is_tag_namespace(&package, namespace).then_some(tag_type)
}

/// Removes the entries at `indices` (ascending, as collected by a forward
/// scan) from highest to lowest, so earlier indices stay valid.
pub fn remove_indices<T>(list: &mut Vec<T>, indices: &[usize]) {
    for &idx in indices.iter().rev() {
        if idx < list.len() {
            list.remove(idx);
        }
    }
}
