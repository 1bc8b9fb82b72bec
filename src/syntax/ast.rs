use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

/// One parsed Go file.
///
/// Only the parts the generators reason about are modelled structurally: the
/// package clause, the imports and type declarations. Every other top-level
/// declaration is carried verbatim and printed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the scan root
    pub relative_path: PathBuf,
    /// Comments preceding the package clause (build constraints, file docs)
    pub header: Vec<Comment>,
    /// Declared package name
    pub package: String,
    /// Comment on the package clause line
    pub package_comment: Option<String>,
    /// Comments between the package clause and the import declaration
    pub import_doc: Vec<Comment>,
    /// Imports, in source order
    pub imports: Vec<ImportSpec>,
    /// Comments after the last spec of an import group
    pub import_trailing: Vec<String>,
    /// Top-level declarations after the imports, in source order
    pub decls: Vec<Decl>,
}

/// A `//` or `/* */` comment, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment text including its delimiters
    pub text: String,
    /// Whether a blank line separated this comment from what follows it
    pub detached: bool,
}

/// A single import spec: `name "path"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit alias (`.`, `_` or an identifier)
    pub name: Option<String>,
    /// Import path without quotes
    pub path: String,
    /// Comments on the lines directly above
    pub doc: Vec<String>,
    /// Comment on the same line
    pub comment: Option<String>,
}

impl ImportSpec {
    /// Import of `path` under an optional alias, without comments.
    pub fn new(name: Option<&str>, path: &str) -> Self {
        ImportSpec {
            name: name.map(str::to_string),
            path: path.to_string(),
            doc: Vec::new(),
            comment: None,
        }
    }

    /// The name under which the package is visible in the importing file.
    ///
    /// Without an explicit alias this is the last path segment, which assumes
    /// packages live in directories of the same name.
    pub fn visible_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    /// `type ...` declaration, single or grouped
    Type(TypeDecl),
    /// Free-standing comment
    Comment(Comment),
    /// Any other declaration (func, var, const, method), verbatim
    Verbatim(String),
}

/// `type X ...` or `type ( X ...; Y ... )`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Whether the declaration used the parenthesised group form
    pub grouped: bool,
    /// Declared types
    pub specs: Vec<TypeSpec>,
    /// Comments after the last spec of a group, before `)`
    pub trailing: Vec<String>,
    /// Comment on the closing line of a group
    pub comment: Option<String>,
}

/// One declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    /// Declared name
    pub name: String,
    /// Type parameter list, verbatim (`[T any]`)
    pub type_params: Option<String>,
    /// `type A = B` form
    pub alias: bool,
    /// Underlying type
    pub body: TypeBody,
    /// Doc comments directly above the spec inside a group
    pub doc: Vec<String>,
    /// Comment on the line the spec ends on
    pub comment: Option<String>,
    /// 1-based source line of the declared name
    pub line: usize,
}

/// Underlying type of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBody {
    /// `struct { ... }`
    Struct(FieldList),
    /// `interface { ... }`
    Interface(FieldList),
    /// Anything else (named type, func type, map, ...), verbatim
    Other(String),
}

impl TypeBody {
    /// Human readable kind, used in shape errors.
    pub fn kind(&self) -> &'static str {
        match self {
            TypeBody::Struct(_) => "struct",
            TypeBody::Interface(_) => "interface",
            TypeBody::Other(_) => "non-struct type",
        }
    }
}

/// Fields of a struct or elements of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldList {
    /// Entries in declaration order
    pub list: Vec<Field>,
    /// Comments after the last entry, before the closing brace
    pub trailing: Vec<String>,
}

/// A struct field, embedded field, interface method or embedded interface type.
///
/// An entry without names is embedded (anonymous). For interface methods the
/// single name is the method name and `ty` holds the verbatim signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field names; empty for embedded entries
    pub names: Vec<String>,
    /// Field type
    pub ty: TypeExpr,
    /// Raw tag literal including its delimiters (`` `json:"x"` ``)
    pub tag: Option<String>,
    /// Comments on the lines directly above
    pub doc: Vec<String>,
    /// Comment on the same line
    pub comment: Option<String>,
}

impl Field {
    /// Named field with an optional tag literal.
    pub fn named(name: impl Into<String>, ty: TypeExpr, tag: Option<String>) -> Self {
        Field {
            names: vec![name.into()],
            ty,
            tag,
            doc: Vec::new(),
            comment: None,
        }
    }

    /// Embedded (anonymous) field.
    pub fn embedded(ty: TypeExpr) -> Self {
        Field {
            names: Vec::new(),
            ty,
            tag: None,
            doc: Vec::new(),
            comment: None,
        }
    }

    /// Whether this entry has no explicit name.
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }

    /// Tag text with its wrapping delimiters removed.
    pub fn tag_text(&self) -> Option<&str> {
        let tag = self.tag.as_deref()?;
        let mut chars = tag.chars();
        match (chars.next(), chars.next_back()) {
            (Some(open @ ('`' | '"')), Some(close)) if open == close => Some(chars.as_str()),
            _ => Some(tag),
        }
    }
}

/// A type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Identifier or selector chain: `Foo` is `["Foo"]`, `tags.Foo` is `["tags", "Foo"]`
    Path(Vec<String>),
    /// Any other type expression (pointers, generics, slices, signatures), verbatim
    Verbatim(String),
}

impl TypeExpr {
    /// Builds a path from dotted text: `"uuid.UUID"` becomes `["uuid", "UUID"]`.
    pub fn dotted(text: &str) -> Self {
        TypeExpr::Path(text.split('.').map(str::to_string).collect())
    }

    /// The selector path of the expression, if it is a plain identifier or selector.
    pub fn selector_path(&self) -> Option<&[String]> {
        match self {
            TypeExpr::Path(segments) if !segments.is_empty() => Some(segments),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Path(segments) => f.write_str(&segments.join(".")),
            TypeExpr::Verbatim(text) => f.write_str(text),
        }
    }
}

/// Handle to a type spec inside a [`SourceFile`]: declaration index, spec index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId {
    /// Index into [`SourceFile::decls`]
    pub decl: usize,
    /// Index into [`TypeDecl::specs`]
    pub spec: usize,
}

/// File-level symbol table: declared type name → handle, in source order.
pub type SymbolTable = IndexMap<String, DeclId>;

impl SourceFile {
    /// Creates an empty file for the given package.
    pub fn new(relative_path: impl AsRef<Path>, package: impl Into<String>) -> Self {
        SourceFile {
            relative_path: relative_path.as_ref().to_path_buf(),
            header: Vec::new(),
            package: package.into(),
            package_comment: None,
            import_doc: Vec::new(),
            imports: Vec::new(),
            import_trailing: Vec::new(),
            decls: Vec::new(),
        }
    }

    /// Top-level type declarations by name, in source order.
    pub fn symbols(&self) -> SymbolTable {
        let mut table = SymbolTable::new();
        for (decl_idx, decl) in self.decls.iter().enumerate() {
            if let Decl::Type(type_decl) = decl {
                for (spec_idx, spec) in type_decl.specs.iter().enumerate() {
                    table
                        .entry(spec.name.clone())
                        .or_insert(DeclId {
                            decl: decl_idx,
                            spec: spec_idx,
                        });
                }
            }
        }
        table
    }

    /// Resolves a handle.
    pub fn type_spec(&self, id: DeclId) -> Option<&TypeSpec> {
        match self.decls.get(id.decl)? {
            Decl::Type(decl) => decl.specs.get(id.spec),
            _ => None,
        }
    }

    /// Resolves a handle mutably.
    pub fn type_spec_mut(&mut self, id: DeclId) -> Option<&mut TypeSpec> {
        match self.decls.get_mut(id.decl)? {
            Decl::Type(decl) => decl.specs.get_mut(id.spec),
            _ => None,
        }
    }

    /// Looks a type up by name.
    pub fn find_type(&self, name: &str) -> Option<&TypeSpec> {
        self.symbols()
            .get(name)
            .and_then(|id| self.type_spec(*id))
    }

    /// Whether `path` is imported under its default name or the given alias.
    pub fn has_import(&self, name: Option<&str>, path: &str) -> bool {
        self.imports
            .iter()
            .any(|spec| spec.path == path && spec.name.as_deref() == name)
    }

    /// Adds an unaliased import unless it is already present.
    ///
    /// Returns whether the file changed.
    pub fn add_import(&mut self, path: &str) -> bool {
        self.add_named_import(None, path)
    }

    /// Adds an import under an optional alias unless it is already present.
    ///
    /// Returns whether the file changed.
    pub fn add_named_import(&mut self, name: Option<&str>, path: &str) -> bool {
        if self.has_import(name, path) {
            return false;
        }
        self.imports.push(ImportSpec::new(name, path));
        true
    }

    /// Whether `name.` is used as a package qualifier anywhere below the
    /// imports. Mentions inside comments or strings count as uses.
    pub fn uses_qualifier(&self, name: &str) -> bool {
        let body = super::print::print_decls(&self.decls);
        let needle = format!("{name}.");
        body.match_indices(&needle).any(|(idx, _)| {
            body[..idx]
                .chars()
                .next_back()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '.'))
        })
    }
}
