use std::path::Path;

use tree_sitter::{Node, Parser};

use super::ast::{
    Comment, Decl, Field, FieldList, ImportSpec, SourceFile, TypeBody, TypeDecl, TypeExpr,
    TypeSpec,
};
use crate::error::TransformError;

/// Parses Go source text into a [`SourceFile`].
///
/// # Errors
///
/// Returns [`TransformError::Parse`] if the grammar cannot be loaded, the tree
/// contains a syntax error, or the file has no package clause.
pub fn parse_source(relative_path: &Path, source: &str) -> Result<SourceFile, TransformError> {
    let parse_error = |line: usize, column: usize, message: String| TransformError::Parse {
        path: relative_path.to_path_buf(),
        line,
        column,
        message,
    };

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| parse_error(0, 0, format!("grammar initialization failed: {e}")))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| parse_error(0, 0, "parser returned no tree".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        let (line, column, message) = match first_error(root) {
            Some(node) => {
                let pos = node.start_position();
                let message = if node.is_missing() {
                    format!("missing {}", node.kind())
                } else {
                    format!("unexpected `{}`", snippet(&source[node.byte_range()]))
                };
                (pos.row + 1, pos.column + 1, message)
            }
            None => (0, 0, "syntax error".to_string()),
        };
        return Err(parse_error(line, column, message));
    }

    let lowering = Lowering { source };
    lowering
        .source_file(relative_path, root)
        .ok_or_else(|| parse_error(1, 1, "missing package clause".to_string()))
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

fn has_child(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).any(|n| n.kind() == kind);
    found
}

/// Splits the comments above the first import declaration between the
/// declaration and its spec. A comment block directly above a lone
/// `import "x"` is that spec's doc (cgo preambles live there); everything
/// else stays with the declaration.
fn claim_import_doc(
    mut comments: Vec<Comment>,
    decl: Node<'_>,
    specs: &mut [ImportSpec],
) -> Vec<Comment> {
    let [only] = specs else {
        return comments;
    };
    if has_child(decl, "import_spec_list") {
        return comments;
    }
    let attached = comments.iter().rev().take_while(|c| !c.detached).count();
    let split = comments.len() - attached;
    let mut doc: Vec<String> = comments.drain(split..).map(|c| c.text).collect();
    doc.append(&mut only.doc);
    only.doc = doc;
    comments
}

/// Hangs a same-line comment on the declaration that just ended, returning
/// it when there is no free slot.
fn attach_to_type_decl(last: Option<&mut Decl>, comment: Comment) -> Option<Comment> {
    let Some(Decl::Type(decl)) = last else {
        return Some(comment);
    };
    let slot = if decl.grouped {
        &mut decl.comment
    } else {
        match decl.specs.last_mut() {
            Some(spec) => &mut spec.comment,
            None => return Some(comment),
        }
    };
    if slot.is_some() {
        return Some(comment);
    }
    *slot = Some(comment.text);
    None
}

fn snippet(text: &str) -> &str {
    let line = text.lines().next().unwrap_or("");
    match line.char_indices().nth(40) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

/// Lowers the tree-sitter CST into the owned syntax model.
struct Lowering<'s> {
    source: &'s str,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn source_file(&self, relative_path: &Path, root: Node<'_>) -> Option<SourceFile> {
        let mut cursor = root.walk();
        let children: Vec<Node<'_>> = root.named_children(&mut cursor).collect();

        let mut header = Vec::new();
        let mut package = None;
        let mut package_comment = None;
        let mut import_doc = Vec::new();
        let mut imports: Vec<ImportSpec> = Vec::new();
        let mut import_trailing = Vec::new();
        let mut decls: Vec<Decl> = Vec::new();
        // Comments after the package clause wait here until the next
        // declaration shows whether they belong to an import.
        let mut pending: Vec<Comment> = Vec::new();
        let mut prev: Option<Node<'_>> = None;

        for (idx, child) in children.iter().enumerate() {
            let next_start_row = children.get(idx + 1).map(|n| n.start_position().row);
            match child.kind() {
                "comment" => {
                    let comment = Comment {
                        text: self.text(*child).to_string(),
                        detached: next_start_row
                            .map_or(true, |row| row > child.end_position().row + 1),
                    };
                    let same_line =
                        prev.filter(|p| p.end_position().row == child.start_position().row);
                    if package.is_none() {
                        header.push(comment);
                        prev = Some(*child);
                        continue;
                    }
                    let unclaimed = match same_line.map(|p| p.kind()) {
                        Some("package_clause") if package_comment.is_none() => {
                            package_comment = Some(comment.text);
                            None
                        }
                        Some("import_declaration") => {
                            let grouped =
                                same_line.is_some_and(|p| has_child(p, "import_spec_list"));
                            match imports.last_mut() {
                                Some(last) if !grouped && last.comment.is_none() => {
                                    last.comment = Some(comment.text);
                                    None
                                }
                                _ if grouped => {
                                    import_trailing.push(comment.text);
                                    None
                                }
                                _ => Some(comment),
                            }
                        }
                        Some("type_declaration") => attach_to_type_decl(decls.last_mut(), comment),
                        Some("comment") | None => Some(comment),
                        Some(_) => match decls.last_mut() {
                            Some(Decl::Verbatim(text)) => {
                                text.push(' ');
                                text.push_str(&comment.text);
                                None
                            }
                            _ => Some(comment),
                        },
                    };
                    pending.extend(unclaimed);
                }
                "package_clause" => {
                    package = self.package_name(*child);
                }
                "import_declaration" => {
                    let (mut specs, trailing) = self.imports(*child);
                    let comments = std::mem::take(&mut pending);
                    if imports.is_empty() {
                        import_doc = claim_import_doc(comments, *child, &mut specs);
                    } else if let Some(first) = specs.first_mut() {
                        let mut doc: Vec<String> = comments.into_iter().map(|c| c.text).collect();
                        doc.append(&mut first.doc);
                        first.doc = doc;
                    } else {
                        import_trailing.extend(comments.into_iter().map(|c| c.text));
                    }
                    imports.extend(specs);
                    import_trailing.extend(trailing);
                }
                "type_declaration" => {
                    decls.extend(pending.drain(..).map(Decl::Comment));
                    decls.push(Decl::Type(self.type_decl(*child)));
                }
                _ => {
                    decls.extend(pending.drain(..).map(Decl::Comment));
                    decls.push(Decl::Verbatim(self.text(*child).to_string()));
                }
            }
            prev = Some(*child);
        }
        decls.extend(pending.drain(..).map(Decl::Comment));

        Some(SourceFile {
            relative_path: relative_path.to_path_buf(),
            header,
            package: package?,
            package_comment,
            import_doc,
            imports,
            import_trailing,
            decls,
        })
    }

    fn package_name(&self, clause: Node<'_>) -> Option<String> {
        let mut cursor = clause.walk();
        let name = clause
            .named_children(&mut cursor)
            .find(|n| matches!(n.kind(), "package_identifier" | "identifier"))
            .map(|n| self.text(n).to_string());
        name
    }

    /// Specs of one import declaration plus comments left after the last
    /// spec of a group.
    fn imports(&self, decl: Node<'_>) -> (Vec<ImportSpec>, Vec<String>) {
        let mut specs = Vec::new();
        let mut pending_doc = Vec::new();
        let mut cursor = decl.walk();
        let children: Vec<Node<'_>> = decl.named_children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "import_spec" => specs.extend(self.import_spec(child)),
                "import_spec_list" => {
                    let mut inner = child.walk();
                    let nodes: Vec<Node<'_>> = child.named_children(&mut inner).collect();
                    let mut last_spec_row = None;
                    for node in nodes {
                        match node.kind() {
                            "comment" => {
                                let text = self.text(node).to_string();
                                let row = node.start_position().row;
                                match specs.last_mut() {
                                    Some(last)
                                        if last_spec_row == Some(row) && last.comment.is_none() =>
                                    {
                                        last.comment = Some(text);
                                    }
                                    _ => pending_doc.push(text),
                                }
                            }
                            "import_spec" => {
                                if let Some(mut spec) = self.import_spec(node) {
                                    spec.doc = std::mem::take(&mut pending_doc);
                                    last_spec_row = Some(node.end_position().row);
                                    specs.push(spec);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        (specs, pending_doc)
    }

    fn import_spec(&self, spec: Node<'_>) -> Option<ImportSpec> {
        let path = spec.child_by_field_name("path")?;
        let raw = self.text(path);
        let path = raw
            .get(1..raw.len().saturating_sub(1))
            .unwrap_or(raw)
            .to_string();
        let name = spec
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string());
        Some(ImportSpec {
            name,
            path,
            doc: Vec::new(),
            comment: None,
        })
    }

    fn type_decl(&self, decl: Node<'_>) -> TypeDecl {
        let mut grouped = false;
        let mut specs: Vec<TypeSpec> = Vec::new();
        let mut doc = Vec::new();
        let mut last_spec_row = None;
        let mut cursor = decl.walk();
        let children: Vec<Node<'_>> = decl.children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "(" => grouped = true,
                "comment" => {
                    let text = self.text(child).to_string();
                    match specs.last_mut() {
                        Some(last)
                            if last.comment.is_none()
                                && last_spec_row == Some(child.start_position().row) =>
                        {
                            last.comment = Some(text);
                        }
                        _ => doc.push(text),
                    }
                }
                "type_spec" | "type_alias" => {
                    if let Some(spec) = self.type_spec(child, std::mem::take(&mut doc)) {
                        last_spec_row = Some(child.end_position().row);
                        specs.push(spec);
                    }
                }
                _ => {}
            }
        }
        TypeDecl {
            grouped,
            specs,
            trailing: doc,
            comment: None,
        }
    }

    fn type_spec(&self, spec: Node<'_>, doc: Vec<String>) -> Option<TypeSpec> {
        let name = spec.child_by_field_name("name")?;
        let ty = spec.child_by_field_name("type")?;
        let body = match ty.kind() {
            "struct_type" => TypeBody::Struct(self.struct_fields(ty)),
            "interface_type" => TypeBody::Interface(self.interface_elems(ty)),
            _ => TypeBody::Other(self.text(ty).to_string()),
        };
        Some(TypeSpec {
            name: self.text(name).to_string(),
            type_params: spec
                .child_by_field_name("type_parameters")
                .map(|n| self.text(n).to_string()),
            alias: spec.kind() == "type_alias",
            body,
            doc,
            comment: None,
            line: name.start_position().row + 1,
        })
    }

    fn struct_fields(&self, struct_type: Node<'_>) -> FieldList {
        let mut cursor = struct_type.walk();
        let list = struct_type
            .named_children(&mut cursor)
            .find(|n| n.kind() == "field_declaration_list");
        match list {
            Some(list) => self.field_list(list, |lowering, node| match node.kind() {
                "field_declaration" => Some(lowering.field_declaration(node)),
                _ => None,
            }),
            None => FieldList::default(),
        }
    }

    fn interface_elems(&self, interface_type: Node<'_>) -> FieldList {
        // Older grammars wrap the elements in a method_spec_list node.
        let mut cursor = interface_type.walk();
        let wrapped = interface_type
            .named_children(&mut cursor)
            .find(|n| n.kind() == "method_spec_list");
        let container = wrapped.unwrap_or(interface_type);
        self.field_list(container, |lowering, node| match node.kind() {
            "method_elem" | "method_spec" => lowering.method_elem(node),
            "type_elem" | "constraint_elem" | "interface_type_name" => {
                Some(Field::embedded(lowering.single_type(node)))
            }
            "type_identifier" | "qualified_type" => {
                Some(Field::embedded(lowering.type_expr(node)))
            }
            _ => None,
        })
    }

    /// Walks a braced container, attaching comments to neighbouring entries.
    fn field_list(
        &self,
        container: Node<'_>,
        entry: impl Fn(&Self, Node<'_>) -> Option<Field>,
    ) -> FieldList {
        let mut fields: Vec<Field> = Vec::new();
        let mut pending_doc = Vec::new();
        let mut last_entry_row = None;

        let mut cursor = container.walk();
        let children: Vec<Node<'_>> = container.named_children(&mut cursor).collect();
        for child in children {
            if child.kind() == "comment" {
                let text = self.text(child).to_string();
                let row = child.start_position().row;
                match fields.last_mut() {
                    Some(last) if last_entry_row == Some(row) && last.comment.is_none() => {
                        last.comment = Some(text);
                    }
                    _ => pending_doc.push(text),
                }
                continue;
            }
            if let Some(mut field) = entry(self, child) {
                field.doc = std::mem::take(&mut pending_doc);
                last_entry_row = Some(child.end_position().row);
                fields.push(field);
            }
        }

        FieldList {
            list: fields,
            trailing: pending_doc,
        }
    }

    fn field_declaration(&self, decl: Node<'_>) -> Field {
        let mut cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.text(n).to_string())
            .collect();

        let ty = match decl.child_by_field_name("type") {
            Some(ty) => {
                let mut inner = decl.walk();
                let pointer = names.is_empty() && decl.children(&mut inner).any(|c| c.kind() == "*");
                if pointer {
                    TypeExpr::Verbatim(format!("*{}", self.text(ty)))
                } else {
                    self.type_expr(ty)
                }
            }
            None => TypeExpr::Verbatim(String::new()),
        };

        let tag = decl
            .child_by_field_name("tag")
            .map(|n| self.text(n).to_string());

        Field {
            names,
            ty,
            tag,
            doc: Vec::new(),
            comment: None,
        }
    }

    fn method_elem(&self, elem: Node<'_>) -> Option<Field> {
        let name = elem.child_by_field_name("name")?;
        let signature = self.source[name.end_byte()..elem.end_byte()].trim();
        Some(Field::named(
            self.text(name),
            TypeExpr::Verbatim(signature.to_string()),
            None,
        ))
    }

    /// Lowers a wrapper holding one type (or a `|` union, kept verbatim).
    fn single_type(&self, wrapper: Node<'_>) -> TypeExpr {
        let mut cursor = wrapper.walk();
        let inner: Vec<Node<'_>> = wrapper
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();
        match inner.as_slice() {
            [only] => self.type_expr(*only),
            _ => TypeExpr::Verbatim(self.text(wrapper).to_string()),
        }
    }

    fn type_expr(&self, node: Node<'_>) -> TypeExpr {
        match node.kind() {
            "type_identifier" | "identifier" => TypeExpr::Path(vec![self.text(node).to_string()]),
            "qualified_type" => {
                let package = node.child_by_field_name("package");
                let name = node.child_by_field_name("name");
                match (package, name) {
                    (Some(package), Some(name)) => TypeExpr::Path(vec![
                        self.text(package).to_string(),
                        self.text(name).to_string(),
                    ]),
                    _ => TypeExpr::Verbatim(self.text(node).to_string()),
                }
            }
            _ => TypeExpr::Verbatim(self.text(node).to_string()),
        }
    }
}
