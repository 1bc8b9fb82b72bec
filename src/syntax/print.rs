use super::ast::{Decl, Field, FieldList, ImportSpec, SourceFile, TypeBody, TypeDecl, TypeSpec};

/// Renders a [`SourceFile`] back to Go source.
///
/// The output is already close to `gofmt` style (tab indentation, one grouped
/// import block) but is normally passed through the formatter before it is
/// written to disk.
pub fn print_file(file: &SourceFile) -> String {
    let mut out = String::new();

    for comment in &file.header {
        out.push_str(&comment.text);
        out.push('\n');
        if comment.detached {
            out.push('\n');
        }
    }

    out.push_str("package ");
    out.push_str(&file.package);
    push_line_comment(&mut out, file.package_comment.as_deref());
    out.push('\n');

    if !file.imports.is_empty() || !file.import_doc.is_empty() {
        out.push('\n');
    }
    for comment in &file.import_doc {
        out.push_str(&comment.text);
        out.push('\n');
        if comment.detached {
            out.push('\n');
        }
    }

    match file.imports.as_slice() {
        [] => {}
        [single] if file.import_trailing.is_empty() => {
            for doc in &single.doc {
                out.push_str(&format!("{doc}\n"));
            }
            out.push_str("import ");
            push_import(&mut out, single);
            out.push('\n');
        }
        many => {
            out.push_str("import (\n");
            for spec in many {
                for doc in &spec.doc {
                    out.push_str(&format!("\t{doc}\n"));
                }
                out.push('\t');
                push_import(&mut out, spec);
                out.push('\n');
            }
            for comment in &file.import_trailing {
                out.push_str(&format!("\t{comment}\n"));
            }
            out.push_str(")\n");
        }
    }

    out.push_str(&print_decls(&file.decls));
    out
}

/// Renders top-level declarations, each preceded by a blank line unless an
/// attached comment sits directly above it.
pub(crate) fn print_decls(decls: &[Decl]) -> String {
    let mut out = String::new();
    let mut attached = false;
    for decl in decls {
        if !attached {
            out.push('\n');
        }
        attached = false;
        match decl {
            Decl::Comment(comment) => {
                out.push_str(&comment.text);
                out.push('\n');
                attached = !comment.detached;
            }
            Decl::Verbatim(text) => {
                out.push_str(text);
                out.push('\n');
            }
            Decl::Type(type_decl) => print_type_decl(&mut out, type_decl),
        }
    }
    out
}

fn push_line_comment(out: &mut String, comment: Option<&str>) {
    if let Some(comment) = comment {
        out.push(' ');
        out.push_str(comment);
    }
}

fn push_import(out: &mut String, spec: &ImportSpec) {
    if let Some(name) = &spec.name {
        out.push_str(name);
        out.push(' ');
    }
    out.push('"');
    out.push_str(&spec.path);
    out.push('"');
    push_line_comment(out, spec.comment.as_deref());
}

fn print_type_decl(out: &mut String, decl: &TypeDecl) {
    if decl.grouped || decl.specs.len() != 1 {
        out.push_str("type (\n");
        for spec in &decl.specs {
            for doc in &spec.doc {
                out.push_str(&format!("\t{doc}\n"));
            }
            out.push('\t');
            print_type_spec(out, spec, 1);
            push_line_comment(out, spec.comment.as_deref());
            out.push('\n');
        }
        for comment in &decl.trailing {
            out.push_str(&format!("\t{comment}\n"));
        }
        out.push(')');
        push_line_comment(out, decl.comment.as_deref());
        out.push('\n');
    } else {
        for spec in &decl.specs {
            for doc in &spec.doc {
                out.push_str(&format!("{doc}\n"));
            }
            out.push_str("type ");
            print_type_spec(out, spec, 0);
            push_line_comment(out, spec.comment.as_deref());
            out.push('\n');
        }
    }
}

fn print_type_spec(out: &mut String, spec: &TypeSpec, depth: usize) {
    out.push_str(&spec.name);
    if let Some(params) = &spec.type_params {
        out.push_str(params);
    }
    out.push(' ');
    if spec.alias {
        out.push_str("= ");
    }
    match &spec.body {
        TypeBody::Struct(fields) => {
            out.push_str("struct");
            print_field_list(out, fields, depth, print_struct_field);
        }
        TypeBody::Interface(elems) => {
            out.push_str("interface");
            print_field_list(out, elems, depth, print_interface_elem);
        }
        TypeBody::Other(text) => out.push_str(text),
    }
}

fn print_field_list(
    out: &mut String,
    fields: &FieldList,
    depth: usize,
    entry: fn(&mut String, &Field),
) {
    if fields.list.is_empty() && fields.trailing.is_empty() {
        out.push_str("{}");
        return;
    }
    let indent = "\t".repeat(depth + 1);
    out.push_str(" {\n");
    for field in &fields.list {
        for doc in &field.doc {
            out.push_str(&format!("{indent}{doc}\n"));
        }
        out.push_str(&indent);
        entry(out, field);
        if let Some(comment) = &field.comment {
            out.push(' ');
            out.push_str(comment);
        }
        out.push('\n');
    }
    for comment in &fields.trailing {
        out.push_str(&format!("{indent}{comment}\n"));
    }
    out.push_str(&"\t".repeat(depth));
    out.push('}');
}

fn print_struct_field(out: &mut String, field: &Field) {
    if !field.names.is_empty() {
        out.push_str(&field.names.join(", "));
        out.push(' ');
    }
    out.push_str(&field.ty.to_string());
    if let Some(tag) = &field.tag {
        out.push(' ');
        out.push_str(tag);
    }
}

fn print_interface_elem(out: &mut String, field: &Field) {
    // Methods carry their signature verbatim right after the name.
    out.push_str(&field.names.join(", "));
    out.push_str(&field.ty.to_string());
}
