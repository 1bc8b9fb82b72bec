#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use std::path::Path;

fn parse(src: &str) -> SourceFile {
    parse_source(Path::new("pkg/file.go"), src).expect("valid go")
}

fn struct_fields<'a>(file: &'a SourceFile, name: &str) -> &'a FieldList {
    match &file.find_type(name).expect("type exists").body {
        TypeBody::Struct(fields) => fields,
        other => panic!("expected struct, got {}", other.kind()),
    }
}

#[test]
fn test_package_and_imports() {
    let file = parse(
        r#"package models

import (
	"fmt"
	t "example.org/project/tags"
	_ "embed"
)

import "strings"
"#,
    );
    assert_eq!(file.package, "models");
    assert_eq!(file.imports.len(), 4);
    assert_eq!(file.imports[0].visible_name(), "fmt");
    assert_eq!(file.imports[1].name.as_deref(), Some("t"));
    assert_eq!(file.imports[1].path, "example.org/project/tags");
    assert_eq!(file.imports[1].visible_name(), "t");
    assert_eq!(file.imports[2].visible_name(), "_");
    assert_eq!(file.imports[3].path, "strings");
}

#[test]
fn test_struct_fields_embedded_and_tags() {
    let file = parse(
        r#"package models

import "example.org/project/tags"

type User struct {
	tags.Exported `db:"users"`
	Name, Nick string `json:"name"`
	*Base
	Helper
}
"#,
    );
    let fields = struct_fields(&file, "User");
    assert_eq!(fields.list.len(), 4);

    let marker = &fields.list[0];
    assert!(marker.is_embedded());
    assert_eq!(
        marker.ty,
        TypeExpr::Path(vec!["tags".into(), "Exported".into()])
    );
    assert_eq!(marker.tag.as_deref(), Some("`db:\"users\"`"));
    assert_eq!(marker.tag_text(), Some("db:\"users\""));

    assert_eq!(fields.list[1].names, vec!["Name", "Nick"]);
    assert_eq!(fields.list[1].ty, TypeExpr::Path(vec!["string".into()]));

    // pointer embedding is not a plain selector
    assert_eq!(fields.list[2].ty, TypeExpr::Verbatim("*Base".into()));
    assert!(fields.list[2].ty.selector_path().is_none());

    assert_eq!(fields.list[3].ty.selector_path().unwrap(), ["Helper"]);
}

#[test]
fn test_interface_methods_and_embedded_types() {
    let file = parse(
        r#"package api

type Service interface {
	tags.Remote
	io.Closer
	Get(id string) (string, error)
}
"#,
    );
    let spec = file.find_type("Service").unwrap();
    let TypeBody::Interface(elems) = &spec.body else {
        panic!("expected interface");
    };
    assert_eq!(elems.list.len(), 3);
    assert!(elems.list[0].is_embedded());
    assert_eq!(elems.list[0].ty.selector_path().unwrap(), ["tags", "Remote"]);
    assert_eq!(elems.list[1].ty.selector_path().unwrap(), ["io", "Closer"]);
    assert_eq!(elems.list[2].names, vec!["Get"]);
    assert_eq!(
        elems.list[2].ty,
        TypeExpr::Verbatim("(id string) (string, error)".into())
    );
}

#[test]
fn test_symbol_table_in_source_order() {
    let file = parse(
        r#"package models

type (
	B struct{}
	A int
)

func helper() {}

type C = B
"#,
    );
    let symbols = file.symbols();
    assert_eq!(symbols.keys().collect::<Vec<_>>(), vec!["B", "A", "C"]);
    assert_eq!(symbols["A"], DeclId { decl: 0, spec: 1 });
    assert!(file.find_type("C").unwrap().alias);
    assert_eq!(file.find_type("A").unwrap().body, TypeBody::Other("int".into()));
    assert_eq!(file.find_type("B").unwrap().line, 4);
}

#[test]
fn test_print_round_trip_is_stable() {
    let src = r#"// +build ignore

package models

import (
	"fmt"
	"example.org/project/tags"
)

// User is a person.
type User struct {
	tags.Exported `db:"users"`
	// Name is shown.
	Name string // display name
}

type Service interface {
	Get(id string) error
}

func (u User) String() string {
	return fmt.Sprint(u.Name)
}
"#;
    let file = parse(src);
    let printed = print_file(&file);
    assert_eq!(printed, src);
    assert_eq!(parse(&printed), file);
}

#[test]
fn test_comments_attach_to_fields() {
    let file = parse(
        r#"package models

type User struct {
	// the id
	ID int // primary key
	// dangling
}
"#,
    );
    let fields = struct_fields(&file, "User");
    assert_eq!(fields.list[0].doc, vec!["// the id"]);
    assert_eq!(fields.list[0].comment.as_deref(), Some("// primary key"));
    assert_eq!(fields.trailing, vec!["// dangling"]);
}

#[test]
fn test_round_trip_keeps_import_and_group_comments() {
    let src = r#"package models // models docs

// keep me
import (
	// formatting
	"fmt" // printing
	"strings"
	// trailing import note
)

type (
	// A is first.
	A struct{} // about A
	B int
	// trailing group note
)

type C struct{} // about C

var x = 1 // verbatim note
"#;
    let file = parse(src);
    assert_eq!(file.package_comment.as_deref(), Some("// models docs"));
    assert_eq!(file.import_doc.len(), 1);
    assert_eq!(file.import_doc[0].text, "// keep me");
    assert_eq!(file.imports[0].doc, vec!["// formatting"]);
    assert_eq!(file.imports[0].comment.as_deref(), Some("// printing"));
    assert_eq!(file.import_trailing, vec!["// trailing import note"]);

    let a = file.find_type("A").unwrap();
    assert_eq!(a.doc, vec!["// A is first."]);
    assert_eq!(a.comment.as_deref(), Some("// about A"));
    assert_eq!(file.find_type("B").unwrap().comment, None);
    match &file.decls[0] {
        Decl::Type(group) => assert_eq!(group.trailing, vec!["// trailing group note"]),
        other => panic!("expected type group, got {other:?}"),
    }
    assert_eq!(
        file.find_type("C").unwrap().comment.as_deref(),
        Some("// about C")
    );

    let printed = print_file(&file);
    assert_eq!(printed, src);
    assert_eq!(parse(&printed), file);
}

#[test]
fn test_comment_above_lone_import_stays_with_it() {
    let src = "package main\n\n// Package note.\n\n// #include <stdio.h>\nimport \"C\"\n\nimport \"fmt\"\n";
    let file = parse(src);
    assert_eq!(file.import_doc.len(), 1);
    assert!(file.import_doc[0].detached);
    assert_eq!(file.imports[0].doc, vec!["// #include <stdio.h>"]);
    assert!(file.decls.is_empty());

    let printed = print_file(&file);
    assert_eq!(
        printed,
        "package main\n\n// Package note.\n\nimport (\n\t// #include <stdio.h>\n\t\"C\"\n\t\"fmt\"\n)\n"
    );
    assert_eq!(parse(&printed), file);
}

#[test]
fn test_uses_qualifier_ignores_longer_names() {
    let file = parse("package models\n\ntype User struct {\n\tID xtags.ID\n\tAt time.Time\n}\n");
    assert!(file.uses_qualifier("time"));
    assert!(!file.uses_qualifier("tags"));
}

#[test]
fn test_syntax_error_reports_position() {
    let err = parse_source(Path::new("bad.go"), "package x\n\ntype User struct {\n").unwrap_err();
    match err {
        crate::error::TransformError::Parse { path, line, .. } => {
            assert_eq!(path, Path::new("bad.go"));
            assert!(line >= 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_add_import_is_idempotent() {
    let mut file = parse("package models\n\nimport \"fmt\"\n");
    assert!(!file.add_import("fmt"));
    assert!(file.add_import("strings"));
    assert!(file.add_named_import(Some("u"), "github.com/google/uuid"));
    assert!(!file.add_named_import(Some("u"), "github.com/google/uuid"));
    assert_eq!(file.imports.len(), 3);
    assert!(print_file(&file).contains("\tu \"github.com/google/uuid\"\n"));
}

#[test]
fn test_empty_struct_prints_compact() {
    let mut file = parse("package models\n\ntype Marker struct {\n\ttags.Only\n}\n");
    if let Some(spec) = file.type_spec_mut(DeclId { decl: 0, spec: 0 }) {
        if let TypeBody::Struct(fields) = &mut spec.body {
            fields.list.clear();
        }
    }
    assert_eq!(print_file(&file), "package models\n\ntype Marker struct{}\n");
}
