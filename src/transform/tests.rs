#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::generator::{Formatter, GoWriter};
use crate::syntax::{parse_source, print_file};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

fn parse(rel: &str, src: &str) -> SourceFile {
    parse_source(Path::new(rel), src).expect("valid go")
}

struct Tracer {
    id: &'static str,
    log: Rc<RefCell<Vec<String>>>,
}

impl FileTransformation for Tracer {
    fn prepare(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().push(format!("{} prepare", self.id));
        Ok(())
    }

    fn apply(&mut self, file: &mut SourceFile) -> anyhow::Result<()> {
        self.log
            .borrow_mut()
            .push(format!("{} {}", self.id, file.relative_path.display()));
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().push(format!("{} finalize", self.id));
        Ok(())
    }
}

#[test]
fn test_pipeline_is_transformation_major() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut pipeline = Pipeline::new();
    pipeline
        .add(Tracer { id: "t1", log: Rc::clone(&log) })
        .add(Tracer { id: "t2", log: Rc::clone(&log) });
    assert_eq!(pipeline.len(), 2);

    let mut files = vec![parse("a.go", "package a\n"), parse("b.go", "package b\n")];
    pipeline.run(&mut files).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "t1 prepare",
            "t2 prepare",
            "t1 a.go",
            "t1 b.go",
            "t2 a.go",
            "t2 b.go",
            "t1 finalize",
            "t2 finalize",
        ]
    );
}

#[test]
fn test_later_transformation_sees_earlier_changes() {
    let mut files = vec![parse("a.go", "package a\n"), parse("b.go", "package b\n")];
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let mut pipeline = Pipeline::new();
    pipeline.add(change_package_name("renamed"));
    pipeline.add(FnTransformation::new("observe", move |file: &mut SourceFile| {
        sink.borrow_mut().push(file.package.clone());
        Ok(())
    }));
    pipeline.run(&mut files).unwrap();

    assert_eq!(*seen.borrow(), vec!["renamed", "renamed"]);
}

#[test]
fn test_apply_error_names_file_and_transformation() {
    let mut files = vec![parse("pkg/bad.go", "package a\n")];
    let mut pipeline = Pipeline::new();
    pipeline.add(FnTransformation::new("explode", |_: &mut SourceFile| {
        anyhow::bail!("boom")
    }));
    let err = pipeline.run(&mut files).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("pkg/bad.go"), "{chain}");
    assert!(chain.contains("explode transformation"), "{chain}");
    assert!(chain.contains("boom"), "{chain}");
}

#[test]
fn test_drop_build_ignore() {
    let mut file = parse(
        "a.go",
        "//go:build ignore\n// +build ignore\n\n// Package a docs.\npackage a\n",
    );
    drop_build_ignore().apply(&mut file).unwrap();
    assert_eq!(print_file(&file), "// Package a docs.\npackage a\n");

    let mut untouched = parse("b.go", "// +build linux\n\npackage b\n");
    drop_build_ignore().apply(&mut untouched).unwrap();
    assert_eq!(untouched.header.len(), 1);
}

#[test]
fn test_import_transformations_are_idempotent() {
    let mut file = parse("a.go", "package a\n\nimport \"fmt\"\n");
    let mut plain = add_import("fmt");
    let mut named = add_named_import("u", "github.com/google/uuid");
    for _ in 0..2 {
        plain.apply(&mut file).unwrap();
        named.apply(&mut file).unwrap();
    }
    assert_eq!(file.imports.len(), 2);
    assert_eq!(file.imports[1].name.as_deref(), Some("u"));
}

#[test]
fn test_add_suffix() {
    assert_eq!(
        add_suffix(Path::new("dir1/dir2/file.go"), "_gen"),
        PathBuf::from("dir1/dir2/file_gen.go")
    );
    assert_eq!(add_suffix(Path::new("Makefile"), "_x"), PathBuf::from("Makefile_x"));
    assert_eq!(add_suffix(Path::new("a.go"), ""), PathBuf::from("a.go"));
}

#[test]
fn test_prepare_dir_creates_or_cleans() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("gen");
    prepare_dir(&out, "_gen").unwrap();
    assert!(out.is_dir());

    fs::create_dir_all(out.join("sub")).unwrap();
    fs::write(out.join("a_gen.go"), "").unwrap();
    fs::write(out.join("sub/b_gen.go"), "").unwrap();
    fs::write(out.join("keep.go"), "").unwrap();
    fs::write(out.join("a_gen.go.txt"), "").unwrap();

    prepare_dir(&out, "_gen").unwrap();
    assert!(!out.join("a_gen.go").exists());
    assert!(!out.join("sub/b_gen.go").exists());
    assert!(out.join("keep.go").exists());
    assert!(out.join("a_gen.go.txt").exists());
}

#[test]
fn test_delete_files_counts_removals() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.tmp"), "").unwrap();
    fs::write(dir.path().join("y.tmp"), "").unwrap();
    fs::write(dir.path().join("z.go"), "").unwrap();
    let removed = delete_files(dir.path(), |p| p.extension().is_some_and(|e| e == "tmp")).unwrap();
    assert_eq!(removed, 2);
    assert!(dir.path().join("z.go").exists());
}

#[test]
fn test_apply_dir_with_write_out() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::create_dir_all(input.path().join("nested")).unwrap();
    fs::write(input.path().join("a.go"), "// +build ignore\n\npackage a\n").unwrap();
    fs::write(input.path().join("nested/b.go"), "package b\n").unwrap();
    fs::write(output.path().join("stale_gen.go"), "package stale\n").unwrap();

    let files = apply(
        input.path(),
        [
            Box::new(drop_build_ignore()) as Box<dyn FileTransformation>,
            Box::new(change_package_name("gen")),
            Box::new(WriteOut::with_writer(
                output.path(),
                "_gen",
                GoWriter::new(Formatter::Disabled),
            )),
        ],
    )
    .unwrap();

    assert_eq!(files.len(), 2);
    assert!(!output.path().join("stale_gen.go").exists());
    assert_eq!(
        fs::read_to_string(output.path().join("a_gen.go")).unwrap(),
        "package gen\n"
    );
    assert_eq!(
        fs::read_to_string(output.path().join("nested/b_gen.go")).unwrap(),
        "package gen\n"
    );
}

fn failing_writer() -> GoWriter {
    GoWriter::new(Formatter::Command {
        program: "sh".into(),
        args: vec!["-c".into(), "exit 3".into()],
    })
}

#[test]
fn test_write_out_keeps_format_failures() {
    use crate::error::TransformError;
    use crate::generator::WriteReports;

    let output = tempfile::tempdir().unwrap();
    let mut write_out = WriteOut::with_writer(output.path(), "_gen", failing_writer());
    let mut file = parse("a.go", "package a\n");
    write_out.apply(&mut file).unwrap();

    // the unformatted buffer still lands on disk
    assert_eq!(
        fs::read_to_string(output.path().join("a_gen.go")).unwrap(),
        "package a\n"
    );
    let report = &write_out.reports()[0];
    assert_eq!(report.path, output.path().join("a_gen.go"));
    assert!(!report.is_formatted());
    assert!(matches!(report.format_error, Some(TransformError::Format { .. })));

    assert_eq!(write_out.take_reports().len(), 1);
    assert!(write_out.reports().is_empty());
}
