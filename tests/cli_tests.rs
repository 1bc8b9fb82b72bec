#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{models, read, write_tree, EXPORTED};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

fn taggen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_taggen"));
    cmd.env("TAGGEN_GOFMT", "none").env("TAGGEN_LOG_LEVEL", "warn");
    cmd
}

/// Stand-in for `go`: drops the `run` verb and executes the file with `sh`.
fn fake_go(dir: &Path) -> std::path::PathBuf {
    let stub = dir.join("fake-go");
    fs::write(&stub, "#!/bin/sh\nshift\nexec sh \"$@\"\n").unwrap();
    let mut perms = fs::metadata(&stub).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&stub, perms).unwrap();
    stub
}

#[test]
fn test_cli_run_with_inception() {
    let root = tempfile::tempdir().unwrap();
    models(root.path());
    let result = root.path().join("inception.txt");
    write_tree(
        root.path(),
        &[
            (
                "tpl/inception.tmpl",
                "echo {% for e in entries %}{{ e.name }}:{{ e.tags.table }} {% endfor %}> \"$1\"\n",
            ),
            (
                "taggen.toml",
                &format!(
                    "input = \"models\"\n\n[[inception]]\ntag = \"{EXPORTED}\"\ntemplate = \"tpl/inception.tmpl\"\noutput = \"stage/inception.sh\"\nargs = [\"{}\"]\n",
                    result.display()
                ),
            ),
        ],
    );

    let output = taggen()
        .current_dir(root.path())
        .env("TAGGEN_GO_BIN", fake_go(root.path()))
        .arg("run")
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(root.path().join("stage/inception.sh").exists());
    assert_eq!(read(&result), "Order: User:users\n");
}

#[test]
fn test_cli_run_warns_about_unformatted_files() {
    let root = tempfile::tempdir().unwrap();
    models(root.path());
    write_tree(
        root.path(),
        &[("taggen.toml", "input = \"models\"\noutput = \"out\"\n")],
    );

    let output = taggen()
        .current_dir(root.path())
        .env("TAGGEN_GOFMT", "false")
        .arg("run")
        .output()
        .expect("run cli");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{stderr}");
    assert!(stderr.contains("user_gen.go was written unformatted"), "{stderr}");
    assert!(root.path().join("out/user_gen.go").exists());
}

#[test]
fn test_cli_run_reports_error_chain() {
    let root = tempfile::tempdir().unwrap();
    let output = taggen()
        .arg("run")
        .arg("--config")
        .arg(root.path().join("absent.toml"))
        .output()
        .expect("run cli");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read config"), "{stderr}");
    assert!(stderr.contains("absent.toml"), "{stderr}");
}

#[test]
fn test_cli_scan_json() {
    let root = tempfile::tempdir().unwrap();
    models(root.path());

    let output = taggen()
        .arg("scan")
        .arg(root.path().join("models"))
        .arg("--json")
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["declaration"], "Order");
    assert_eq!(entries[0]["file"], "shop/order.go");
    assert_eq!(entries[1]["declaration"], "User");
    assert_eq!(entries[1]["tag_type"], EXPORTED);
    assert_eq!(entries[1]["annotation"]["table"][0], "users");

    // scan is read-only
    assert_eq!(read(root.path().join("models/user.go")), common::USER_GO);
}

#[test]
fn test_cli_scan_plain_lines() {
    let root = tempfile::tempdir().unwrap();
    models(root.path());

    let output = taggen()
        .arg("scan")
        .arg(root.path().join("models"))
        .output()
        .expect("run cli");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            format!("shop/order.go: Order {EXPORTED}"),
            format!("user.go: User {EXPORTED}"),
        ]
    );
}
