#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

pub const EXPORTED: &str = "example.org/project/tags/Exported";

pub const USER_GO: &str = "package models\n\nimport \"example.org/project/tags\"\n\ntype User struct {\n\ttags.Exported `table:\"users\"`\n\tName string\n}\n";

pub const ORDER_GO: &str = "package models\n\nimport t \"example.org/project/tags\"\n\n// Order is placed by a User.\ntype Order struct {\n\tt.Exported\n\tTotal int64\n}\n\ntype Status int\n";

/// Writes `(relative path, contents)` pairs below `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

/// `models/` with a tagged `User` and, in a subdirectory, a tagged `Order`.
pub fn models(root: &Path) {
    write_tree(
        root,
        &[("models/user.go", USER_GO), ("models/shop/order.go", ORDER_GO)],
    );
}

pub fn read(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}
