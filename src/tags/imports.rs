use std::collections::HashMap;

use crate::syntax::SourceFile;

/// Maps the names under which packages are visible in one file to their
/// import paths.
///
/// The imports
///
/// ```text
/// "github.com/foo/bar"
/// test "github.com/foo/baz"
/// ```
///
/// produce `bar → github.com/foo/bar` and `test → github.com/foo/baz`,
/// whether or not the package in `github.com/foo/bar` is actually called `bar`.
/// The empty alias maps to the file's own package name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    aliases: HashMap<String, String>,
}

impl ImportMap {
    /// Builds the map for one file.
    pub fn from_file(file: &SourceFile) -> Self {
        let mut aliases: HashMap<String, String> = file
            .imports
            .iter()
            .map(|spec| (spec.visible_name().to_string(), spec.path.clone()))
            .collect();
        aliases.insert(String::new(), file.package.clone());
        ImportMap { aliases }
    }

    /// Import path for an alias; `""` yields the file's own package.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// The file's own package identity.
    pub fn own_package(&self) -> &str {
        self.resolve("").unwrap_or_default()
    }

    /// Resolves a selector path to `(package path, full type path)`.
    ///
    /// A bare identifier resolves through the empty alias; a qualified
    /// reference resolves its first segment and appends the rest.
    pub fn resolve_type(&self, path: &[String]) -> Option<(String, String)> {
        match path {
            [] => None,
            [ident] => {
                let package = self.own_package();
                Some((package.to_string(), format!("{package}/{ident}")))
            }
            [alias, rest @ ..] => {
                let package = self.resolve(alias)?;
                Some((package.to_string(), format!("{package}/{}", rest.join("/"))))
            }
        }
    }
}
