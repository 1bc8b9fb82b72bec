//! Run configuration loaded from `taggen.toml`.
//!
//! ```toml
//! input = "models"
//! output = "gen"            # write processed files here (optional)
//! suffix = "_gen"           # inserted before `.go` in written files
//! package = "gen"           # rename the package of processed files (optional)
//! drop_build_ignore = true
//! imports = ["fmt"]
//! named_imports = { u = "github.com/google/uuid" }
//!
//! [[field]]
//! tag = "example.org/project/tags/Model"
//! name = "ID"
//! type = "uuid.UUID"
//! import = "github.com/google/uuid"
//! field_tag = 'db:"id"'
//!
//! [[templater]]
//! tag = "example.org/project/tags/Repo"
//! template = "templates/repo.go.tmpl"
//! output_dir = "gen/repos"
//! file_suffix = "_repo"
//!
//! [[collection]]
//! tag = "example.org/project/tags/Exported"
//! template = "templates/registry.go.tmpl"
//! output = "gen/registry.go"
//! defer = true
//!
//! [[inception]]
//! tag = "example.org/project/tags/Exported"
//! template = "templates/inception.go.tmpl"
//! output = "gen/inception_main.go"
//! args = ["-out", "gen"]
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tags::DEFAULT_NAMESPACE;

/// Default name of the configuration file.
pub const CONFIG_FILE: &str = "taggen.toml";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_suffix() -> String {
    "_gen".to_string()
}

fn default_file_suffix() -> String {
    "_gen".to_string()
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root directory scanned for Go files
    pub input: PathBuf,
    /// Directory processed files are written to; nothing is written if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Suffix inserted before the extension of written files
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// New package name for processed files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Strip leading `+build ignore` constraints
    #[serde(default)]
    pub drop_build_ignore: bool,
    /// Imports added to every processed file
    #[serde(default)]
    pub imports: Vec<String>,
    /// Aliased imports added to every processed file: alias → path
    #[serde(default)]
    pub named_imports: IndexMap<String, String>,
    /// Reserved namespace segment of marker packages
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Formatter command line; `TAGGEN_GOFMT` takes precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldConfig>,
    #[serde(default, rename = "templater")]
    pub templaters: Vec<TemplaterConfig>,
    #[serde(default, rename = "collection")]
    pub collections: Vec<CollectionConfig>,
    #[serde(default, rename = "inception")]
    pub inceptions: Vec<InceptionConfig>,
}

/// `[[field]]`: adds a field to tagged structs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    pub tag: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub import: String,
    #[serde(default)]
    pub field_tag: String,
}

/// `[[templater]]`: one rendered file per tagged declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TemplaterConfig {
    pub tag: String,
    pub template: PathBuf,
    pub output_dir: PathBuf,
    /// Output files are named `<snake_case name><file_suffix>.go`
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

/// `[[collection]]`: all tagged declarations rendered into one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    pub tag: String,
    pub template: PathBuf,
    pub output: PathBuf,
    /// Render after the whole run instead of at finalize
    #[serde(default)]
    pub defer: bool,
}

/// `[[inception]]`: render a program over all tagged declarations and run it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InceptionConfig {
    pub tag: String,
    pub template: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub defer: bool,
}

impl Config {
    /// Loads and parses a config file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&contents, base)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Parses config text, resolving relative paths against `base`.
    pub fn parse(contents: &str, base: &Path) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.input);
        if let Some(output) = self.output.as_mut() {
            resolve(output);
        }
        for t in &mut self.templaters {
            resolve(&mut t.template);
            resolve(&mut t.output_dir);
        }
        for c in &mut self.collections {
            resolve(&mut c.template);
            resolve(&mut c.output);
        }
        for i in &mut self.inceptions {
            resolve(&mut i.template);
            resolve(&mut i.output);
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.namespace.is_empty() || self.namespace.contains('/') {
            anyhow::bail!(
                "namespace must be a single path segment, got {:?}",
                self.namespace
            );
        }
        let tags = self
            .fields
            .iter()
            .map(|f| &f.tag)
            .chain(self.templaters.iter().map(|t| &t.tag))
            .chain(self.collections.iter().map(|c| &c.tag))
            .chain(self.inceptions.iter().map(|i| &i.tag));
        for tag in tags {
            if !tag.contains('/') {
                anyhow::bail!(
                    "handler tag {tag:?} must be a fully resolved type path such as example.org/project/tags/Name"
                );
            }
        }
        Ok(())
    }

    /// Number of configured handlers.
    pub fn handler_count(&self) -> usize {
        self.fields.len() + self.templaters.len() + self.collections.len() + self.inceptions.len()
    }
}
