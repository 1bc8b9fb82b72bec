use std::path::Path;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::error::TransformError;

/// A Go source template, loaded at runtime.
///
/// Templates use `minijinja` syntax without auto-escaping; a trailing newline
/// in the template source is kept in the output.
#[derive(Debug, Clone)]
pub struct GoTemplate {
    name: String,
    source: String,
}

impl GoTemplate {
    /// Compiles a template from source.
    ///
    /// # Errors
    ///
    /// [`TransformError::Template`] if the source does not compile.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self, TransformError> {
        let template = GoTemplate {
            name: name.into(),
            source: source.into(),
        };
        let env = environment();
        env.template_from_named_str(&template.name, &template.source)
            .map_err(|e| TransformError::template(&template.name, &e))?;
        Ok(template)
    }

    /// Loads and compiles a template file; the path doubles as its name.
    pub fn from_path(path: &Path) -> Result<Self, TransformError> {
        let source =
            std::fs::read_to_string(path).map_err(|e| TransformError::io("read", path, e))?;
        Self::new(path.display().to_string(), source)
    }

    /// Template name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the template against any serializable context.
    pub fn render<S: Serialize>(&self, context: S) -> Result<String, TransformError> {
        let env = environment();
        env.template_from_named_str(&self.name, &self.source)
            .and_then(|tmpl| tmpl.render(context))
            .map_err(|e| TransformError::template(&self.name, &e))
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_keep_trailing_newline(true);
    env
}
