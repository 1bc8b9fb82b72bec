use anyhow::anyhow;
use tracing::debug;

use crate::error::TransformError;
use crate::syntax::{Field, TypeBody, TypeExpr};
use crate::tags::{TagContext, TagHandler, TaggedDeclaration};

/// Adds a named field to every tagged struct.
///
/// ```rust
/// use taggen::handlers::FieldAdder;
///
/// // ID uuid.UUID `db:"id"`, importing github.com/google/uuid when needed
/// let adder = FieldAdder::new("ID", "uuid.UUID")
///     .with_import("github.com/google/uuid")
///     .with_tag(r#"db:"id""#);
/// # let _ = adder;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAdder {
    field_name: String,
    field_type: String,
    import_path: Option<String>,
    field_tag: Option<String>,
}

impl FieldAdder {
    /// Field `name` of type `ty`; a dotted type such as `uuid.UUID` refers to
    /// an imported package.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        FieldAdder {
            field_name: name.into(),
            field_type: ty.into(),
            import_path: None,
            field_tag: None,
        }
    }

    /// Import added to the owning file if missing. Empty means none.
    pub fn with_import(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.import_path = (!path.is_empty()).then_some(path);
        self
    }

    /// Tag text, without delimiters. Empty means none.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.field_tag = (!tag.is_empty()).then_some(tag);
        self
    }

    fn field(&self) -> Field {
        Field::named(
            self.field_name.clone(),
            type_expr(&self.field_type),
            self.field_tag.as_deref().map(tag_literal),
        )
    }
}

impl TagHandler for FieldAdder {
    fn handle_tag(
        &mut self,
        ctx: &mut TagContext<'_>,
        tag: &TaggedDeclaration,
    ) -> anyhow::Result<()> {
        let spec = ctx
            .file
            .type_spec_mut(tag.decl)
            .ok_or_else(|| anyhow!("internal error: no declaration behind handle for {}", tag.name))?;
        match &mut spec.body {
            TypeBody::Struct(fields) => fields.list.push(self.field()),
            other => {
                return Err(TransformError::Shape {
                    declaration: tag.name.clone(),
                    expected: "struct",
                    found: other.kind(),
                }
                .into())
            }
        }
        debug!(declaration = %tag.name, field = %self.field_name, "added field");

        if let Some(path) = &self.import_path {
            ctx.file.add_import(path);
        }
        Ok(())
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Structured path for `Name` / `pkg.Name`, verbatim text otherwise.
fn type_expr(text: &str) -> TypeExpr {
    if text.split('.').all(is_identifier) {
        TypeExpr::dotted(text)
    } else {
        TypeExpr::Verbatim(text.to_string())
    }
}

/// Raw string literal, or an interpreted one if the tag contains a backtick.
fn tag_literal(tag: &str) -> String {
    if !tag.contains('`') {
        return format!("`{tag}`");
    }
    let mut quoted = String::with_capacity(tag.len() + 2);
    quoted.push('"');
    for c in tag.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_expr() {
        assert_eq!(
            type_expr("uuid.UUID"),
            TypeExpr::Path(vec!["uuid".into(), "UUID".into()])
        );
        assert_eq!(type_expr("int"), TypeExpr::Path(vec!["int".into()]));
        assert_eq!(
            type_expr("[]time.Time"),
            TypeExpr::Verbatim("[]time.Time".into())
        );
    }

    #[test]
    fn test_tag_literal() {
        assert_eq!(tag_literal(r#"db:"id""#), r#"`db:"id"`"#);
        assert_eq!(tag_literal(r#"a:"`x`""#), r#""a:\"`x`\"""#);
    }
}
