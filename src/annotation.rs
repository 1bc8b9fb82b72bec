//! # Annotation Parser
//!
//! Marker members on struct declarations may carry a literal annotation in the
//! usual Go struct-tag format: a sequence of `key:"value"` pairs separated by
//! whitespace. The same key may appear several times; values keep their order.
//!
//! ```rust
//! use taggen::annotation::{parse, unique};
//!
//! let tags = parse(r#"db:"users" index:"email" index:"name""#).unwrap();
//! assert_eq!(tags["index"], vec!["email", "name"]);
//! assert_eq!(unique(&tags)["index"], "email");
//! ```
//!
//! Values are delimited by exactly one pair of double quotes. There is no escape
//! processing, so a value can never contain `"`.

use indexmap::IndexMap;

/// Key → ordered values, in first-appearance order of the keys.
pub type Annotation = IndexMap<String, Vec<String>>;

/// Malformed literal annotation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    /// A pair had no `:` between key and value.
    #[error("missing ':' delimiter in annotation: {remainder}")]
    MissingDelimiter {
        /// Unparsed rest of the annotation
        remainder: String,
    },
    /// The value segment did not start with `"`.
    #[error("value must start with '\"' in annotation: {remainder}")]
    MissingOpeningQuote {
        /// Unparsed rest of the annotation
        remainder: String,
    },
    /// The closing `"` of a value was never found.
    #[error("unterminated value in annotation: {remainder}")]
    UnterminatedValue {
        /// Unparsed rest of the annotation
        remainder: String,
    },
}

/// Parses a literal annotation into a multi-valued mapping.
///
/// # Errors
///
/// Returns an [`AnnotationError`] when a pair lacks its colon, a value does not
/// open with `"`, or a value's closing quote is missing.
pub fn parse(literal: &str) -> Result<Annotation, AnnotationError> {
    let mut result = Annotation::new();
    let mut rest = literal.trim();
    while !rest.is_empty() {
        let Some(colon) = rest.find(':') else {
            return Err(AnnotationError::MissingDelimiter {
                remainder: rest.to_string(),
            });
        };
        let key = &rest[..colon];
        rest = rest[colon + 1..].trim();

        let Some(quoted) = rest.strip_prefix('"') else {
            return Err(AnnotationError::MissingOpeningQuote {
                remainder: rest.to_string(),
            });
        };
        let Some(end) = quoted.find('"') else {
            return Err(AnnotationError::UnterminatedValue {
                remainder: quoted.to_string(),
            });
        };

        result
            .entry(key.to_string())
            .or_default()
            .push(quoted[..end].to_string());
        rest = quoted[end + 1..].trim();
    }
    Ok(result)
}

/// Collapses each key to its first value, dropping keys without values.
pub fn unique(values: &Annotation) -> IndexMap<String, String> {
    values
        .iter()
        .filter_map(|(key, vals)| vals.first().map(|first| (key.clone(), first.clone())))
        .collect()
}
