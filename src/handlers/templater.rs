use std::path::PathBuf;

use anyhow::Context;

use super::entry::TemplateEntry;
use crate::generator::{GoTemplate, GoWriter, WriteReport, WriteReports};
use crate::tags::{TagContext, TagHandler, TaggedDeclaration};

/// Maps a declared name to the output file name.
pub type NameFn = Box<dyn Fn(&str) -> String>;

/// Renders one file per tagged declaration, immediately on each match.
///
/// The template sees a single [`TemplateEntry`] at the top level:
/// `type {{ name }}Repo struct{}`.
pub struct Templater {
    output_dir: PathBuf,
    template: GoTemplate,
    make_name: NameFn,
    writer: GoWriter,
    reports: Vec<WriteReport>,
}

impl Templater {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        template: GoTemplate,
        make_name: impl Fn(&str) -> String + 'static,
    ) -> Self {
        Templater {
            output_dir: output_dir.into(),
            template,
            make_name: Box::new(make_name),
            writer: GoWriter::from_env(),
            reports: Vec::new(),
        }
    }

    pub fn with_writer(mut self, writer: GoWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Reports of every file written so far, including formatting failures.
    pub fn reports(&self) -> &[WriteReport] {
        &self.reports
    }
}

impl TagHandler for Templater {
    fn handle_tag(
        &mut self,
        ctx: &mut TagContext<'_>,
        tag: &TaggedDeclaration,
    ) -> anyhow::Result<()> {
        let entry = TemplateEntry::from_tag(ctx, tag)?;
        let path = self.output_dir.join((self.make_name)(&entry.name));
        let report = self
            .writer
            .write_template(&path, &self.template, &entry)
            .with_context(|| format!("templater {} for {}", self.template.name(), tag.name))?;
        self.reports.push(report);
        Ok(())
    }
}

impl WriteReports for Templater {
    fn take_reports(&mut self) -> Vec<WriteReport> {
        std::mem::take(&mut self.reports)
    }
}

/// `UserProfile` → `user_profile`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Naming function producing `<snake_case name><suffix>.go`.
pub fn go_file_name(suffix: impl Into<String>) -> impl Fn(&str) -> String + 'static {
    let suffix = suffix.into();
    move |name| format!("{}{suffix}.go", snake_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("UserProfile"), "user_profile");
        assert_eq!(snake_case("HTTPServer"), "http_server");
        assert_eq!(snake_case("ID"), "id");
        assert_eq!(snake_case("v2Thing"), "v2_thing");
    }

    #[test]
    fn test_go_file_name() {
        let name = go_file_name("_repo");
        assert_eq!(name("UserProfile"), "user_profile_repo.go");
    }
}
