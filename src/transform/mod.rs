//! # Transform Module
//!
//! Generic, marker-independent transformations over a collected file set.
//!
//! A [`Pipeline`] runs its transformations in three phases:
//!
//! 1. `prepare` on every transformation, in registration order
//! 2. `apply` transformation-major: the first transformation sees every file
//!    before the second one sees any
//! 3. `finalize` on every transformation, in registration order
//!
//! The tag processor is itself a [`FileTransformation`], so marker handling,
//! the stock rewrites below and [`WriteOut`] compose into one pipeline:
//!
//! ```rust,no_run
//! use taggen::tags::TagProcessor;
//! use taggen::transform::{drop_build_ignore, Pipeline, WriteOut};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut pipeline = Pipeline::new();
//! pipeline.add(drop_build_ignore());
//! pipeline.add(TagProcessor::new());
//! pipeline.add(WriteOut::new("gen", "_gen"));
//! pipeline.apply_dir("models".as_ref())?;
//! # Ok(())
//! # }
//! ```

mod writeout;

pub use writeout::{add_suffix, delete_files, prepare_dir, WriteOut};

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::collect::collect_files;
use crate::syntax::{Comment, SourceFile};

/// An in-place transformation applied file by file.
///
/// It does not have to change the files; it may just as well collect
/// information and write a summary in `finalize`.
pub trait FileTransformation {
    /// Called once before any file is processed.
    fn prepare(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once for every file.
    fn apply(&mut self, file: &mut SourceFile) -> anyhow::Result<()>;

    /// Called once after every file was visited.
    fn finalize(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<T: FileTransformation + ?Sized> FileTransformation for &mut T {
    fn prepare(&mut self) -> anyhow::Result<()> {
        (**self).prepare()
    }

    fn apply(&mut self, file: &mut SourceFile) -> anyhow::Result<()> {
        (**self).apply(file)
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        (**self).finalize()
    }
}

impl<T: FileTransformation + ?Sized> FileTransformation for Box<T> {
    fn prepare(&mut self) -> anyhow::Result<()> {
        (**self).prepare()
    }

    fn apply(&mut self, file: &mut SourceFile) -> anyhow::Result<()> {
        (**self).apply(file)
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        (**self).finalize()
    }
}

/// Closure-backed transformation.
pub struct FnTransformation<F> {
    name: &'static str,
    apply: F,
}

impl<F> FnTransformation<F>
where
    F: FnMut(&mut SourceFile) -> anyhow::Result<()>,
{
    pub fn new(name: &'static str, apply: F) -> Self {
        FnTransformation { name, apply }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> FileTransformation for FnTransformation<F>
where
    F: FnMut(&mut SourceFile) -> anyhow::Result<()>,
{
    fn apply(&mut self, file: &mut SourceFile) -> anyhow::Result<()> {
        (self.apply)(file).with_context(|| format!("{} transformation", self.name))
    }
}

/// Ordered set of transformations.
#[derive(Default)]
pub struct Pipeline<'t> {
    transformations: Vec<Box<dyn FileTransformation + 't>>,
}

impl<'t> Pipeline<'t> {
    pub fn new() -> Self {
        Pipeline {
            transformations: Vec::new(),
        }
    }

    /// Appends a transformation.
    pub fn add(&mut self, transformation: impl FileTransformation + 't) -> &mut Self {
        self.transformations.push(Box::new(transformation));
        self
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    /// Runs all phases over an already collected file set.
    pub fn run(&mut self, files: &mut [SourceFile]) -> anyhow::Result<()> {
        for (idx, transformation) in self.transformations.iter_mut().enumerate() {
            transformation
                .prepare()
                .with_context(|| format!("prepare of transformation #{idx} failed"))?;
        }

        for (idx, transformation) in self.transformations.iter_mut().enumerate() {
            debug!(transformation = idx, files = files.len(), "applying transformation");
            for file in files.iter_mut() {
                transformation.apply(file).with_context(|| {
                    format!("failed to transform {}", file.relative_path.display())
                })?;
            }
        }

        for (idx, transformation) in self.transformations.iter_mut().enumerate() {
            transformation
                .finalize()
                .with_context(|| format!("finalize of transformation #{idx} failed"))?;
        }
        Ok(())
    }

    /// Collects every Go file under `root` and runs the pipeline over them.
    pub fn apply_dir(&mut self, root: &Path) -> anyhow::Result<Vec<SourceFile>> {
        let mut files = collect_files(root)?;
        self.run(&mut files)?;
        Ok(files)
    }
}

/// Collects the files under `root` and applies `transformations` in order.
pub fn apply<'t>(
    root: &Path,
    transformations: impl IntoIterator<Item = Box<dyn FileTransformation + 't>>,
) -> anyhow::Result<Vec<SourceFile>> {
    let mut pipeline = Pipeline::new();
    for transformation in transformations {
        pipeline.add(transformation);
    }
    pipeline.apply_dir(root)
}

/// Whether a header comment is a build constraint excluding the file.
fn is_build_ignore(comment: &Comment) -> bool {
    let text = comment.text.trim();
    let body = text
        .strip_prefix("//go:build")
        .or_else(|| text.strip_prefix("// +build"))
        .or_else(|| text.strip_prefix("//+build"));
    body.map(str::trim) == Some("ignore")
}

/// Removes a leading `// +build ignore` (or `//go:build ignore`) constraint.
///
/// Useful when the inputs are templates kept out of normal builds.
pub fn drop_build_ignore() -> impl FileTransformation {
    FnTransformation::new("drop_build_ignore", |file: &mut SourceFile| {
        while file.header.first().is_some_and(is_build_ignore) {
            file.header.remove(0);
        }
        Ok(())
    })
}

/// Renames the package of every file.
pub fn change_package_name(name: impl Into<String>) -> impl FileTransformation {
    let name = name.into();
    FnTransformation::new("change_package_name", move |file: &mut SourceFile| {
        file.package.clone_from(&name);
        Ok(())
    })
}

/// Adds an import to every file, unless it is already present.
pub fn add_import(path: impl Into<String>) -> impl FileTransformation {
    let path = path.into();
    FnTransformation::new("add_import", move |file: &mut SourceFile| {
        file.add_import(&path);
        Ok(())
    })
}

/// Adds a named import to every file, unless it is already present.
pub fn add_named_import(name: impl Into<String>, path: impl Into<String>) -> impl FileTransformation {
    let (name, path) = (name.into(), path.into());
    FnTransformation::new("add_named_import", move |file: &mut SourceFile| {
        file.add_named_import(Some(&name), &path);
        Ok(())
    })
}

#[cfg(test)]
mod tests;
