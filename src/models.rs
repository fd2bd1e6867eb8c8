//! Core data models used throughout the corpus builder.
//!
//! These types represent the documents, sections, and manifest records that
//! flow through the conversion pipeline.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extensions recognized as documentation, lowercase, without the dot.
pub const DOC_EXTENSIONS: &[&str] = &[
    "md", "mdx", "rst", "adoc", "asciidoc", "xml", "tex", "html", "htm",
];

/// Extension of the normalized dialect.
pub const NORMALIZED_EXTENSION: &str = "md";

/// Pandoc name of the normalized dialect.
pub const NORMALIZED_DIALECT: &str = "gfm";

/// Markup dialect of a source file, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Already normalized; copied verbatim.
    Markdown,
    Mdx,
    ReStructuredText,
    AsciiDoc,
    DocBook,
    Latex,
    Html,
}

impl Dialect {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" => Some(Dialect::Markdown),
            "mdx" => Some(Dialect::Mdx),
            "rst" => Some(Dialect::ReStructuredText),
            "adoc" | "asciidoc" => Some(Dialect::AsciiDoc),
            "xml" => Some(Dialect::DocBook),
            "tex" => Some(Dialect::Latex),
            "html" | "htm" => Some(Dialect::Html),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// The `(from, to)` pair handed to the external converter, or `None`
    /// for the pass-through dialect.
    pub fn pandoc_pair(&self) -> Option<(&'static str, &'static str)> {
        let from = match self {
            Dialect::Markdown => return None,
            Dialect::Mdx => "markdown",
            Dialect::ReStructuredText => "rst",
            Dialect::AsciiDoc => "asciidoc",
            Dialect::DocBook => "docbook",
            Dialect::Latex => "latex",
            Dialect::Html => "html",
        };
        Some((from, NORMALIZED_DIALECT))
    }
}

/// Returns true when the path has a documentation extension.
pub fn has_doc_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| DOC_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// A documentation file discovered inside a checkout.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub relative: PathBuf,
    pub dialect: Dialect,
}

impl SourceDocument {
    /// Relative original path as recorded in the manifest.
    pub fn original_file(&self) -> String {
        path_string(&self.relative)
    }

    /// Relative output path: the original with its extension replaced by `.md`.
    pub fn output_relative(&self) -> PathBuf {
        self.relative.with_extension(NORMALIZED_EXTENSION)
    }
}

/// Forward-slash string form of a relative path.
pub fn path_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// A header-delimited span of a normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub level: usize,
    pub content: String,
}

/// One line of `manifest.jsonl`.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestRecord {
    pub id: String,
    pub file: String,
    pub text: String,
    pub repo: String,
    pub tech: String,
    pub version: String,
    pub source: String,
    pub git_sha: String,
    pub file_path: String,
    pub original_file: String,
    pub generated_at: String,
}

/// One line of `sections.jsonl`.
#[derive(Debug, Clone, Serialize)]
pub struct SectionRecord {
    pub id: String,
    pub doc_id: String,
    pub file: String,
    pub index: usize,
    pub title: String,
    pub slug: String,
    pub level: usize,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_mapping() {
        assert_eq!(Dialect::from_extension("MD"), Some(Dialect::Markdown));
        assert_eq!(Dialect::from_extension("htm"), Some(Dialect::Html));
        assert_eq!(Dialect::from_extension("asciidoc"), Some(Dialect::AsciiDoc));
        assert_eq!(Dialect::from_extension("txt"), None);
        assert_eq!(Dialect::Markdown.pandoc_pair(), None);
        assert_eq!(Dialect::DocBook.pandoc_pair(), Some(("docbook", "gfm")));
        assert_eq!(Dialect::Mdx.pandoc_pair(), Some(("markdown", "gfm")));
    }

    #[test]
    fn test_every_doc_extension_has_a_dialect() {
        for ext in DOC_EXTENSIONS {
            assert!(Dialect::from_extension(ext).is_some(), "{}", ext);
        }
    }

    #[test]
    fn test_output_relative_replaces_extension() {
        let doc = SourceDocument {
            path: PathBuf::from("/w/repo/docs/guide.rst"),
            relative: PathBuf::from("docs/guide.rst"),
            dialect: Dialect::ReStructuredText,
        };
        assert_eq!(doc.output_relative(), PathBuf::from("docs/guide.md"));
        assert_eq!(doc.original_file(), "docs/guide.rst");
    }

    #[test]
    fn test_has_doc_extension() {
        assert!(has_doc_extension(Path::new("a/b/README.MD")));
        assert!(!has_doc_extension(Path::new("a/b/main.rs")));
        assert!(!has_doc_extension(Path::new("a/b/Makefile")));
    }
}
