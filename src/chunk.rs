//! Header-boundary section splitter.
//!
//! Splits a normalized markdown document into [`Section`]s at ATX headers up
//! to a configurable depth. Deeper headers stay inside the enclosing
//! section.
//!
//! # Header grammar
//!
//! ```text
//! header := BOL "#"{1,max_level} WS+ title EOL
//! title  := any characters except newline, at least one
//! ```
//!
//! Each section runs from the start of its header line to the start of the
//! next matched header (or the end of the document) and is trimmed. A
//! document without any matched header yields one level-0 section titled
//! `root` holding the whole trimmed text.
//!
//! # Example
//!
//! ```rust
//! use doc_corpus::chunk::split_by_headers;
//!
//! let sections = split_by_headers("# A\ntext1\n## B\ntext2\n# C\ntext3", 2);
//! assert_eq!(sections.len(), 3);
//! assert_eq!(sections[1].title, "B");
//! assert_eq!(sections[1].level, 2);
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::models::Section;

/// Title used for the whole-document fallback section.
pub const ROOT_TITLE: &str = "root";

/// Maximum slug length used for section identifiers.
pub const MAX_SLUG_LEN: usize = 80;

/// Split `text` into header-delimited sections, in document order.
pub fn split_by_headers(text: &str, max_level: usize) -> Vec<Section> {
    let matches: Vec<(usize, usize, String)> = match header_pattern(max_level) {
        Some(re) => re
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let level = caps.get(1)?.as_str().len();
                let title = caps.get(2)?.as_str().trim().to_string();
                Some((whole.start(), level, title))
            })
            .collect(),
        None => Vec::new(),
    };

    if matches.is_empty() {
        return vec![Section {
            title: ROOT_TITLE.to_string(),
            level: 0,
            content: text.trim().to_string(),
        }];
    }

    let mut sections = Vec::with_capacity(matches.len());
    for (i, (start, level, title)) in matches.iter().enumerate() {
        let end = matches
            .get(i + 1)
            .map(|(next, _, _)| *next)
            .unwrap_or(text.len());
        sections.push(Section {
            title: title.clone(),
            level: *level,
            content: text[*start..end].trim().to_string(),
        });
    }
    sections
}

fn header_pattern(max_level: usize) -> Option<Regex> {
    if max_level == 0 {
        return None;
    }
    Regex::new(&format!(r"(?m)^(#{{1,{}}})\s+(.+)$", max_level)).ok()
}

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

static SEPARATOR_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("valid regex"));

/// Filesystem- and URL-safe slug for a section title, at most `max_len` chars.
pub fn slugify(title: &str, max_len: usize) -> String {
    let lowered = title.trim().to_lowercase();
    let kept = NON_WORD_RE.replace_all(&lowered, "");
    let dashed = SEPARATOR_RUN_RE.replace_all(&kept, "-");
    let slug = dashed.trim_matches('-');
    if slug.is_empty() {
        return "section".to_string();
    }
    if slug.chars().count() > max_len {
        let truncated: String = slug.chars().take(max_len).collect();
        return truncated.trim_end_matches('-').to_string();
    }
    slug.to_string()
}
