//! Post-conversion cleanup for normalized markdown.
//!
//! Each pass is applied in order: line endings, embedded `<script>`/`<style>`
//! blocks, `{#anchor}` heading annotations, blank-line runs, and finally the
//! outer whitespace. The result always ends with exactly one newline and
//! cleaning it again is a no-op.

use regex::Regex;
use std::sync::LazyLock;

static EMBEDDED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script.*?</script>|<style.*?</style>").expect("valid regex")
});

static HEADING_ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{#.*?\}").expect("valid regex"));

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Clean a converted markdown document.
pub fn clean(text: &str) -> String {
    let mut text = text.replace("\r\n", "\n").replace('\r', "\n");

    // Stripping one construct can splice the pieces of another together,
    // so repeat until neither pattern matches.
    loop {
        let stripped = strip_embedded_blocks(&text);
        let stripped = strip_heading_anchors(&stripped);
        if stripped == text {
            break;
        }
        text = stripped;
    }

    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    let mut out = text.trim().to_string();
    out.push('\n');
    out
}

fn strip_embedded_blocks(text: &str) -> String {
    EMBEDDED_BLOCK_RE.replace_all(text, "").into_owned()
}

fn strip_heading_anchors(text: &str) -> String {
    HEADING_ANCHOR_RE.replace_all(text, "").into_owned()
}
