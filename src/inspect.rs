//! Single-file commands: convert one document, or show its sections.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::chunk::split_by_headers;
use crate::clean::clean;
use crate::convert::FormatConverter;

/// Convert and clean `src` into `dst`, the same way a build pass does.
pub async fn run_convert(converter: &FormatConverter, src: &Path, dst: &Path) -> Result<()> {
    if !converter.convert_file(src, dst).await {
        bail!("Failed to convert {}", src.display());
    }

    let raw = std::fs::read(dst).with_context(|| format!("Failed to read {}", dst.display()))?;
    let text = clean(&String::from_utf8_lossy(&raw));
    std::fs::write(dst, &text).with_context(|| format!("Failed to write {}", dst.display()))?;

    println!("converted {} -> {}", src.display(), dst.display());
    Ok(())
}

/// Print the header sections of a markdown file as JSON lines.
pub fn run_sections(path: &Path, max_level: usize) -> Result<()> {
    if !(1..=6).contains(&max_level) {
        bail!("--max-level must be in [1, 6], got {}", max_level);
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    for section in split_by_headers(&text, max_level) {
        println!("{}", serde_json::to_string(&section)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sections_rejects_out_of_range_level() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("doc.md");
        std::fs::write(&doc, "# A\ntext").unwrap();

        assert!(run_sections(&doc, 0).is_err());
        let err = run_sections(&doc, 100_000).unwrap_err();
        assert!(err.to_string().contains("[1, 6]"));
        assert!(run_sections(&doc, 6).is_ok());
    }
}
