//! Conversion of documentation files to the normalized markdown dialect.
//!
//! The actual transformation is delegated to an external converter behind
//! the narrow [`Converter`] trait, so the dialect mapping and the
//! timeout/error policy in [`FormatConverter`] can be exercised with an
//! in-process fake. [`PandocConverter`] is the production implementation.
//!
//! A single document failing to convert is never fatal: every failure is
//! logged and reported to the caller as `false`.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::Config;
use crate::models::Dialect;

/// Diagnostics containing this are expected noise from DocBook sources.
const BENIGN_WARNING: &str = "UnresolvedEntityException";

/// Diagnostics are cut to this many characters before logging.
const MAX_DIAGNOSTIC_CHARS: usize = 200;

/// Conversion error. The pipeline logs it and skips the document.
#[derive(Debug)]
pub enum ConvertError {
    Unsupported(String),
    Timeout(Duration),
    Failed { status: Option<i32>, stderr: String },
    Io(std::io::Error),
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::Unsupported(ext) => write!(f, "unsupported extension: {}", ext),
            ConvertError::Timeout(d) => write!(f, "timed out after {}s", d.as_secs_f64()),
            ConvertError::Failed { status, stderr } => match status {
                Some(code) => write!(f, "converter exited with {}: {}", code, stderr),
                None => write!(f, "converter terminated by signal: {}", stderr),
            },
            ConvertError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<std::io::Error> for ConvertError {
    fn from(e: std::io::Error) -> Self {
        ConvertError::Io(e)
    }
}

/// External markup converter.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert `input` from dialect `from` to dialect `to`.
    ///
    /// Must be deterministic for identical inputs. Implementations are
    /// cancelled by dropping the returned future when the time budget runs
    /// out, so any spawned process must die with it.
    async fn convert(&self, input: &[u8], from: &str, to: &str) -> Result<Vec<u8>, ConvertError>;
}

/// Runs `pandoc` with unwrapped paragraphs and ATX headings.
pub struct PandocConverter {
    program: String,
}

impl PandocConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Converter for PandocConverter {
    async fn convert(&self, input: &[u8], from: &str, to: &str) -> Result<Vec<u8>, ConvertError> {
        let mut child = Command::new(&self.program)
            .args(["-f", from, "-t", to, "--wrap=none", "--markdown-headings=atx"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("converter stdin unavailable"))?;

        let feed = async move {
            let res = stdin.write_all(input).await;
            drop(stdin);
            res
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(ConvertError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        fed?;

        Ok(output.stdout)
    }
}

/// Maps source files onto the normalized dialect.
pub struct FormatConverter {
    converter: Box<dyn Converter>,
    timeout: Duration,
}

impl FormatConverter {
    pub fn new(converter: Box<dyn Converter>, timeout: Duration) -> Self {
        Self { converter, timeout }
    }

    /// Pandoc-backed converter configured from the catalog defaults.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(PandocConverter::new(&config.defaults.converter)),
            config.defaults.converter_timeout(),
        )
    }

    /// Convert `src` into normalized markdown at `dst`.
    ///
    /// Returns `true` when `dst` now holds the converted document. An
    /// unsupported extension returns `false` without touching the
    /// filesystem. Markdown sources are copied byte for byte.
    pub async fn convert_file(&self, src: &Path, dst: &Path) -> bool {
        match self.try_convert_file(src, dst).await {
            Ok(()) => true,
            Err(e) => {
                report_failure(src, &e);
                false
            }
        }
    }

    async fn try_convert_file(&self, src: &Path, dst: &Path) -> Result<(), ConvertError> {
        let dialect = Dialect::from_path(src).ok_or_else(|| {
            ConvertError::Unsupported(
                src.extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default(),
            )
        })?;

        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let Some((from, to)) = dialect.pandoc_pair() else {
            std::fs::copy(src, dst)?;
            return Ok(());
        };

        let input = std::fs::read(src)?;
        let output = tokio::time::timeout(self.timeout, self.converter.convert(&input, from, to))
            .await
            .map_err(|_| ConvertError::Timeout(self.timeout))??;
        std::fs::write(dst, output)?;
        Ok(())
    }
}

fn report_failure(src: &Path, err: &ConvertError) {
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| src.display().to_string());

    match err {
        ConvertError::Unsupported(_) => {
            tracing::debug!(file = %name, "skipping unsupported file");
        }
        ConvertError::Timeout(_) => {
            tracing::warn!("Timeout converting {}", name);
        }
        ConvertError::Failed { stderr, .. } if stderr.contains(BENIGN_WARNING) => {
            tracing::debug!(file = %name, "suppressed benign converter warning");
        }
        ConvertError::Failed { stderr, .. } => {
            tracing::warn!("Warning converting {}: {}", name, truncate(stderr));
        }
        ConvertError::Io(e) => {
            tracing::warn!("Error converting {}: {}", name, truncate(&e.to_string()));
        }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_DIAGNOSTIC_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Records every call and answers with a canned result.
    struct FakeConverter {
        calls: Arc<Mutex<Vec<(String, String)>>>,
        reply: fn(&[u8]) -> Result<Vec<u8>, ConvertError>,
    }

    #[async_trait]
    impl Converter for FakeConverter {
        async fn convert(
            &self,
            input: &[u8],
            from: &str,
            to: &str,
        ) -> Result<Vec<u8>, ConvertError> {
            self.calls
                .lock()
                .unwrap()
                .push((from.to_string(), to.to_string()));
            (self.reply)(input)
        }
    }

    struct SlowConverter;

    #[async_trait]
    impl Converter for SlowConverter {
        async fn convert(&self, _: &[u8], _: &str, _: &str) -> Result<Vec<u8>, ConvertError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    fn fake(
        reply: fn(&[u8]) -> Result<Vec<u8>, ConvertError>,
    ) -> (FormatConverter, Arc<Mutex<Vec<(String, String)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let converter = FakeConverter {
            calls: calls.clone(),
            reply,
        };
        (
            FormatConverter::new(Box::new(converter), Duration::from_secs(5)),
            calls,
        )
    }

    #[tokio::test]
    async fn test_markdown_is_copied_verbatim() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("README.md");
        let bytes = b"# Title\r\n\r\n\xe2\x80\x94 raw bytes {#keep}\n".to_vec();
        fs::write(&src, &bytes).unwrap();
        let dst = tmp.path().join("out/nested/README.md");

        let (conv, calls) = fake(|_| panic!("converter must not run"));
        assert!(conv.convert_file(&src, &dst).await);
        assert_eq!(fs::read(&dst).unwrap(), bytes);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_extension_has_no_side_effects() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("notes.txt");
        fs::write(&src, "hello").unwrap();
        let dst = tmp.path().join("out/notes.md");

        let (conv, calls) = fake(|i| Ok(i.to_vec()));
        assert!(!conv.convert_file(&src, &dst).await);
        assert!(!dst.exists());
        assert!(!tmp.path().join("out").exists());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dialect_pair_passed_to_converter() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("guide.RST");
        fs::write(&src, "Title\n=====\n").unwrap();
        let dst = tmp.path().join("guide.md");

        let (conv, calls) = fake(|_| Ok(b"# Title\n".to_vec()));
        assert!(conv.convert_file(&src, &dst).await);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "# Title\n");
        assert_eq!(
            *calls.lock().unwrap(),
            vec![("rst".to_string(), "gfm".to_string())]
        );
    }

    #[tokio::test]
    async fn test_converter_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("book.xml");
        fs::write(&src, "<book/>").unwrap();
        let dst = tmp.path().join("book.md");

        let (conv, _) = fake(|_| {
            Err(ConvertError::Failed {
                status: Some(64),
                stderr: "UnresolvedEntityException: &foo;".to_string(),
            })
        });
        assert!(!conv.convert_file(&src, &dst).await);
        assert!(!dst.exists());
    }

    #[tokio::test]
    async fn test_timeout_returns_false() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("slow.tex");
        fs::write(&src, "\\section{Slow}").unwrap();
        let dst = tmp.path().join("slow.md");

        let conv = FormatConverter::new(Box::new(SlowConverter), Duration::from_millis(50));
        assert!(!conv.convert_file(&src, &dst).await);
        assert!(!dst.exists());
    }

    #[tokio::test]
    async fn test_missing_converter_binary_returns_false() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("page.html");
        fs::write(&src, "<h1>Hi</h1>").unwrap();
        let dst = tmp.path().join("page.md");

        let conv = FormatConverter::new(
            Box::new(PandocConverter::new("definitely-not-a-converter-binary")),
            Duration::from_secs(5),
        );
        assert!(!conv.convert_file(&src, &dst).await);
        assert!(!dst.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failed() {
        let conv = PandocConverter::new("false");
        let err = conv.convert(b"x", "html", "gfm").await.unwrap_err();
        assert!(matches!(err, ConvertError::Failed { status: Some(1), .. }));
    }

    #[test]
    fn test_truncate_counts_chars() {
        let long = "é".repeat(500);
        assert_eq!(truncate(&long).chars().count(), MAX_DIAGNOSTIC_CHARS);
        assert_eq!(truncate("short"), "short");
    }
}
