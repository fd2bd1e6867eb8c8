//! Corpus build orchestration.
//!
//! Coordinates the full flow for every catalog entry and version:
//! fetch → discover → convert → clean → (split) → manifest. A fetch failure
//! aborts the run; a document that fails to convert is logged and skipped.

use anyhow::{anyhow, Context, Result};
use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};

use crate::chunk::{slugify, split_by_headers, MAX_SLUG_LEN};
use crate::clean::clean;
use crate::config::{Config, RepoEntry};
use crate::connector_fs::discover_documents;
use crate::connector_git;
use crate::convert::FormatConverter;
use crate::manifest::{record_id, ManifestWriter, SectionWriter, MANIFEST_FILE, SECTIONS_FILE};
use crate::models::{path_string, ManifestRecord, SectionRecord, SourceDocument};
use crate::progress::{ProgressEvent, ProgressReporter};

/// Outcome of one repository/version pass.
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub repo: String,
    pub version: String,
    pub git_sha: String,
    pub manifest: PathBuf,
    pub discovered: u64,
    pub written: u64,
    pub skipped: u64,
    pub sections: u64,
}

#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub passes: Vec<PassSummary>,
}

impl BuildSummary {
    pub fn print(&self, output_root: &Path) {
        for pass in &self.passes {
            println!("build {}/{}", pass.repo, pass.version);
            if !pass.git_sha.is_empty() {
                println!("  commit: {}", pass.git_sha);
            }
            println!("  discovered: {} files", pass.discovered);
            println!("  written: {} documents", pass.written);
            println!("  skipped: {} documents", pass.skipped);
            if pass.sections > 0 {
                println!("  sections: {}", pass.sections);
            }
            println!("  manifest: {}", pass.manifest.display());
        }
        println!("corpus ready: {}", output_root.display());
    }
}

/// Build the corpus for every catalog entry, or only `repo_filter`.
pub async fn run_build(
    config: &Config,
    converter: &FormatConverter,
    repo_filter: Option<&str>,
    reporter: &dyn ProgressReporter,
) -> Result<BuildSummary> {
    let repos: Vec<&RepoEntry> = match repo_filter {
        Some(id) => vec![config
            .find_repo(id)
            .ok_or_else(|| anyhow!("Unknown repository: '{}'", id))?],
        None => config.repos.iter().collect(),
    };

    for root in [&config.output_root, &config.work_root] {
        std::fs::create_dir_all(root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;
    }

    let mut summary = BuildSummary::default();
    for repo in repos {
        for version in &repo.versions {
            tracing::info!(repo = %repo.id, version = %version, "processing");
            reporter.report(ProgressEvent::Fetching {
                label: pass_label(repo, version),
            });

            let checkout = config.checkout_dir(repo);
            connector_git::fetch_version(&repo.url, version, &checkout)
                .with_context(|| format!("Failed to fetch {} at {}", repo.id, version))?;
            let sha = connector_git::head_sha(&checkout);

            let pass =
                process_checkout(config, repo, version, &checkout, &sha, converter, reporter)
                    .await?;
            summary.passes.push(pass);
        }
    }

    Ok(summary)
}

/// Convert every document of an already fetched checkout and rewrite the
/// pair's manifest from scratch.
pub async fn process_checkout(
    config: &Config,
    repo: &RepoEntry,
    version: &str,
    checkout: &Path,
    git_sha: &str,
    converter: &FormatConverter,
    reporter: &dyn ProgressReporter,
) -> Result<PassSummary> {
    let label = pass_label(repo, version);
    let out_dir = config.output_dir(repo, version);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let manifest_path = out_dir.join(MANIFEST_FILE);
    let mut manifest = ManifestWriter::create(&manifest_path)?;
    let mut section_writer = if config.defaults.split_sections {
        Some(SectionWriter::create(&out_dir.join(SECTIONS_FILE))?)
    } else {
        None
    };

    let documents = discover_documents(checkout, config)?;
    let total = documents.len() as u64;
    reporter.report(ProgressEvent::Discovered {
        label: label.clone(),
        total,
    });

    let mut pass = PassSummary {
        repo: repo.id.clone(),
        version: version.to_string(),
        git_sha: git_sha.to_string(),
        manifest: manifest_path,
        discovered: total,
        written: 0,
        skipped: 0,
        sections: 0,
    };

    for (i, doc) in documents.iter().enumerate() {
        match convert_document(&out_dir, doc, converter).await? {
            Some(text) => {
                let record = manifest_record(repo, version, git_sha, doc, text);
                manifest.append(&record)?;
                pass.written += 1;

                if let Some(writer) = section_writer.as_mut() {
                    for section in section_records(&record, config.defaults.max_header_level) {
                        writer.append(&section)?;
                        pass.sections += 1;
                    }
                }
            }
            None => pass.skipped += 1,
        }

        reporter.report(ProgressEvent::Converting {
            label: label.clone(),
            n: i as u64 + 1,
            total,
        });
    }

    tracing::info!(
        repo = %repo.id,
        version = %version,
        written = pass.written,
        skipped = pass.skipped,
        "pass finished"
    );

    Ok(pass)
}

/// Convert and clean one document in place under `out_dir`.
///
/// `Ok(None)` means the document was skipped; errors are reserved for
/// failing to write the cleaned output.
async fn convert_document(
    out_dir: &Path,
    doc: &SourceDocument,
    converter: &FormatConverter,
) -> Result<Option<String>> {
    let dst = out_dir.join(doc.output_relative());
    if !converter.convert_file(&doc.path, &dst).await {
        return Ok(None);
    }

    let raw = match std::fs::read(&dst) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!("Error reading converted {}: {}", dst.display(), e);
            return Ok(None);
        }
    };

    let text = clean(&raw);
    std::fs::write(&dst, &text)
        .with_context(|| format!("Failed to write document: {}", dst.display()))?;
    Ok(Some(text))
}

fn manifest_record(
    repo: &RepoEntry,
    version: &str,
    git_sha: &str,
    doc: &SourceDocument,
    text: String,
) -> ManifestRecord {
    let original_file = doc.original_file();
    let file = path_string(&doc.output_relative());

    ManifestRecord {
        id: record_id(&repo.id, version, &original_file),
        file: file.clone(),
        text,
        repo: repo.id.clone(),
        tech: repo.tech.clone(),
        version: version.to_string(),
        source: repo.source.clone(),
        git_sha: git_sha.to_string(),
        file_path: file,
        original_file,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

fn section_records(record: &ManifestRecord, max_level: usize) -> Vec<SectionRecord> {
    split_by_headers(&record.text, max_level)
        .into_iter()
        .enumerate()
        .map(|(index, section)| {
            let slug = slugify(&section.title, MAX_SLUG_LEN);
            SectionRecord {
                id: format!("{}#{:03}-{}", record.id, index, slug),
                doc_id: record.id.clone(),
                file: record.file.clone(),
                index,
                title: section.title,
                slug,
                level: section.level,
                content: section.content,
            }
        })
        .collect()
}

fn pass_label(repo: &RepoEntry, version: &str) -> String {
    format!("{}/{}", repo.id, version)
}
