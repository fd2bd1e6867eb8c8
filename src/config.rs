//! TOML catalog parsing and validation.
//!
//! The catalog names the output and work roots, pipeline defaults, and the
//! list of repositories to ingest. It is loaded once and passed by reference
//! to every stage of the pipeline.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub output_root: PathBuf,
    pub work_root: PathBuf,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub repos: Vec<RepoEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Defaults {
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    /// Extra globs matched against the path relative to the checkout root.
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default = "default_max_header_level")]
    pub max_header_level: usize,
    #[serde(default)]
    pub split_sections: bool,
    #[serde(default = "default_converter")]
    pub converter: String,
    #[serde(default = "default_converter_timeout_secs")]
    pub converter_timeout_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs(),
            exclude_globs: Vec::new(),
            max_header_level: default_max_header_level(),
            split_sections: false,
            converter: default_converter(),
            converter_timeout_secs: default_converter_timeout_secs(),
        }
    }
}

impl Defaults {
    pub fn converter_timeout(&self) -> Duration {
        Duration::from_secs(self.converter_timeout_secs)
    }
}

fn default_exclude_dirs() -> Vec<String> {
    [
        "node_modules",
        "target",
        "build",
        "dist",
        "vendor",
        "__pycache__",
        ".venv",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_max_header_level() -> usize {
    3
}
fn default_converter() -> String {
    "pandoc".to_string()
}
fn default_converter_timeout_secs() -> u64 {
    30
}

/// One repository of the catalog.
#[derive(Debug, Deserialize, Clone)]
pub struct RepoEntry {
    pub id: String,
    pub url: String,
    pub category: String,
    pub tech: String,
    pub versions: Vec<String>,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "official".to_string()
}

impl Config {
    /// Output directory for one repository/version pair.
    pub fn output_dir(&self, repo: &RepoEntry, version: &str) -> PathBuf {
        self.output_root
            .join(&repo.category)
            .join(&repo.tech)
            .join(version)
    }

    /// Local checkout directory for a repository.
    pub fn checkout_dir(&self, repo: &RepoEntry) -> PathBuf {
        self.work_root.join(&repo.id)
    }

    pub fn find_repo(&self, id: &str) -> Option<&RepoEntry> {
        self.repos.iter().find(|r| r.id == id)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    let defaults = &config.defaults;
    if !(1..=6).contains(&defaults.max_header_level) {
        bail!("defaults.max_header_level must be in [1, 6]");
    }
    if defaults.converter_timeout_secs == 0 {
        bail!("defaults.converter_timeout_secs must be > 0");
    }
    if defaults.converter.trim().is_empty() {
        bail!("defaults.converter must not be empty");
    }
    build_globset(&defaults.exclude_globs)
        .with_context(|| "Invalid pattern in defaults.exclude_globs")?;

    let mut seen = HashSet::new();
    for repo in &config.repos {
        if repo.id.trim().is_empty() {
            bail!("repository with url '{}' has an empty id", repo.url);
        }
        if !seen.insert(repo.id.as_str()) {
            bail!("duplicate repository id: '{}'", repo.id);
        }
        if repo.versions.is_empty() {
            bail!("repository '{}' must list at least one version", repo.id);
        }
    }

    Ok(config)
}

pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
