//! # doc-corpus
//!
//! Builds a normalized markdown corpus from the documentation trees of many
//! git repositories, for language-model training or retrieval indexing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌─────────┐   ┌───────┐   ┌────────────────┐
//! │ Catalog  │──▶│ git fetch │──▶│Discovery│──▶│Convert│──▶│ Clean (+split) │
//! │ (TOML)   │   │ per tag   │   │+Exclude │   │pandoc │   │ manifest.jsonl │
//! └──────────┘   └───────────┘   └─────────┘   └───────┘   └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! corpus repos                         # list the catalog
//! corpus build                         # fetch + convert everything
//! corpus build --repo tokio            # a single repository
//! corpus convert guide.rst guide.md    # one file
//! corpus sections guide.md             # inspect header sections
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML catalog parsing |
//! | [`models`] | Core data types |
//! | [`exclude`] | Artifact-directory exclusion |
//! | [`convert`] | Conversion to normalized markdown |
//! | [`clean`] | Text cleanup |
//! | [`chunk`] | Header-based sections |
//! | [`manifest`] | JSON-lines manifests |
//! | [`connector_git`] | Shallow git checkouts |
//! | [`connector_fs`] | Document discovery |
//! | [`ingest`] | Build orchestration |

pub mod chunk;
pub mod clean;
pub mod config;
pub mod connector_fs;
pub mod connector_git;
pub mod convert;
pub mod exclude;
pub mod ingest;
pub mod inspect;
pub mod manifest;
pub mod models;
pub mod progress;
pub mod repos;
