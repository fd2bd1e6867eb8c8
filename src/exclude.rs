//! Artifact-directory exclusion with a documentation-aware override.
//!
//! A path is excluded when one of its directory components is a configured
//! artifact name (`node_modules`, `target`, ...). The first such component
//! selects a subtree; if that subtree holds any documentation file the path
//! is kept after all. A subtree that cannot be fully scanned counts as
//! holding no documentation.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::models::has_doc_extension;

/// Decide whether `path` lies inside an artifact directory.
///
/// Every directory component of `path` is considered, so callers should pass
/// paths that are already rooted inside the checkout. See [`ExclusionFilter`]
/// for the root-aware, cached variant used by the pipeline.
pub fn is_excluded(path: &Path, excluded_names: &[String]) -> bool {
    let dirs = path.parent().unwrap_or(Path::new(""));
    match matched_subtree(Path::new(""), dirs, excluded_names) {
        Some(subtree) => !subtree_has_docs(&subtree),
        None => false,
    }
}

/// Root-bound exclusion check that remembers each subtree's verdict.
pub struct ExclusionFilter {
    root: PathBuf,
    excluded_names: Vec<String>,
    verdicts: HashMap<PathBuf, bool>,
}

impl ExclusionFilter {
    pub fn new(root: impl Into<PathBuf>, excluded_names: &[String]) -> Self {
        Self {
            root: root.into(),
            excluded_names: excluded_names.to_vec(),
            verdicts: HashMap::new(),
        }
    }

    /// Same answer as [`is_excluded`], ignoring components of the root
    /// itself and scanning each matched subtree at most once.
    pub fn is_excluded(&mut self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.check(relative.parent().unwrap_or(Path::new("")))
    }

    /// Whether every file below `dir` is excluded. Lets a walker prune
    /// whole directories with the same verdict the files would get.
    pub fn is_dir_excluded(&mut self, dir: &Path) -> bool {
        let relative = dir.strip_prefix(&self.root).unwrap_or(dir);
        self.check(relative)
    }

    fn check(&mut self, relative_dirs: &Path) -> bool {
        let Some(subtree) = matched_subtree(&self.root, relative_dirs, &self.excluded_names) else {
            return false;
        };
        let has_docs = *self
            .verdicts
            .entry(subtree)
            .or_insert_with_key(|s| subtree_has_docs(s));
        !has_docs
    }

    /// Number of subtrees scanned so far.
    pub fn scanned(&self) -> usize {
        self.verdicts.len()
    }
}

/// `base` joined with the prefix of `dirs` ending at the first component
/// named in `excluded_names`.
fn matched_subtree(base: &Path, dirs: &Path, excluded_names: &[String]) -> Option<PathBuf> {
    let mut subtree = base.to_path_buf();
    for component in dirs.components() {
        subtree.push(component.as_os_str());
        if let Component::Normal(name) = component {
            let name = name.to_string_lossy();
            if excluded_names.iter().any(|n| *n == name) {
                return Some(subtree);
            }
        }
    }
    None
}

/// Regular files, plus symlinks that resolve to one. Links are never
/// followed into directories, so a walk cannot cycle.
pub fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn subtree_has_docs(subtree: &Path) -> bool {
    for entry in WalkDir::new(subtree) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!(subtree = %subtree.display(), error = %e, "subtree scan failed");
                return false;
            }
        };
        if is_regular_file(&entry) && has_doc_extension(entry.path()) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_artifact_component() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("docs/guide.md");
        assert!(!is_excluded(&file, &names(&["node_modules"])));
    }

    #[test]
    fn test_artifact_without_docs_is_excluded() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("node_modules/pkg");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.js"), "module.exports = 1;").unwrap();
        assert!(is_excluded(
            &dir.join("index.js"),
            &names(&["node_modules"])
        ));
    }

    #[test]
    fn test_artifact_with_docs_is_kept() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("build/html/api");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.html"), "<p>api</p>").unwrap();
        fs::write(tmp.path().join("build/out.bin"), [0u8, 1, 2]).unwrap();
        let list = names(&["build"]);
        assert!(!is_excluded(&tmp.path().join("build/out.bin"), &list));
        assert!(!is_excluded(&dir.join("index.html"), &list));
    }

    #[test]
    fn test_first_matching_component_wins() {
        let tmp = TempDir::new().unwrap();
        // `build` holds docs, the nested `node_modules` does not.
        let nested = tmp.path().join("build/node_modules");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("build/notes.rst"), "Notes").unwrap();
        fs::write(nested.join("lib.js"), "x").unwrap();
        let list = names(&["build", "node_modules"]);
        assert!(!is_excluded(&nested.join("lib.js"), &list));
    }

    #[test]
    fn test_missing_subtree_is_excluded() {
        let tmp = TempDir::new().unwrap();
        let ghost = tmp.path().join("dist/ghost/readme.md");
        assert!(is_excluded(&ghost, &names(&["dist"])));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_doc_counts_as_docs() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("build")).unwrap();
        fs::create_dir_all(tmp.path().join("dist")).unwrap();
        fs::write(tmp.path().join("README.md"), "# Readme").unwrap();
        fs::write(tmp.path().join("build/out.bin"), [0u8]).unwrap();
        fs::write(tmp.path().join("dist/out.bin"), [0u8]).unwrap();
        symlink("../README.md", tmp.path().join("build/readme.md")).unwrap();
        symlink("../gone.md", tmp.path().join("dist/gone.md")).unwrap();

        let list = names(&["build", "dist"]);
        assert!(!is_excluded(&tmp.path().join("build/out.bin"), &list));
        assert!(is_excluded(&tmp.path().join("dist/out.bin"), &list));
    }

    #[test]
    fn test_filter_ignores_root_components_and_caches() {
        let tmp = TempDir::new().unwrap();
        // The checkout itself lives under a directory named like an artifact.
        let root = tmp.path().join("build/repo");
        let vendor = root.join("vendor/dep");
        fs::create_dir_all(&vendor).unwrap();
        fs::write(root.join("README.md"), "# Repo").unwrap();
        fs::write(vendor.join("a.c"), "int a;").unwrap();
        fs::write(vendor.join("b.c"), "int b;").unwrap();

        let mut filter = ExclusionFilter::new(&root, &names(&["build", "vendor"]));
        assert!(!filter.is_excluded(&root.join("README.md")));
        assert!(filter.is_excluded(&vendor.join("a.c")));
        assert!(filter.is_excluded(&vendor.join("b.c")));
        assert_eq!(filter.scanned(), 1);
        assert!(filter.is_dir_excluded(&root.join("vendor")));
        assert!(!filter.is_dir_excluded(&root.join("docs")));
    }

    #[test]
    fn test_filter_matches_uncached_function() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("target/doc")).unwrap();
        fs::create_dir_all(root.join("node_modules/x")).unwrap();
        fs::write(root.join("target/doc/index.html"), "<h1>doc</h1>").unwrap();
        fs::write(root.join("node_modules/x/y.js"), "y").unwrap();
        let list = names(&["target", "node_modules"]);
        let mut filter = ExclusionFilter::new(root, &list);
        for rel in ["target/doc/index.html", "node_modules/x/y.js", "src/lib.rs"] {
            let p = root.join(rel);
            assert_eq!(filter.is_excluded(&p), is_excluded(&p, &list), "{}", rel);
        }
    }
}
