use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

/// Version label that means "whatever the remote's default branch points to".
pub const DEFAULT_VERSION: &str = "HEAD";

/// Bring `dest` to a shallow checkout of `version` (branch, tag or `HEAD`).
///
/// Workflow:
/// 1. Existing checkout: fetch the single revision and force-checkout it.
/// 2. Otherwise: shallow clone, pinned to `version` unless it is `HEAD`.
///
/// Any git failure is fatal for the run.
pub fn fetch_version(url: &str, version: &str, dest: &Path) -> Result<()> {
    if dest.join(".git").exists() {
        git_fetch_checkout(dest, version)
    } else {
        git_clone(url, version, dest)
    }
}

fn git_clone(url: &str, version: &str, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create work directory: {}", parent.display()))?;
    }

    let mut cmd = Command::new("git");
    cmd.args(["clone", "--depth", "1"]);
    if version != DEFAULT_VERSION {
        cmd.args(["--branch", version]);
    }
    cmd.arg(url);
    cmd.arg(dest);

    let output = cmd
        .output()
        .with_context(|| "Failed to execute 'git clone'. Is git installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git clone of {} at {} failed: {}", url, version, stderr.trim());
    }

    Ok(())
}

fn git_fetch_checkout(repo_dir: &Path, version: &str) -> Result<()> {
    let output = Command::new("git")
        .args(["fetch", "--depth", "1", "origin", version])
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to execute 'git fetch'")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git fetch of {} failed: {}", version, stderr.trim());
    }

    let output = Command::new("git")
        .args(["checkout", "--force", "--detach", "FETCH_HEAD"])
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to execute 'git checkout'")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git checkout of {} failed: {}", version, stderr.trim());
    }

    // Drop untracked leftovers so the tree matches the revision exactly.
    let output = Command::new("git")
        .args(["clean", "-fdx"])
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to execute 'git clean'")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git clean failed: {}", stderr.trim());
    }

    Ok(())
}

/// Commit SHA of the checkout, or an empty string when it cannot be resolved.
pub fn head_sha(repo_dir: &Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(repo_dir)
        .output();

    match output {
        Ok(o) if o.status.success() => String::from_utf8_lossy(&o.stdout).trim().to_string(),
        _ => String::new(),
    }
}
