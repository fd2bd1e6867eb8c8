use anyhow::Result;

use crate::config::Config;

/// Checkout state of one catalog entry.
#[derive(Debug, Clone)]
pub struct RepoStatus {
    pub id: String,
    pub category: String,
    pub tech: String,
    pub versions: Vec<String>,
    pub source: String,
    pub checked_out: bool,
}

pub fn get_repos(config: &Config) -> Vec<RepoStatus> {
    config
        .repos
        .iter()
        .map(|repo| RepoStatus {
            id: repo.id.clone(),
            category: repo.category.clone(),
            tech: repo.tech.clone(),
            versions: repo.versions.clone(),
            source: repo.source.clone(),
            checked_out: config.checkout_dir(repo).join(".git").exists(),
        })
        .collect()
}

pub fn list_repos(config: &Config) -> Result<()> {
    let repos = get_repos(config);
    if repos.is_empty() {
        println!("No repositories configured.");
        return Ok(());
    }

    println!(
        "{:<20} {:<12} {:<16} {:<10} {:<8} VERSIONS",
        "REPO", "CATEGORY", "TECH", "SOURCE", "CHECKOUT"
    );
    for repo in repos {
        println!(
            "{:<20} {:<12} {:<16} {:<10} {:<8} {}",
            repo.id,
            repo.category,
            repo.tech,
            repo.source,
            if repo.checked_out { "yes" } else { "no" },
            repo.versions.join(", ")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_checkout_status() {
        let tmp = TempDir::new().unwrap();
        let cfg = parse_config(&format!(
            r#"
output_root = "{root}/out"
work_root = "{root}/work"

[[repos]]
id = "present"
url = "u"
category = "c"
tech = "t"
versions = ["main", "v2"]

[[repos]]
id = "absent"
url = "u"
category = "c"
tech = "t"
versions = ["main"]
source = "community"
"#,
            root = tmp.path().display()
        ))
        .unwrap();
        std::fs::create_dir_all(tmp.path().join("work/present/.git")).unwrap();

        let repos = get_repos(&cfg);
        assert!(repos[0].checked_out);
        assert_eq!(repos[0].versions, vec!["main", "v2"]);
        assert!(!repos[1].checked_out);
        assert_eq!(repos[1].source, "community");
    }
}
