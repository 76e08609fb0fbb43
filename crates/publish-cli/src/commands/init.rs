//! Init command implementation

use std::path::{Path, PathBuf};

use colored::Colorize;

use publish_core::PublishConfig;
use publish_core::config::DEFAULT_CONFIG_FILE;

use crate::error::{CliError, Result};

/// Write a starter configuration to `cwd`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn run_init(cwd: &Path, url: Option<&str>, content: Option<&Path>, force: bool) -> Result<()> {
    let path = cwd.join(DEFAULT_CONFIG_FILE);
    if path.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    let mut config = PublishConfig::default();
    if let Some(url) = url {
        config.pub_scm_url = url.to_string();
    }
    if let Some(content) = content {
        config.content = PathBuf::from(content);
    }
    config.output_encoding = Some("utf-8".to_string());
    config.save(&path)?;

    println!("{} Wrote {}", "OK".green().bold(), path.display());
    if config.pub_scm_url.is_empty() {
        println!(
            "   Set {} before running {}.",
            "pub-scm-url".cyan(),
            "scm-publish publish".cyan()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_loadable_config() {
        let temp = TempDir::new().unwrap();

        run_init(
            temp.path(),
            Some("scm:git:/srv/site.git"),
            Some(Path::new("public")),
            false,
        )
        .unwrap();

        let config = PublishConfig::load(&temp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.pub_scm_url, "scm:git:/srv/site.git");
        assert_eq!(config.content, PathBuf::from("public"));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "dry-run = true\n").unwrap();

        let err = run_init(temp.path(), None, None, false).unwrap_err();
        assert!(matches!(err, CliError::User { .. }));

        run_init(temp.path(), None, None, true).unwrap();
        let config = PublishConfig::load(&temp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert!(!config.dry_run);
    }
}
