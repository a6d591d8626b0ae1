//! Optional `docweave.toml` configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocweaveConfig {
    /// Bound on revisions requested from version control (default 5)
    pub max_revisions: Option<usize>,
    /// Extra ignore patterns applied during discovery
    pub exclude: Option<Vec<String>>,
    /// Default narrative JSON file
    pub narrative: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("docweave.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<DocweaveConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: DocweaveConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &DocweaveConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docweave.toml");
        let config = DocweaveConfig {
            max_revisions: Some(3),
            exclude: Some(vec!["generated/".to_string()]),
            narrative: Some("narratives.json".to_string()),
        };
        write_config(&path, &config, false).unwrap();
        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.max_revisions, Some(3));
        assert!(write_config(&path, &config, false).is_err());
    }

    #[test]
    fn missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }
}
