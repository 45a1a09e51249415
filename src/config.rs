use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::LoadOptions;

/// Catalog settings read from `archgraph.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Treat unresolved relation targets as fatal after the resolution pass
    pub strict_relations: Option<bool>,
    /// Cap for API search/list results
    pub search_limit: Option<usize>,
}

impl CatalogConfig {
    /// Resolution-pass options implied by this config
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            strict_relations: self.strict_relations.unwrap_or(false),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("archgraph.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CatalogConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CatalogConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CatalogConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_options() {
        let config = CatalogConfig {
            strict_relations: Some(true),
            search_limit: Some(50),
        };
        assert!(config.load_options().strict_relations);
        assert!(!CatalogConfig::default().load_options().strict_relations);
    }

    #[test]
    fn test_parse() {
        let config: CatalogConfig = toml::from_str("strict_relations = true\nsearch_limit = 10\n").unwrap();
        assert_eq!(config.strict_relations, Some(true));
        assert_eq!(config.search_limit, Some(10));

        let empty: CatalogConfig = toml::from_str("").unwrap();
        assert!(empty.strict_relations.is_none());
    }
}
