// ⚙️ Configuration - environment variables only

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

pub const DEFAULT_DATABASE: &str = "plates.db";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// CATALOG_DATABASE
    pub database_path: PathBuf,
    /// CATALOG_BIND
    pub bind_addr: String,
    /// PATH_BASE, e.g. "/catalog"
    pub path_base: Option<String>,
    /// CATALOG_SEED
    pub seed_defaults: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            database_path: PathBuf::from(DEFAULT_DATABASE),
            bind_addr: DEFAULT_BIND.to_string(),
            path_base: None,
            seed_defaults: true,
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CatalogConfig::default();

        if let Some(path) = non_empty(lookup("CATALOG_DATABASE")) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(bind) = non_empty(lookup("CATALOG_BIND")) {
            config.bind_addr = bind;
        }

        if let Some(base) = non_empty(lookup("PATH_BASE")) {
            config.path_base = Some(normalize_path_base(&base)?);
        }

        if let Some(seed) = non_empty(lookup("CATALOG_SEED")) {
            config.seed_defaults = parse_bool(&seed).context("invalid CATALOG_SEED")?;
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn normalize_path_base(base: &str) -> Result<String> {
    if !base.starts_with('/') {
        bail!("PATH_BASE must start with '/', got {:?}", base);
    }

    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("PATH_BASE cannot be the root path");
    }

    Ok(trimmed.to_string())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("expected true/false, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("CATALOG_DATABASE", "/tmp/catalog.db"),
            ("CATALOG_BIND", "127.0.0.1:8080"),
            ("PATH_BASE", "/catalog/"),
            ("CATALOG_SEED", "false"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.path_base.as_deref(), Some("/catalog"));
        assert!(!config.seed_defaults);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = CatalogConfig::from_lookup(lookup(&[("CATALOG_BIND", "  ")])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND);
    }

    #[test]
    fn test_invalid_values() {
        assert!(CatalogConfig::from_lookup(lookup(&[("PATH_BASE", "catalog")])).is_err());
        assert!(CatalogConfig::from_lookup(lookup(&[("PATH_BASE", "/")])).is_err());
        assert!(CatalogConfig::from_lookup(lookup(&[("CATALOG_SEED", "maybe")])).is_err());
    }
}
