use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::extract::DEFAULT_MIN_SENTENCE_LENGTH;
use crate::ingest::IngestOptions;
use crate::query::SearchOptions;
use crate::query::embedding::DEFAULT_MODEL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocseekConfig {
    pub database: Option<String>,
    pub model: Option<String>,
    pub path: Option<String>,
    pub min_sentence_length: Option<usize>,
    pub search: SearchOptions,
    pub ingest: IngestOptions,
}

impl DocseekConfig {
    /// Config written by `docseek init`, with every default spelled out
    pub fn with_defaults() -> Self {
        Self {
            database: Some(default_database_path().display().to_string()),
            model: Some(DEFAULT_MODEL.to_string()),
            path: None,
            min_sentence_length: Some(DEFAULT_MIN_SENTENCE_LENGTH),
            search: SearchOptions::default(),
            ingest: IngestOptions::default(),
        }
    }

    /// Database path: CLI flag, then config file, then built-in default
    pub fn database_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_database_path)
    }

    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn min_sentence_length(&self) -> usize {
        self.min_sentence_length.unwrap_or(DEFAULT_MIN_SENTENCE_LENGTH)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("docseek.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("data").join("db").join("document_embeddings.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<DocseekConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: DocseekConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &DocseekConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("docseek.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docseek.toml");

        let config = DocseekConfig::with_defaults();
        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docseek.toml");
        std::fs::write(&path, "model = \"bge-small-en-v1.5\"\n\n[search]\nlimit = 10\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.model_name(), "bge-small-en-v1.5");
        assert_eq!(loaded.search.limit, 10);
        assert_eq!(loaded.search.distance_threshold, 0.7);
        assert_eq!(loaded.ingest.batch_size, 32);
        assert_eq!(loaded.min_sentence_length(), 10);
    }

    #[test]
    fn test_database_path_precedence() {
        let config = DocseekConfig {
            database: Some("from_file.db".to_string()),
            ..Default::default()
        };
        assert_eq!(config.database_path(Some(PathBuf::from("cli.db"))), PathBuf::from("cli.db"));
        assert_eq!(config.database_path(None), PathBuf::from("from_file.db"));
        assert_eq!(DocseekConfig::default().database_path(None), default_database_path());
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("data").join("db").join("x.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
