//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nesting levels, e.g.
//! `APP_RANKING__MAX_RESULTS=5`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::category::{default_categories, Category, CategorySet};
use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Wrap an already assembled figment (used by tests and embedders).
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Extract and validate the typed settings tree.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub index: IndexSettings,
    pub embedding: EmbeddingSettings,
    pub analyzer: AnalyzerSettings,
    pub ranking: RankingSettings,
    /// Ordered; the order is the balancer's category iteration order.
    pub categories: Vec<Category>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index: IndexSettings::default(),
            embedding: EmbeddingSettings::default(),
            analyzer: AnalyzerSettings::default(),
            ranking: RankingSettings::default(),
            categories: default_categories(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        self.category_set()?;
        let r = &self.ranking;
        for (name, w) in [("semantic_weight", r.semantic_weight), ("lexical_weight", r.lexical_weight)] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!("ranking.{name} must be a finite non-negative number, got {w}")));
            }
        }
        if r.max_results == 0 {
            return Err(Error::InvalidConfig("ranking.max_results must be at least 1".to_string()));
        }
        if r.candidate_pool == 0 {
            return Err(Error::InvalidConfig("ranking.candidate_pool must be at least 1".to_string()));
        }
        if self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.max_len must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn category_set(&self) -> Result<CategorySet, Error> {
        CategorySet::new(self.categories.clone())
    }

    /// Anchor relative local paths (index database, model directory) at
    /// `base`, normally the directory of the config file they were read from.
    /// Remote index URIs such as `s3://...` are left alone.
    pub fn resolve_paths(&mut self, base: &Path) {
        if !self.index.uri.contains("://") {
            self.index.uri = resolve_with_base(base, &self.index.uri).to_string_lossy().into_owned();
        }
        if let Some(dir) = &self.embedding.model_dir {
            self.embedding.model_dir = Some(resolve_with_base(base, dir).to_string_lossy().into_owned());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// LanceDB database URI (a directory for local databases).
    pub uri: String,
    pub table: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { uri: "data/indexes/lancedb".to_string(), table: "catalog".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: Option<String>,
    pub model_id: String,
    pub max_len: usize,
    /// Use the deterministic hashing encoder instead of loading a model.
    pub fake: bool,
    pub fake_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_dir: None,
            model_id: "all-MiniLM-L6-v2".to_string(),
            max_len: 256,
            fake: false,
            fake_dim: 384,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Knobs of the rerank and balancing stages.
///
/// The 0.7/0.3 split between semantic and lexical evidence is a tuning
/// choice and lives here rather than in the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// How many nearest neighbours to pull from the index per query.
    pub candidate_pool: usize,
    /// Advisory only; short result lists are not padded.
    pub min_results: usize,
    pub max_results: usize,
    pub semantic_weight: f32,
    pub lexical_weight: f32,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self { candidate_pool: 20, min_results: 5, max_results: 10, semantic_weight: 0.7, lexical_weight: 0.3 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
