//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`APP_CACHE__DIR` sets `cache.dir`). Provides helpers to
//! expand `~` and `${VAR}` and to resolve relative paths against a known base
//! directory.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheSettings {
    pub dir: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { dir: "file_cache".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexSettings {
    pub dir: String,
    pub data_dir: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { dir: "data/index".to_string(), data_dir: "data/txt".to_string() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EvalSettings {
    /// Evaluate sibling sub-trees on the rayon pool.
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogSettings {
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub cache: CacheSettings,
    pub index: IndexSettings,
    pub eval: EvalSettings,
    pub log: LogSettings,
}

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Loads configuration files from `base_dir` for the named environment.
    pub fn load_from(base_dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base_dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: base_dir.to_path_buf() };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> Result<Settings, Error> {
        self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn cache_dir(&self) -> Result<PathBuf, Error> {
        Ok(resolve_with_base(&self.base_dir, self.settings()?.cache.dir))
    }

    pub fn index_dir(&self) -> Result<PathBuf, Error> {
        Ok(resolve_with_base(&self.base_dir, self.settings()?.index.dir))
    }

    pub fn data_dir(&self) -> Result<PathBuf, Error> {
        Ok(resolve_with_base(&self.base_dir, self.settings()?.index.data_dir))
    }

    fn validate_for_env(&self, env: &str) -> Result<(), Error> {
        let settings = self.settings()?;
        if settings.cache.dir.trim().is_empty() {
            return Err(Error::InvalidConfig("cache.dir must not be empty".into()));
        }
        if settings.index.dir.trim().is_empty() {
            return Err(Error::InvalidConfig("index.dir must not be empty".into()));
        }
        match env {
            "prod" | "production" => {
                if settings.log.filter.trim().is_empty() {
                    return Err(Error::InvalidConfig("log.filter must be set in production".into()));
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
