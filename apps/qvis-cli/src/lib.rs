//! Shared plumbing for the `qvis` binaries.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use qvis_core::config::Config;
use qvis_core::{DocumentId, QueryNode};

/// Installs a stderr subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_logging(config: &Config) {
    let fallback = config.settings().map(|s| s.log.filter).unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn read_query(path: &Path) -> anyhow::Result<QueryNode> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading query file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing query file {}", path.display()))
}

/// One document id per line; blank lines and `#` comments are skipped.
pub fn parse_relevant(raw: &str) -> HashSet<DocumentId> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn read_relevant(path: &Path) -> anyhow::Result<HashSet<DocumentId>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading relevant ids {}", path.display()))?;
    Ok(parse_relevant(&raw))
}
