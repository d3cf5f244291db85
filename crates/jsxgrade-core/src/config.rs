//! Grader configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::syntax::DEFAULT_MAX_DEPTH;

/// Name of the project-local config file.
pub const CONFIG_FILE_NAME: &str = "jsxgrade.toml";

/// Top-level jsxgrade configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Parser nesting limit; deeper input is a parse error.
    #[serde(default = "default_max_depth")]
    pub max_nesting_depth: usize,
    /// Feature context cache size. Zero disables the cache.
    #[serde(default)]
    pub cache_capacity: usize,
    /// Minimum match count for pattern cases that give none (or zero).
    #[serde(default = "default_min_count")]
    pub default_min_count: u32,
    /// Emit a debug event per graded case.
    #[serde(default = "default_true")]
    pub log_cases: bool,
    /// Directory holding suite files.
    #[serde(default = "default_suite_dir")]
    pub suite_dir: String,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_min_count() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_suite_dir() -> String {
    "suites".to_string()
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: default_max_depth(),
            cache_capacity: 0,
            default_min_count: default_min_count(),
            log_cases: true,
            suite_dir: default_suite_dir(),
        }
    }
}

impl GraderConfig {
    /// Parse a TOML document, resolving `${VAR}` references in string fields.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: GraderConfig = toml::from_str(content)?;
        config.suite_dir = resolve_env_vars(&config.suite_dir);
        Ok(config)
    }

    /// Apply `JSXGRADE_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("JSXGRADE_CACHE_CAPACITY") {
            self.cache_capacity = value
                .trim()
                .parse()
                .with_context(|| format!("invalid JSXGRADE_CACHE_CAPACITY: {value:?}"))?;
        }
        if let Some(value) = lookup("JSXGRADE_MAX_DEPTH") {
            self.max_nesting_depth = value
                .trim()
                .parse()
                .with_context(|| format!("invalid JSXGRADE_MAX_DEPTH: {value:?}"))?;
        }
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `jsxgrade.toml` in the current directory
/// 2. `~/.config/jsxgrade/config.toml`
///
/// Environment variable overrides: `JSXGRADE_CACHE_CAPACITY`, `JSXGRADE_MAX_DEPTH`.
pub fn load_config() -> Result<GraderConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GraderConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                global_config_path().filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            GraderConfig::from_toml_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GraderConfig::default(),
    };

    config.apply_env_overrides(|name| std::env::var(name).ok())?;
    Ok(config)
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("jsxgrade")
            .join("config.toml")
    })
}
