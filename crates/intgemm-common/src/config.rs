//! Configuration types and utilities

use crate::constants::MAX_PAGES;
use crate::error::{IntGemmError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub kernel: ProviderConfig,
    pub buffer: BufferConfig,
}

/// Kernel provider selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub provider: ProviderPreference,
}

/// Which kernel provider the manager should pick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPreference {
    /// Best available provider for the running CPU.
    #[default]
    Auto,
    /// Scalar reference kernel.
    Fallback,
    /// AVX2 kernel; falls back when the CPU lacks AVX2.
    Avx2,
}

impl FromStr for ProviderPreference {
    type Err = IntGemmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "fallback" | "scalar" => Ok(Self::Fallback),
            "avx2" => Ok(Self::Avx2),
            other => Err(IntGemmError::Config(format!("unknown kernel provider: {other}"))),
        }
    }
}

impl fmt::Display for ProviderPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Fallback => "fallback",
            Self::Avx2 => "avx2",
        };
        f.write_str(name)
    }
}

/// Linear buffer sizing, in pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub initial_pages: u32,
    pub maximum_pages: Option<u32>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { initial_pages: 1, maximum_pages: Some(1) }
    }
}

impl KernelConfig {
    /// Load from a `.toml` or `.json` file and validate.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| IntGemmError::Config(format!("invalid TOML config: {e}")))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| IntGemmError::Config(format!("invalid JSON config: {e}")))?,
            other => {
                return Err(IntGemmError::Config(format!(
                    "unsupported config format: {}",
                    other.unwrap_or("<none>")
                )));
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the file (if any), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `INTGEMM_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = env::var("INTGEMM_PROVIDER") {
            self.kernel.provider = value.parse()?;
        }
        if let Ok(value) = env::var("INTGEMM_INITIAL_PAGES") {
            self.buffer.initial_pages = parse_pages("INTGEMM_INITIAL_PAGES", &value)?;
        }
        if let Ok(value) = env::var("INTGEMM_MAXIMUM_PAGES") {
            self.buffer.maximum_pages = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_pages("INTGEMM_MAXIMUM_PAGES", &value)?)
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let buffer = &self.buffer;
        if buffer.initial_pages > MAX_PAGES {
            return Err(IntGemmError::Config(format!(
                "initial_pages {} exceeds {MAX_PAGES}",
                buffer.initial_pages
            )));
        }
        if let Some(maximum) = buffer.maximum_pages {
            if maximum > MAX_PAGES {
                return Err(IntGemmError::Config(format!(
                    "maximum_pages {maximum} exceeds {MAX_PAGES}"
                )));
            }
            if buffer.initial_pages > maximum {
                return Err(IntGemmError::Config(format!(
                    "initial_pages {} exceeds maximum_pages {maximum}",
                    buffer.initial_pages
                )));
            }
        }
        Ok(())
    }

    /// Take every field of `other` that differs from the default.
    pub fn merge_with(&mut self, other: Self) {
        let defaults = Self::default();
        if other.kernel.provider != defaults.kernel.provider {
            self.kernel.provider = other.kernel.provider;
        }
        if other.buffer.initial_pages != defaults.buffer.initial_pages {
            self.buffer.initial_pages = other.buffer.initial_pages;
        }
        if other.buffer.maximum_pages != defaults.buffer.maximum_pages {
            self.buffer.maximum_pages = other.buffer.maximum_pages;
        }
    }
}

fn parse_pages(var: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| IntGemmError::Config(format!("invalid {var} value {value:?}: {e}")))
}
