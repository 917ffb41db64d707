use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMatching {
    Sensitive,
    Insensitive,
    /// Case-insensitive unless the needle contains uppercase.
    #[default]
    Smart,
}

/// Search settings, persisted as search.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub case_matching: CaseMatching,
    pub unicode_normalization: bool,
    /// Worker thread count. `None` or 0 uses the detected CPU count.
    pub threads: Option<usize>,
    /// Restrict a search to the previous matches when the needle extends the
    /// previous needle. Only valid for scorers where a haystack that fails a
    /// needle also fails every extension of it.
    pub narrowing: bool,
    /// Lines whose trimmed length is below this many chars are not chunked.
    pub min_chunk_chars: usize,
    /// Lines shown on each side of a matched line in previews.
    pub preview_radius: usize,
    pub snippet: SnippetConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_matching: CaseMatching::default(),
            unicode_normalization: true,
            threads: None,
            narrowing: true,
            min_chunk_chars: 3,
            preview_radius: 4,
            snippet: SnippetConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetConfig {
    /// Bytes of haystack shown around the first match.
    pub context_chars: usize,
    /// Total width including ellipsis markers.
    pub max_width: usize,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            context_chars: 40,
            max_width: 80,
        }
    }
}

impl SearchConfig {
    /// Returns the config file path within the given data directory.
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join("search.toml")
    }

    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates config values and returns list of validation errors.
    /// Returns empty vec if config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.snippet.context_chars == 0 {
            errors.push("snippet.context_chars must be at least 1".to_string());
        }

        if self.snippet.max_width < MIN_SNIPPET_WIDTH {
            errors.push(format!(
                "snippet.max_width must be at least {MIN_SNIPPET_WIDTH}"
            ));
        }

        errors
    }

    /// Returns a validated config, replacing invalid values with defaults.
    pub fn with_defaults_for_invalid(&self) -> Self {
        let defaults = SnippetConfig::default();
        Self {
            snippet: SnippetConfig {
                context_chars: if self.snippet.context_chars == 0 {
                    defaults.context_chars
                } else {
                    self.snippet.context_chars
                },
                max_width: if self.snippet.max_width < MIN_SNIPPET_WIDTH {
                    defaults.max_width
                } else {
                    self.snippet.max_width
                },
            },
            ..self.clone()
        }
    }

    /// Worker thread count: the configured override, else the detected CPU count.
    pub fn thread_count(&self) -> usize {
        match self.threads {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

/// Room for both ellipsis markers and one byte of text.
const MIN_SNIPPET_WIDTH: usize = 7;
