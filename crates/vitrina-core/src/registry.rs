//! The canonical brand registry: brand name → ordered alias set.
//!
//! Loaded once at process start from `config/brands.yaml`. Entry order is
//! load-bearing: alias matching is substring containment and the first
//! matching entry wins, so precedence between overlapping aliases is the
//! file's insertion order.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandEntry {
    /// Canonical brand name, the single identity written to storage.
    pub name: String,
    /// Known variants: slugs, Cyrillic/Latin spellings, URL fragments.
    /// Stored lowercase; compared by substring containment.
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BrandsFile {
    brands: Vec<BrandEntry>,
}

#[derive(Debug, Clone)]
pub struct BrandRegistry {
    entries: Vec<BrandEntry>,
}

impl BrandRegistry {
    /// Load and validate the registry from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails
    /// validation (empty names, empty alias sets, duplicate brand names).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: BrandsFile = serde_yaml::from_str(&content)?;
        Self::from_entries(file.brands)
    }

    /// Build a registry from in-memory entries, preserving their order.
    ///
    /// Aliases are lowercased and trimmed on the way in.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for empty names, empty alias sets,
    /// or duplicate brand names.
    pub fn from_entries(entries: Vec<BrandEntry>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for entry in entries {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::Validation(
                    "brand name must be non-empty".to_string(),
                ));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate brand name: '{name}'"
                )));
            }

            let aliases: Vec<String> = entry
                .aliases
                .iter()
                .map(|a| a.trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect();
            if aliases.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "brand '{name}' has no aliases"
                )));
            }

            normalized.push(BrandEntry { name, aliases });
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// First brand whose alias appears as a substring of `lowercased_text`.
    ///
    /// The caller is responsible for lowercasing; this keeps the hot loop
    /// allocation-free.
    #[must_use]
    pub fn match_text(&self, lowercased_text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.aliases.iter().any(|a| lowercased_text.contains(a.as_str())))
            .map(|e| e.name.as_str())
    }

    /// Brand whose alias set contains `candidate` exactly (case-insensitive).
    ///
    /// Used by the second stage, where substring matching would compound
    /// false positives.
    #[must_use]
    pub fn exact_alias(&self, candidate: &str) -> Option<&str> {
        let low = candidate.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.aliases.iter().any(|a| *a == low))
            .map(|e| e.name.as_str())
    }

    /// True when `name` is itself a canonical registry key.
    #[must_use]
    pub fn is_canonical(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// All (canonical, alias) pairs whose alias is longer than `min_len`.
    ///
    /// Short aliases are excluded from deep full-text scans to avoid false
    /// positives on incidental substrings.
    pub fn aliases_longer_than(&self, min_len: usize) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(move |e| {
            e.aliases
                .iter()
                .filter(move |a| a.chars().count() > min_len)
                .map(|a| (e.name.as_str(), a.as_str()))
        })
    }

    /// Canonical names, in registry order.
    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
