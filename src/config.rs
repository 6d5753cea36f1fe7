//! Generator configuration: table parameters, betting rules and sizing tables.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};
use crate::sizing::SizingKey;

static DEFAULT_CONFIG_JSON: &str = include_str!("../data/generator_config.json");

static DEFAULT_CONFIG: Lazy<GeneratorConfig> = Lazy::new(|| {
    serde_json::from_str(DEFAULT_CONFIG_JSON).expect("Failed to parse built-in generator config")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub stack: f64,
    pub sb: f64,
    pub bb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Fraction of the stack already invested above which raising is disabled.
    pub commit_threshold: f64,
    pub min_raise_multiplier: f64,
}

/// The persisted `{config, rules, sizing}` record.
///
/// Sizing entries are optional; anything missing is covered by the
/// resolver's built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub config: TableConfig,
    pub rules: Rules,
    #[serde(default)]
    pub sizing: BTreeMap<String, Vec<f64>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

impl GeneratorConfig {
    pub fn stack(&self) -> f64 {
        self.config.stack
    }

    pub fn sb(&self) -> f64 {
        self.config.sb
    }

    pub fn bb(&self) -> f64 {
        self.config.bb
    }

    pub fn commit_threshold(&self) -> f64 {
        self.rules.commit_threshold
    }

    pub fn min_raise_multiplier(&self) -> f64 {
        self.rules.min_raise_multiplier
    }

    /// Configured sizes for a table, if present.
    pub fn sizing(&self, key: SizingKey) -> Option<&[f64]> {
        self.sizing.get(key.as_str()).map(|v| v.as_slice())
    }

    /// Replace (or add) one sizing table.
    pub fn with_sizing(mut self, key: SizingKey, sizes: Vec<f64>) -> Self {
        self.sizing.insert(key.as_str().to_string(), sizes);
        self
    }

    /// Drop every sizing table so that only built-in defaults apply.
    pub fn without_sizing(mut self) -> Self {
        self.sizing.clear();
        self
    }

    pub fn from_json_str(json: &str) -> TreeResult<Self> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> TreeResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TreeError::io(path, e))?;
        let config = Self::from_json_str(&json)?;
        log::info!("{:<32}{}", "loaded generator config", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> TreeResult<()> {
        let t = &self.config;
        if !(t.stack > 0.0 && t.stack.is_finite()) {
            return Err(TreeError::InvalidConfig(format!("stack must be positive, got {}", t.stack)));
        }
        if !(t.sb > 0.0 && t.bb > 0.0) {
            return Err(TreeError::InvalidConfig("blinds must be positive".to_string()));
        }
        if t.sb > t.bb {
            return Err(TreeError::InvalidConfig(format!(
                "small blind {} exceeds big blind {}",
                t.sb, t.bb
            )));
        }
        let threshold = self.rules.commit_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(TreeError::InvalidConfig(format!(
                "commit_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        if !(self.rules.min_raise_multiplier >= 1.0) {
            return Err(TreeError::InvalidConfig(format!(
                "min_raise_multiplier must be at least 1, got {}",
                self.rules.min_raise_multiplier
            )));
        }
        for (name, sizes) in &self.sizing {
            if SizingKey::from_str(name).is_none() {
                log::warn!("ignoring unknown sizing table '{}'", name);
            }
            if let Some(bad) = sizes.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
                return Err(TreeError::InvalidConfig(format!(
                    "sizing '{}' contains non-positive size {}",
                    name, bad
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.stack(), 50.0);
        assert_eq!(config.sb(), 0.5);
        assert_eq!(config.bb(), 1.0);
        assert_eq!(config.commit_threshold(), 0.30);
        assert_eq!(config.min_raise_multiplier(), 2.0);
        assert_eq!(config.sizing(SizingKey::Rfi), Some(&[2.3][..]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sizing_section_is_optional() {
        let json = r#"{
            "config": {"stack": 100, "sb": 0.5, "bb": 1},
            "rules": {"commit_threshold": 0.3, "min_raise_multiplier": 2}
        }"#;
        let config = GeneratorConfig::from_json_str(json).unwrap();
        assert_eq!(config.stack(), 100.0);
        assert!(config.sizing.is_empty());
        assert_eq!(config.sizing(SizingKey::FourBet), None);
    }

    #[test]
    fn missing_rules_is_a_load_error() {
        let json = r#"{"config": {"stack": 100, "sb": 0.5, "bb": 1}}"#;
        assert!(matches!(
            GeneratorConfig::from_json_str(json),
            Err(TreeError::JsonError(_))
        ));
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = GeneratorConfig::default();
        config.config.stack = 0.0;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.config.sb = 2.0;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.rules.commit_threshold = 1.5;
        assert!(config.validate().is_err());

        let config = GeneratorConfig::default().with_sizing(SizingKey::Rfi, vec![2.3, -1.0]);
        assert!(matches!(config.validate(), Err(TreeError::InvalidConfig(_))));
    }

    #[test]
    fn unknown_tables_are_tolerated() {
        let mut config = GeneratorConfig::default();
        config.sizing.insert("6bet".to_string(), vec![40.0]);
        assert!(config.validate().is_ok());
    }
}
