//! Pipeline configuration: sentinels, replacements, formula and feeder map.

use crate::analyzers::objective::ObjectiveVariant;
use crate::analyzers::types::FeederMap;
use crate::error::{RaterError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Feeder relationships used when no configuration file provides one.
static DEFAULT_FEEDERS: &[(&str, &[&str])] = &[
    ("Draughn", &["Heritage"]),
    ("East Burke High", &["East Burke Middle"]),
    ("Freedom", &["Table Rock", "Walter Johnson"]),
    ("Patton", &["Liberty"]),
];

/// Everything a pipeline run needs besides the input table.
///
/// Stored as a JSON object on disk; every key is optional:
/// ```json
/// {
///   "na_sentinel": "N/A",
///   "additional_na_sentinels": ["-1"],
///   "na_replacement": 2.2,
///   "fill_empty_sr": true,
///   "carried_over_sentinel": "C/O",
///   "carried_over_replacement": 2.3,
///   "objective_variant": "B",
///   "feeder_map": { "Patton": ["Liberty"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RaterConfig {
    pub na_sentinel: String,
    pub additional_na_sentinels: Vec<String>,
    pub na_replacement: f64,
    pub fill_empty_sr: bool,
    pub carried_over_sentinel: String,
    pub carried_over_replacement: f64,
    pub objective_variant: ObjectiveVariant,
    pub feeder_map: FeederMap,
}

impl Default for RaterConfig {
    fn default() -> Self {
        let feeder_map = DEFAULT_FEEDERS
            .iter()
            .map(|(hs, feeders)| {
                let set: BTreeSet<String> = feeders.iter().map(|f| f.to_string()).collect();
                (hs.to_string(), set)
            })
            .collect();

        Self {
            na_sentinel: "N/A".to_string(),
            additional_na_sentinels: Vec::new(),
            na_replacement: 2.0,
            fill_empty_sr: false,
            carried_over_sentinel: "C/O".to_string(),
            carried_over_replacement: 2.0,
            objective_variant: ObjectiveVariant::Linear,
            feeder_map,
        }
    }
}

impl RaterConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| RaterError::Configuration(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RaterError::Configuration(format!("reading '{path}': {e}")))?;
        Self::from_json(&content)
    }

    /// Rejects settings that would make every row ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.na_sentinel.trim().is_empty() {
            return Err(RaterError::Configuration(
                "na_sentinel must not be empty".to_string(),
            ));
        }
        if self.carried_over_sentinel.trim().is_empty() {
            return Err(RaterError::Configuration(
                "carried_over_sentinel must not be empty".to_string(),
            ));
        }
        if !self.na_replacement.is_finite() || !self.carried_over_replacement.is_finite() {
            return Err(RaterError::Configuration(
                "sentinel replacements must be finite numbers".to_string(),
            ));
        }
        if let Some((hs, _)) = self.feeder_map.iter().find(|(_, f)| f.is_empty()) {
            return Err(RaterError::Configuration(format!(
                "high school '{hs}' has no feeder schools"
            )));
        }
        Ok(())
    }

    /// True when `cell` is one of the SR "not applicable" markers.
    pub fn is_na_sentinel(&self, cell: &str) -> bool {
        cell == self.na_sentinel || self.additional_na_sentinels.iter().any(|s| s == cell)
    }
}
