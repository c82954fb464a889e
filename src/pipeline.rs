//! The scoring pipeline: raw table → normalized rows → scored table →
//! feeder comparison.
//!
//! Every stage takes whole-table values and returns new ones, so running the
//! pipeline twice over the same input gives identical results.

use crate::analyzers::feeders::FeederResolver;
use crate::analyzers::objective::score_table;
use crate::analyzers::relative::relative_performance;
use crate::analyzers::types::{FeederBaseline, RawRecord, RelativePerformanceEntry, ScoreTable};
use crate::config::RaterConfig;
use crate::error::Result;
use crate::normalize::normalize_table;
use tracing::info;

/// A validated configuration ready to score tables.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RaterConfig,
}

impl Pipeline {
    /// Validates `config` up front so no row is touched with a bad setup.
    pub fn new(config: RaterConfig) -> Result<Self> {
        config.validate()?;
        info!(
            variant = %config.objective_variant,
            high_schools = config.feeder_map.len(),
            "Pipeline configured"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &RaterConfig {
        &self.config
    }

    /// Normalizes and scores `raw`.
    pub fn score(&self, raw: &[RawRecord]) -> Result<ScoreTable> {
        let rows = normalize_table(raw, &self.config)?;
        score_table(rows, self.config.objective_variant)
    }

    /// Feeder baseline for one (high school, year).
    pub fn baseline(
        &self,
        table: &ScoreTable,
        high_school: &str,
        year: i32,
    ) -> Option<FeederBaseline> {
        FeederResolver::new(table, &self.config.feeder_map).resolve(high_school, year)
    }

    /// Relative performance of every configured high school.
    pub fn relative_performance(&self, table: &ScoreTable) -> Vec<RelativePerformanceEntry> {
        relative_performance(table, &self.config.feeder_map)
    }
}
