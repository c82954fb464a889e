//! Feeder baseline lookup with the multi-year fallback search.

use crate::analyzers::types::{FeederBaseline, FeederMap, ScoreTable};
use crate::analyzers::utility::mean;
use tracing::debug;

/// Year offsets tried, in order: two years back, then three, then one.
///
/// Not chronological: the two-years-prior cohort is the one expected to have
/// moved up into the high school.
pub const FALLBACK_OFFSETS: [i32; 3] = [2, 3, 1];

/// Resolves feeder baselines against one finished [`ScoreTable`].
pub struct FeederResolver<'a> {
    table: &'a ScoreTable,
    feeders: &'a FeederMap,
}

impl<'a> FeederResolver<'a> {
    pub fn new(table: &'a ScoreTable, feeders: &'a FeederMap) -> Self {
        Self { table, feeders }
    }

    /// Mean feeder objective for `high_school` around `year`, or `None`.
    ///
    /// The first candidate year with any feeder record wins; its objectives are
    /// pooled across all feeder schools. NaN objectives are left out of the
    /// mean, and a winning year with nothing but NaN yields `None`.
    pub fn resolve(&self, high_school: &str, year: i32) -> Option<FeederBaseline> {
        let Some(feeder_schools) = self.feeders.get(high_school) else {
            debug!(high_school, "No feeder schools configured");
            return None;
        };

        for offset in FALLBACK_OFFSETS {
            let Some(candidate) = year.checked_sub(offset) else {
                continue;
            };
            let objectives: Vec<f64> = self
                .table
                .records()
                .iter()
                .filter(|r| r.year == candidate && feeder_schools.contains(&r.school))
                .map(|r| r.objective)
                .collect();

            if objectives.is_empty() {
                continue;
            }

            let value = mean(&objectives);
            if value.is_nan() {
                debug!(high_school, year, candidate, "Feeder year has no numeric objective");
                return None;
            }

            debug!(high_school, year, candidate, value, "Feeder baseline resolved");
            return Some(FeederBaseline {
                year: candidate,
                value,
                sample_count: objectives.iter().filter(|v| !v.is_nan()).count(),
            });
        }

        debug!(high_school, year, "No feeder data in any candidate year");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::Record;
    use std::collections::BTreeSet;

    fn rec(school: &str, year: i32, objective: f64) -> Record {
        Record {
            school: school.to_string(),
            year,
            grade_level: 8.0,
            j1: 1.0,
            j2: 1.0,
            j3: 1.0,
            sr: 1.0,
            objective,
            normalized_objective: None,
        }
    }

    fn feeders() -> FeederMap {
        let mut map = FeederMap::new();
        map.insert(
            "Freedom".to_string(),
            BTreeSet::from(["Table Rock".to_string(), "Walter Johnson".to_string()]),
        );
        map
    }

    fn resolve(table: &ScoreTable, high_school: &str, year: i32) -> Option<FeederBaseline> {
        FeederResolver::new(table, &feeders()).resolve(high_school, year)
    }

    #[test]
    fn test_prefers_two_years_prior() {
        let table = ScoreTable::new(vec![
            rec("Table Rock", 2017, 10.0),
            rec("Table Rock", 2016, 20.0),
            rec("Walter Johnson", 2018, 30.0),
        ]);
        let baseline = resolve(&table, "Freedom", 2019).unwrap();
        assert_eq!(baseline.year, 2017);
        assert_eq!(baseline.value, 10.0);
    }

    #[test]
    fn test_falls_back_to_three_years_before_one() {
        let table = ScoreTable::new(vec![
            rec("Table Rock", 2016, 40.0),
            rec("Walter Johnson", 2016, 60.0),
            rec("Walter Johnson", 2018, 99.0),
        ]);
        let baseline = resolve(&table, "Freedom", 2019).unwrap();
        assert_eq!(baseline.year, 2016);
        assert_eq!(baseline.value, 50.0);
        assert_eq!(baseline.sample_count, 2);
    }

    #[test]
    fn test_uses_one_year_prior_last() {
        let table = ScoreTable::new(vec![rec("Walter Johnson", 2018, 12.0)]);
        let baseline = resolve(&table, "Freedom", 2019).unwrap();
        assert_eq!(baseline.year, 2018);
        assert_eq!(baseline.value, 12.0);
    }

    #[test]
    fn test_ignores_same_year_and_non_feeders() {
        let table = ScoreTable::new(vec![
            rec("Table Rock", 2019, 10.0),
            rec("Liberty", 2017, 10.0),
        ]);
        assert!(resolve(&table, "Freedom", 2019).is_none());
    }

    #[test]
    fn test_unknown_high_school_not_found() {
        let table = ScoreTable::new(vec![rec("Table Rock", 2017, 10.0)]);
        assert!(resolve(&table, "Patton", 2019).is_none());
    }

    #[test]
    fn test_all_nan_year_is_not_found() {
        let table = ScoreTable::new(vec![
            rec("Table Rock", 2017, f64::NAN),
            rec("Table Rock", 2016, 5.0),
        ]);
        assert!(resolve(&table, "Freedom", 2019).is_none());
    }

    #[test]
    fn test_nan_records_skipped_in_mean() {
        let table = ScoreTable::new(vec![
            rec("Table Rock", 2017, f64::NAN),
            rec("Walter Johnson", 2017, 8.0),
        ]);
        let baseline = resolve(&table, "Freedom", 2019).unwrap();
        assert_eq!(baseline.value, 8.0);
        assert_eq!(baseline.sample_count, 1);
    }

    #[test]
    fn test_earliest_representable_year_skips_underflowing_candidates() {
        let table = ScoreTable::new(vec![
            rec("Freedom", i32::MIN, 90.0),
            rec("Table Rock", 2017, 10.0),
        ]);
        assert!(resolve(&table, "Freedom", i32::MIN).is_none());
        assert!(resolve(&table, "Freedom", i32::MIN + 1).is_none());
    }
}
