use crate::analyzers::feeders::FeederResolver;
use crate::analyzers::types::{FeederMap, RelativePerformanceEntry, ScoreTable};
use tracing::{debug, info};

/// Compares every high-school record with its feeder baseline.
///
/// Years are visited in ascending order and high schools by name; entries for
/// one (school, year) keep table order. A (school, year) with no record or no
/// baseline is skipped.
#[tracing::instrument(skip_all, fields(records = table.len(), high_schools = feeders.len()))]
pub fn relative_performance(
    table: &ScoreTable,
    feeders: &FeederMap,
) -> Vec<RelativePerformanceEntry> {
    let resolver = FeederResolver::new(table, feeders);
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for year in table.years() {
        for high_school in feeders.keys() {
            let mut records = table.records_for(high_school, year).peekable();
            if records.peek().is_none() {
                continue;
            }

            let Some(baseline) = resolver.resolve(high_school, year) else {
                debug!(high_school = %high_school, year, "No feeder baseline, skipping");
                skipped += 1;
                continue;
            };

            for record in records {
                entries.push(RelativePerformanceEntry {
                    year,
                    school: high_school.clone(),
                    relative_performance: record.objective / baseline.value,
                });
            }
        }
    }

    info!(entries = entries.len(), skipped, "Relative performance computed");
    entries
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
            grade_level: 9.0,
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
        map.insert("Patton".to_string(), BTreeSet::from(["Liberty".to_string()]));
        map.insert("Draughn".to_string(), BTreeSet::from(["Heritage".to_string()]));
        map
    }

    #[test]
    fn test_one_entry_per_high_school_record() {
        let table = ScoreTable::new(vec![
            rec("Liberty", 2017, 50.0),
            rec("Patton", 2019, 100.0),
            rec("Patton", 2019, 75.0),
        ]);
        let entries = relative_performance(&table, &feeders());

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].relative_performance, 2.0);
        assert_eq!(entries[1].relative_performance, 1.5);
        assert!(
            entries
                .iter()
                .all(|e| e.school == "Patton" && e.year == 2019)
        );
    }

    #[test]
    fn test_school_without_feeder_data_emits_nothing() {
        let table = ScoreTable::new(vec![
            rec("Draughn", 2018, 80.0),
            rec("Draughn", 2019, 90.0),
            rec("Liberty", 2017, 50.0),
            rec("Patton", 2019, 100.0),
        ]);
        let entries = relative_performance(&table, &feeders());
        assert!(entries.iter().all(|e| e.school != "Draughn"));
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_school_missing_from_feeder_map_emits_nothing() {
        let table = ScoreTable::new(vec![
            rec("Freedom", 2019, 100.0),
            rec("Table Rock", 2017, 50.0),
        ]);
        assert!(relative_performance(&table, &feeders()).is_empty());
    }

    #[test]
    fn test_doubling_feeder_scores_halves_ratio() {
        let base = ScoreTable::new(vec![
            rec("Liberty", 2017, 40.0),
            rec("Liberty", 2017, 60.0),
            rec("Patton", 2019, 120.0),
        ]);
        let doubled = ScoreTable::new(vec![
            rec("Liberty", 2017, 80.0),
            rec("Liberty", 2017, 120.0),
            rec("Patton", 2019, 120.0),
        ]);

        let a = relative_performance(&base, &feeders());
        let b = relative_performance(&doubled, &feeders());
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].relative_performance, a[0].relative_performance / 2.0);
    }

    #[test]
    fn test_entries_ordered_by_year_then_school() {
        let table = ScoreTable::new(vec![
            rec("Patton", 2020, 10.0),
            rec("Heritage", 2017, 10.0),
            rec("Liberty", 2017, 10.0),
            rec("Liberty", 2018, 10.0),
            rec("Draughn", 2019, 10.0),
            rec("Patton", 2019, 10.0),
        ]);
        let order: Vec<(i32, String)> = relative_performance(&table, &feeders())
            .into_iter()
            .map(|e| (e.year, e.school))
            .collect();
        assert_eq!(
            order,
            vec![
                (2019, "Draughn".to_string()),
                (2019, "Patton".to_string()),
                (2020, "Patton".to_string()),
            ]
        );
    }
}
