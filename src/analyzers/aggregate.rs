use crate::analyzers::types::{Record, ScoreTable};
use crate::analyzers::utility::{max, mean, min};
use crate::error::RaterError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Reduction applied to each group of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Max,
    Mean,
    Min,
}

impl Statistic {
    /// Reduces `values`, ignoring NaN. An empty or all-NaN group gives NaN.
    pub fn reduce(self, values: &[f64]) -> f64 {
        match self {
            Statistic::Max => max(values).unwrap_or(f64::NAN),
            Statistic::Mean => mean(values),
            Statistic::Min => min(values).unwrap_or(f64::NAN),
        }
    }

    /// Short label used in series names.
    pub fn label(self) -> &'static str {
        match self {
            Statistic::Max => "Max",
            Statistic::Mean => "Avg",
            Statistic::Min => "Min",
        }
    }
}

impl FromStr for Statistic {
    type Err = RaterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(Statistic::Max),
            "mean" | "avg" => Ok(Statistic::Mean),
            "min" => Ok(Statistic::Min),
            _ => Err(RaterError::Configuration(format!(
                "unknown statistic '{s}' (expected max, mean or min)"
            ))),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which score column a grouping reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreField {
    #[default]
    Objective,
    NormalizedObjective,
}

impl ScoreField {
    pub fn value(self, record: &Record) -> Option<f64> {
        match self {
            ScoreField::Objective => Some(record.objective),
            ScoreField::NormalizedObjective => record.normalized_objective,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreField::Objective => "Objective",
            ScoreField::NormalizedObjective => "Normalized Objective",
        }
    }
}

impl FromStr for ScoreField {
    type Err = RaterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "objective" => Ok(ScoreField::Objective),
            "normalized" | "normalized-objective" => Ok(ScoreField::NormalizedObjective),
            _ => Err(RaterError::Configuration(format!(
                "unknown score field '{s}' (expected objective or normalized)"
            ))),
        }
    }
}

/// One (Year, School) group reduced to a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedStat {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "School")]
    pub school: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// Groups `records` by `key` and reduces `field` in each group with `stat`.
///
/// Missing values (NaN, or an absent normalized objective) do not count.
pub fn group_reduce<'a, K, I, F>(
    records: I,
    key: F,
    field: ScoreField,
    stat: Statistic,
) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&Record) -> K,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry(key(record))
            .or_default()
            .push(field.value(record).unwrap_or(f64::NAN));
    }

    groups
        .into_iter()
        .map(|(k, values)| (k, stat.reduce(&values)))
        .collect()
}

/// `group by (Year, School)` over the whole table, ordered by year then school.
pub fn by_year_school(table: &ScoreTable, field: ScoreField, stat: Statistic) -> Vec<GroupedStat> {
    group_reduce(table.records(), |r| (r.year, r.school.clone()), field, stat)
        .into_iter()
        .map(|((year, school), value)| GroupedStat {
            year,
            school,
            value,
        })
        .collect()
}
