//! Data types used by the scoring pipeline.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// High-school name → names of its feeder middle schools.
///
/// Sorted containers keep every iteration over the map deterministic.
pub type FeederMap = BTreeMap<String, BTreeSet<String>>;

/// A single row read from the adjudication table, every cell still text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "School")]
    pub school: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Grade Level")]
    pub grade_level: String,
    #[serde(rename = "J1")]
    pub j1: String,
    #[serde(rename = "J2")]
    pub j2: String,
    #[serde(rename = "J3")]
    pub j3: String,
    #[serde(rename = "SR")]
    pub sr: String,
}

/// A row after sentinel substitution and numeric coercion.
///
/// `j1`..`sr` may be NaN when the source cell was not numeric;
/// `grade_level` is always finite.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub school: String,
    pub year: i32,
    pub grade_level: f64,
    pub j1: f64,
    pub j2: f64,
    pub j3: f64,
    pub sr: f64,
}

/// A scored row, as written to the enriched output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "School")]
    pub school: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Grade Level")]
    pub grade_level: f64,
    #[serde(rename = "J1")]
    pub j1: f64,
    #[serde(rename = "J2")]
    pub j2: f64,
    #[serde(rename = "J3")]
    pub j3: f64,
    #[serde(rename = "SR")]
    pub sr: f64,
    #[serde(rename = "Objective")]
    pub objective: f64,
    #[serde(rename = "Normalized Objective")]
    pub normalized_objective: Option<f64>,
}

impl Record {
    pub(crate) fn from_normalized(
        row: NormalizedRecord,
        objective: f64,
        normalized_objective: Option<f64>,
    ) -> Self {
        Record {
            school: row.school,
            year: row.year,
            grade_level: row.grade_level,
            j1: row.j1,
            j2: row.j2,
            j3: row.j3,
            sr: row.sr,
            objective,
            normalized_objective,
        }
    }
}

/// The full scored table for one pipeline run. Never mutated after scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    records: Vec<Record>,
}

impl ScoreTable {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present in the table, ascending.
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    /// Distinct school names present in the table, sorted.
    pub fn schools(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.school.as_str()).collect()
    }

    /// Records for `school` in `year`, in table order.
    pub fn records_for<'a>(
        &'a self,
        school: &'a str,
        year: i32,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.records
            .iter()
            .filter(move |r| r.year == year && r.school == school)
    }
}

/// Where a feeder baseline came from and what it averaged to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeederBaseline {
    pub year: i32,
    pub value: f64,
    pub sample_count: usize,
}

/// One high-school record compared against its feeder baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativePerformanceEntry {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "School")]
    pub school: String,
    #[serde(rename = "Relative Performance")]
    pub relative_performance: f64,
}
