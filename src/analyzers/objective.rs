//! Composite objective formulas and the whole-table rescale.

use crate::analyzers::types::{NormalizedRecord, Record, ScoreTable};
use crate::analyzers::utility::{max, min};
use crate::error::{RaterError, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

const LINEAR_BASE: f64 = 10.0;
const LINEAR_GRADE_EXPONENT: f64 = 1.5;
const LINEAR_JUDGE_BUDGET: f64 = 15.0;

const POWER_JUDGE_BUDGET: f64 = 50.0;

const SCALED_BASE: f64 = 750.0;
const SCALED_GRADE_EXPONENT: f64 = 2.75;
const SCALED_DIVISOR: f64 = 73.0;

/// Which composite formula produces `Objective`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ObjectiveVariant {
    /// A: `10 + GL^1.5 * (15 - J1 - J2 - J3) - SR^2`.
    #[default]
    Linear,
    /// B: `GL^(GL/2) * (50 - J1^J1 - J2^J2 - J3^J3 - SR^SR)`, then rescaled
    /// over the whole table.
    PowerRescaled,
    /// C: `(750 + GL^2.75 * (50 - J1^J1 - J2^J2 - J3^J3) - SR^SR) / 73`.
    ScaledPower,
}

impl FromStr for ObjectiveVariant {
    type Err = RaterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "linear" => Ok(ObjectiveVariant::Linear),
            "b" | "power" | "power-rescaled" => Ok(ObjectiveVariant::PowerRescaled),
            "c" | "scaled" | "scaled-power" => Ok(ObjectiveVariant::ScaledPower),
            _ => Err(RaterError::Configuration(format!(
                "unknown objective variant '{s}' (expected A, B or C)"
            ))),
        }
    }
}

impl TryFrom<String> for ObjectiveVariant {
    type Error = RaterError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for ObjectiveVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveVariant::Linear => write!(f, "A"),
            ObjectiveVariant::PowerRescaled => write!(f, "B"),
            ObjectiveVariant::ScaledPower => write!(f, "C"),
        }
    }
}

/// `x^x` under IEEE `powf`: `0^0 = 1`, negative non-integer bases give NaN.
fn self_power(x: f64) -> f64 {
    x.powf(x)
}

/// Variant A for one record.
pub fn linear_objective(r: &NormalizedRecord) -> f64 {
    LINEAR_BASE
        + r.grade_level.powf(LINEAR_GRADE_EXPONENT) * (LINEAR_JUDGE_BUDGET - r.j1 - r.j2 - r.j3)
        - r.sr.powi(2)
}

/// Variant B before rescaling.
pub fn power_raw_objective(r: &NormalizedRecord) -> f64 {
    let budget = POWER_JUDGE_BUDGET - self_power(r.j1) - self_power(r.j2) - self_power(r.j3);
    r.grade_level.powf(r.grade_level / 2.0) * (budget - self_power(r.sr))
}

/// Variant C for one record.
pub fn scaled_power_objective(r: &NormalizedRecord) -> f64 {
    (SCALED_BASE
        + r.grade_level.powf(SCALED_GRADE_EXPONENT)
            * (POWER_JUDGE_BUDGET - self_power(r.j1) - self_power(r.j2) - self_power(r.j3))
        - self_power(r.sr))
        / SCALED_DIVISOR
}

/// A rescaled Variant B value: the square-root shifted score and the published
/// score in `[50, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescaled {
    pub shifted: f64,
    pub published: f64,
}

/// Rescales raw Variant B values against the extrema of the whole batch.
///
/// NaN inputs stay NaN. A batch with no usable value, or whose shifted
/// values span no range, is a computation error.
pub fn rescale(raw: &[f64]) -> Result<Vec<Rescaled>> {
    let raw_min = min(raw).ok_or_else(|| {
        RaterError::Computation("no numeric objective to rescale".to_string())
    })?;

    let shifted: Vec<f64> = raw.iter().map(|v| (v - raw_min + 1.0).sqrt()).collect();

    let (lo, hi) = match (min(&shifted), max(&shifted)) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => {
            return Err(RaterError::Computation(
                "no numeric objective to rescale".to_string(),
            ));
        }
    };
    let range = hi - lo;
    if range == 0.0 || !range.is_finite() {
        return Err(RaterError::Computation(format!(
            "cannot rescale objectives: range of shifted values is {range}"
        )));
    }
    debug!(raw_min, shifted_min = lo, shifted_max = hi, "Rescale extrema");

    Ok(shifted
        .into_iter()
        .map(|s| {
            let normalized = (s - lo) / range * 100.0;
            Rescaled {
                shifted: s,
                published: (100.0 + normalized) / 2.0,
            }
        })
        .collect())
}

/// Scores every row with `variant` and returns the finished table.
///
/// Variants A and C are row-local. Variant B computes every raw value first,
/// then rescales in a second pass.
#[tracing::instrument(skip_all, fields(rows = rows.len(), variant = %variant))]
pub fn score_table(rows: Vec<NormalizedRecord>, variant: ObjectiveVariant) -> Result<ScoreTable> {
    let records: Vec<Record> = match variant {
        ObjectiveVariant::Linear => rows
            .into_iter()
            .map(|r| {
                let objective = linear_objective(&r);
                Record::from_normalized(r, objective, None)
            })
            .collect(),
        ObjectiveVariant::ScaledPower => rows
            .into_iter()
            .map(|r| {
                let objective = scaled_power_objective(&r);
                Record::from_normalized(r, objective, None)
            })
            .collect(),
        ObjectiveVariant::PowerRescaled => {
            let raw: Vec<f64> = rows.iter().map(power_raw_objective).collect();
            let rescaled = rescale(&raw)?;
            rows.into_iter()
                .zip(rescaled)
                .map(|(r, s)| Record::from_normalized(r, s.shifted, Some(s.published)))
                .collect()
        }
    };

    let missing = records.iter().filter(|r| r.objective.is_nan()).count();
    info!(scored = records.len(), missing, "Objective scoring complete");

    Ok(ScoreTable::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(school: &str, year: i32, gl: f64, j: [f64; 3], sr: f64) -> NormalizedRecord {
        NormalizedRecord {
            school: school.to_string(),
            year,
            grade_level: gl,
            j1: j[0],
            j2: j[1],
            j3: j[2],
            sr,
        }
    }

    #[test]
    fn test_linear_objective_reference_value() {
        let r = row("Patton", 2019, 9.0, [3.0, 4.0, 4.0], 2.0);
        assert!((linear_objective(&r) - 114.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_scoring_is_row_local() {
        let rows = vec![
            row("Patton", 2019, 9.0, [3.0, 4.0, 4.0], 2.0),
            row("Liberty", 2017, 7.6, [1.0, 2.0, 1.0], 1.0),
        ];
        let table = score_table(rows.clone(), ObjectiveVariant::Linear).unwrap();

        for (scored, source) in table.records().iter().zip(&rows) {
            assert_eq!(scored.objective, linear_objective(source));
            assert_eq!(scored.normalized_objective, None);
        }
    }

    #[test]
    fn test_scaled_power_objective() {
        // 0^0 = 1 for every judge and SR: (750 + 1 * (50 - 3) - 1) / 73
        let r = row("Draughn", 2020, 1.0, [0.0, 0.0, 0.0], 0.0);
        assert!((scaled_power_objective(&r) - 796.0 / 73.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_field_propagates() {
        let r = row("Freedom", 2018, 9.0, [f64::NAN, 1.0, 1.0], 1.0);
        assert!(linear_objective(&r).is_nan());
        assert!(power_raw_objective(&r).is_nan());
        assert!(scaled_power_objective(&r).is_nan());
    }

    #[test]
    fn test_rescale_maps_extrema_to_50_and_100() {
        let rows = vec![
            row("A", 2019, 9.0, [1.0, 1.0, 2.0], 1.0),
            row("B", 2019, 8.0, [2.0, 2.0, 2.0], 2.0),
            row("C", 2019, 7.0, [1.0, 1.0, 1.0], 1.0),
        ];
        let table = score_table(rows, ObjectiveVariant::PowerRescaled).unwrap();
        let published: Vec<f64> = table
            .records()
            .iter()
            .map(|r| r.normalized_objective.unwrap())
            .collect();

        let lo = published.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = published.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(lo, 50.0);
        assert_eq!(hi, 100.0);

        let shifted_min = table
            .records()
            .iter()
            .map(|r| r.objective)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(shifted_min, 1.0);
    }

    #[test]
    fn test_rescale_keeps_nan_rows() {
        let out = rescale(&[1.0, f64::NAN, 5.0]).unwrap();
        assert!(out[1].shifted.is_nan());
        assert!(out[1].published.is_nan());
        assert_eq!(out[0].published, 50.0);
        assert_eq!(out[2].published, 100.0);
    }

    #[test]
    fn test_rescale_zero_range_is_error() {
        let err = rescale(&[3.0, 3.0, 3.0]).unwrap_err();
        assert!(matches!(err, RaterError::Computation(_)));
    }

    #[test]
    fn test_rescale_all_nan_is_error() {
        assert!(matches!(
            rescale(&[f64::NAN]),
            Err(RaterError::Computation(_))
        ));
        assert!(matches!(rescale(&[]), Err(RaterError::Computation(_))));
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("A".parse::<ObjectiveVariant>().unwrap(), ObjectiveVariant::Linear);
        assert_eq!("b".parse::<ObjectiveVariant>().unwrap(), ObjectiveVariant::PowerRescaled);
        assert_eq!("scaled".parse::<ObjectiveVariant>().unwrap(), ObjectiveVariant::ScaledPower);
        assert!(matches!(
            "D".parse::<ObjectiveVariant>(),
            Err(RaterError::Configuration(_))
        ));
    }
}
