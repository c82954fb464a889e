//! Field normalization: sentinel substitution and numeric coercion.

use tracing::{debug, info};

use crate::analyzers::types::{NormalizedRecord, RawRecord};
use crate::config::RaterConfig;
use crate::error::{RaterError, Result};

/// Weight of the lower grade in a two-grade "x,y" Grade Level.
const LOWER_GRADE_WEIGHT: f64 = 0.4;
/// Weight of the upper grade in a two-grade "x,y" Grade Level.
const UPPER_GRADE_WEIGHT: f64 = 0.6;
const GRADE_SEPARATOR: char = ',';

/// Parses a Grade Level cell. `"8,9"` becomes `0.4 * 8 + 0.6 * 9`.
///
/// # Errors
///
/// Returns the reason as text when the value is not a finite number or a
/// pair of finite numbers.
pub fn parse_grade_level(value: &str) -> std::result::Result<f64, String> {
    let value = value.trim();
    let grade = if value.contains(GRADE_SEPARATOR) {
        let parts: Vec<&str> = value.split(GRADE_SEPARATOR).map(str::trim).collect();
        if parts.len() != 2 {
            return Err(format!(
                "expected two grades joined by '{GRADE_SEPARATOR}', found {}",
                parts.len()
            ));
        }
        let x = parse_number(parts[0])?;
        let y = parse_number(parts[1])?;
        LOWER_GRADE_WEIGHT * x + UPPER_GRADE_WEIGHT * y
    } else {
        parse_number(value)?
    };

    if !grade.is_finite() {
        return Err("grade level is not finite".to_string());
    }
    Ok(grade)
}

fn parse_number(token: &str) -> std::result::Result<f64, String> {
    token
        .parse::<f64>()
        .map_err(|_| format!("'{token}' is not a number"))
}

fn parse_year(value: &str) -> std::result::Result<i32, String> {
    let value = value.trim();
    if let Ok(year) = value.parse::<i32>() {
        return Ok(year);
    }
    match value.parse::<f64>() {
        Ok(y) if y.fract() == 0.0 && y >= i32::MIN as f64 && y <= i32::MAX as f64 => {
            Ok(y as i32)
        }
        _ => Err("expected an integer year".to_string()),
    }
}

/// Coerces a score cell to a number; anything unparseable becomes NaN.
fn coerce(cell: &str) -> f64 {
    let cell = cell.trim();
    if cell.is_empty() {
        return f64::NAN;
    }
    cell.parse::<f64>().unwrap_or(f64::NAN)
}

/// Cleans one raw row.
///
/// SR "not applicable" markers become `na_replacement` directly, then the
/// carried-over marker is replaced in every remaining cell. `row` is only used
/// to label errors.
pub fn normalize_record(
    row: usize,
    raw: &RawRecord,
    config: &RaterConfig,
) -> Result<NormalizedRecord> {
    let co_text = config.carried_over_replacement.to_string();

    let carried_over = |cell: &str| -> String {
        if cell.trim() == config.carried_over_sentinel {
            co_text.clone()
        } else {
            cell.to_string()
        }
    };

    let sr_trimmed = raw.sr.trim();
    let sr_is_na =
        config.is_na_sentinel(sr_trimmed) || (config.fill_empty_sr && sr_trimmed.is_empty());
    let sr = if sr_is_na {
        config.na_replacement
    } else {
        coerce(&carried_over(&raw.sr))
    };

    let school = carried_over(&raw.school).trim().to_string();
    let year_cell = carried_over(&raw.year);
    let grade_cell = carried_over(&raw.grade_level);

    let year = parse_year(&year_cell).map_err(|reason| RaterError::Parse {
        row,
        field: "Year",
        value: raw.year.clone(),
        reason,
    })?;
    let grade_level = parse_grade_level(&grade_cell).map_err(|reason| RaterError::Parse {
        row,
        field: "Grade Level",
        value: raw.grade_level.clone(),
        reason,
    })?;

    let record = NormalizedRecord {
        school,
        year,
        grade_level,
        j1: coerce(&carried_over(&raw.j1)),
        j2: coerce(&carried_over(&raw.j2)),
        j3: coerce(&carried_over(&raw.j3)),
        sr,
    };

    if [record.j1, record.j2, record.j3, record.sr]
        .iter()
        .any(|v| v.is_nan())
    {
        debug!(row, school = %record.school, year, "Row has non-numeric scores");
    }

    Ok(record)
}

/// Cleans every row of the table, stopping at the first fatal parse error.
///
/// Rows are numbered from 1 in error messages.
#[tracing::instrument(skip_all, fields(rows = raw.len()))]
pub fn normalize_table(raw: &[RawRecord], config: &RaterConfig) -> Result<Vec<NormalizedRecord>> {
    let rows = raw
        .iter()
        .enumerate()
        .map(|(i, r)| normalize_record(i + 1, r, config))
        .collect::<Result<Vec<_>>>()?;

    info!(normalized = rows.len(), "Normalization complete");
    Ok(rows)
}
