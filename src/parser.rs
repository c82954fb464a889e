//! CSV reader for adjudication tables.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::analyzers::types::RawRecord;

/// Reads CSV bytes with a header row into raw records.
///
/// The columns `School`, `Year`, `Grade Level`, `J1`, `J2`, `J3` and `SR` are
/// required; any other column is ignored. Cells are trimmed and kept as text.
///
/// # Errors
///
/// Returns an error if the CSV is malformed or a required column is missing.
pub fn parse_table(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize().enumerate() {
        let record: RawRecord = result.with_context(|| format!("reading CSV row {}", i + 1))?;
        rows.push(record);
    }

    debug!(rows = rows.len(), "Parsed adjudication table");
    Ok(rows)
}

/// Loads and parses the CSV file at `path`.
pub fn load_table(path: &str) -> Result<Vec<RawRecord>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading '{path}'"))?;
    parse_table(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_table() {
        let csv = "School,Year,Grade Level,J1,J2,J3,SR\n\
                   Patton,2019,9,3,4,4,2\n\
                   Liberty,2017,\"7,8\",1,1,C/O,N/A\n";
        let rows = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].school, "Patton");
        assert_eq!(rows[1].grade_level, "7,8");
        assert_eq!(rows[1].j3, "C/O");
        assert_eq!(rows[1].sr, "N/A");
    }

    #[test]
    fn test_extra_columns_ignored_and_cells_trimmed() {
        let csv = "Director,School,Year,Grade Level,J1,J2,J3,SR\n\
                   Smith, Freedom ,2018,10,1,2,1,1\n";
        let rows = parse_table(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].school, "Freedom");
        assert_eq!(rows[0].year, "2018");
    }

    #[test]
    fn test_empty_cells_kept_as_empty_text() {
        let csv = "School,Year,Grade Level,J1,J2,J3,SR\nPatton,2019,9,1,1,1,\n";
        let rows = parse_table(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].sr, "");
    }

    #[test]
    fn test_missing_column_is_error() {
        let csv = "School,Year,J1,J2,J3,SR\nPatton,2019,1,1,1,1\n";
        assert!(parse_table(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_input_has_no_rows() {
        let rows = parse_table(b"School,Year,Grade Level,J1,J2,J3,SR\n").unwrap();
        assert!(rows.is_empty());
    }
}
