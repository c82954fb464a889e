//! Output formatting and persistence for scored tables and series.
//!
//! Supports JSON logging, CSV tables and the two shipped
//! [`SeriesSink`] implementations.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::ScoreTable;
use crate::series::{Chart, LineStyle, SeriesSink};
use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `rows` as CSV with a header row to `writer`.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `rows` to the CSV file at `path`, replacing any previous content.
pub fn write_csv_file<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing CSV file");
    let file = File::create(path).with_context(|| format!("creating '{path}'"))?;
    write_csv(file, rows)
}

/// Writes the enriched score table to `path`.
pub fn write_score_table(path: &str, table: &ScoreTable) -> Result<()> {
    write_csv_file(path, table.records())
}

#[derive(Serialize)]
struct SeriesRow<'a> {
    chart: &'a str,
    series: &'a str,
    style: LineStyle,
    x: i32,
    y: f64,
}

/// Writes every rendered chart as long-form CSV rows
/// (`chart,series,style,x,y`) into one stream.
pub struct CsvSeriesSink<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> CsvSeriesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: WriterBuilder::new().has_headers(true).from_writer(writer),
        }
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing series CSV: {}", e.error()))
    }
}

impl<W: Write> SeriesSink for CsvSeriesSink<W> {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        for series in &chart.series {
            for point in &series.points {
                self.writer.serialize(SeriesRow {
                    chart: &chart.title,
                    series: &series.label,
                    style: series.style,
                    x: point.x,
                    y: point.y,
                })?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Renders charts as structured log events.
#[derive(Debug, Default)]
pub struct LogSeriesSink;

impl SeriesSink for LogSeriesSink {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        info!(
            title = %chart.title,
            x_label = %chart.x_label,
            y_label = %chart.y_label,
            series = chart.series.len(),
            "Chart"
        );
        for series in &chart.series {
            let points: Vec<String> = series
                .points
                .iter()
                .map(|p| format!("({}, {:.4})", p.x, p.y))
                .collect();
            info!(
                label = %series.label,
                style = ?series.style,
                points = %points.join(" "),
                "Series"
            );
        }
        Ok(())
    }
}
