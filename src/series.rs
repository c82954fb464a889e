//! Labeled (x, y) series for presentation.
//!
//! The builders here only shape data; drawing is left to whatever implements
//! [`SeriesSink`].

use std::collections::BTreeSet;

use anyhow::Result;
use serde::Serialize;

use crate::analyzers::aggregate::{ScoreField, Statistic, group_reduce};
use crate::analyzers::types::{FeederMap, Record, RelativePerformanceEntry, ScoreTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: i32,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub style: LineStyle,
    pub points: Vec<SeriesPoint>,
}

/// A titled group of series meant to be drawn together.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

/// Anything that can present a [`Chart`]: a plot backend, a file, a log.
pub trait SeriesSink {
    fn render(&mut self, chart: &Chart) -> Result<()>;
}

fn stat_title(stat: Statistic) -> &'static str {
    match stat {
        Statistic::Max => "Maximum",
        Statistic::Mean => "Average",
        Statistic::Min => "Minimum",
    }
}

fn yearly_series<'a, I>(
    label: String,
    style: LineStyle,
    records: I,
    field: ScoreField,
    stat: Statistic,
) -> Series
where
    I: IntoIterator<Item = &'a Record>,
{
    let points = group_reduce(records, |r| r.year, field, stat)
        .into_iter()
        .map(|(x, y)| SeriesPoint { x, y })
        .collect();
    Series { label, style, points }
}

/// Each high school's yearly statistic next to the pooled statistic of its
/// feeders. Feeder series are dashed and only present when feeders have data.
pub fn feeder_comparison(
    table: &ScoreTable,
    feeders: &FeederMap,
    field: ScoreField,
    stat: Statistic,
) -> Chart {
    let mut series = Vec::new();

    for (high_school, feeder_schools) in feeders {
        let own = table.records().iter().filter(|r| &r.school == high_school);
        let own = yearly_series(
            format!("{high_school} {}", stat.label()),
            LineStyle::Solid,
            own,
            field,
            stat,
        );
        if !own.points.is_empty() {
            series.push(own);
        }

        let pooled = table
            .records()
            .iter()
            .filter(|r| feeder_schools.contains(&r.school));
        let pooled = yearly_series(
            format!("{high_school} Feeders {}", stat.label()),
            LineStyle::Dashed,
            pooled,
            field,
            stat,
        );
        if !pooled.points.is_empty() {
            series.push(pooled);
        }
    }

    Chart {
        title: format!(
            "{} {} for High Schools and Their Feeder Middle Schools",
            stat_title(stat),
            field.label()
        ),
        x_label: "Year".to_string(),
        y_label: field.label().to_string(),
        series,
    }
}

/// One chart for the high schools and one for every other school, each with
/// a series per school.
pub fn school_level(
    table: &ScoreTable,
    feeders: &FeederMap,
    field: ScoreField,
    stat: Statistic,
) -> [Chart; 2] {
    let high_schools: BTreeSet<&str> = feeders.keys().map(String::as_str).collect();
    let middle_schools: BTreeSet<&str> = table
        .schools()
        .into_iter()
        .filter(|s| !high_schools.contains(s))
        .collect();

    [
        school_chart(table, "High Schools", &high_schools, field, stat),
        school_chart(table, "Middle Schools", &middle_schools, field, stat),
    ]
}

fn school_chart(
    table: &ScoreTable,
    group: &str,
    schools: &BTreeSet<&str>,
    field: ScoreField,
    stat: Statistic,
) -> Chart {
    let series = schools
        .iter()
        .map(|school| {
            let records = table.records().iter().filter(|r| r.school == *school);
            yearly_series(school.to_string(), LineStyle::Solid, records, field, stat)
        })
        .filter(|s| !s.points.is_empty())
        .collect();

    Chart {
        title: format!("{group} {} {}", stat_title(stat), field.label()),
        x_label: "Year".to_string(),
        y_label: format!("{} {}", stat_title(stat), field.label()),
        series,
    }
}

/// One series per high school of its relative performance points.
pub fn relative_performance_chart(
    entries: &[RelativePerformanceEntry],
    feeders: &FeederMap,
) -> Chart {
    let series = feeders
        .keys()
        .map(|school| Series {
            label: school.clone(),
            style: LineStyle::Solid,
            points: entries
                .iter()
                .filter(|e| &e.school == school)
                .map(|e| SeriesPoint {
                    x: e.year,
                    y: e.relative_performance,
                })
                .collect(),
        })
        .filter(|s| !s.points.is_empty())
        .collect();

    Chart {
        title: "Relative Performance of High Schools to Their Feeder Middle Schools".to_string(),
        x_label: "Year".to_string(),
        y_label: "Relative Performance".to_string(),
        series,
    }
}
