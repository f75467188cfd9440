use std::collections::HashMap;

use serde::Serialize;

use crate::error::ViewError;
use crate::table::{Field, Table};

/// Pitch extents in the coordinate system the scouts record (x along the length).
pub const PITCH_LENGTH: f64 = 120.0;
pub const PITCH_WIDTH: f64 = 80.0;

pub const UNLABELLED_SERIES: &str = "Executions";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Execution points grouped by `color_by`, in first-appearance order of the labels.
///
/// Rows missing either coordinate are dropped. With no label column (or none
/// requested) every point goes into a single series. When a label column is
/// used, rows without a label are not drawn.
pub fn pitch_points(table: &Table, color_by: Option<Field>) -> Result<Vec<PitchSeries>, ViewError> {
    table.require(Field::ExecutionX)?;
    table.require(Field::ExecutionY)?;
    let color_by = color_by.filter(|f| table.has_column(*f));

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut series: Vec<PitchSeries> = Vec::new();
    for row in table.rows() {
        let (Some(x), Some(y)) = (row.execution_x, row.execution_y) else {
            continue;
        };
        let label = match color_by {
            Some(field) => match row.categorical(field) {
                Some(label) => label,
                None => continue,
            },
            None => UNLABELLED_SERIES,
        };
        let pos = *index.entry(label).or_insert_with(|| {
            series.push(PitchSeries {
                label: label.to_string(),
                points: Vec::new(),
            });
            series.len() - 1
        });
        series[pos].points.push((x, y));
    }
    Ok(series)
}
