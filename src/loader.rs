use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::DatasetError;
use crate::table::{Column, EventRecord, Field, Table};

/// Load the event sheet at `path`. A missing file is `DataUnavailable`.
pub fn load_path(path: &Path) -> Result<Table, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::DataUnavailable(path.to_path_buf()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let table = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)?;
            load_csv_reader(file)?
        }
        "xlsx" | "xlsm" | "xls" | "ods" => load_workbook(path)?,
        other => return Err(DatasetError::UnsupportedFormat(other.to_string())),
    };
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "loaded dead-ball dataset"
    );
    Ok(table)
}

/// The configured data source (`ABP_DATA_PATH` or `--data`).
pub fn load_default(config: &Config) -> Result<Table, DatasetError> {
    load_path(&config.data_path)
}

pub fn load_csv_reader<R: Read>(reader: R) -> Result<Table, DatasetError> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| Some(cell.to_string()))
                .collect::<Vec<_>>(),
        );
    }
    table_from_rows(&headers, rows)
}

fn load_workbook(path: &Path) -> Result<Table, DatasetError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|err| DatasetError::Spreadsheet(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DatasetError::EmptySheet(path.to_path_buf()))?
        .map_err(|err| DatasetError::Spreadsheet(err.to_string()))?;

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        return Err(DatasetError::EmptySheet(path.to_path_buf()));
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();
    let rows = sheet_rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .collect();
    table_from_rows(&headers, rows)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(v) => Some(v.to_string()),
        Data::Int(v) => Some(v.to_string()),
        Data::Bool(v) => Some(v.to_string()),
        other => Some(other.to_string()),
    }
}

/// Build a table from a header row and raw cells. Headers are matched
/// case-insensitively; unknown (or repeated) headers become extra columns.
pub fn table_from_rows(
    headers: &[String],
    rows: Vec<Vec<Option<String>>>,
) -> Result<Table, DatasetError> {
    let mut columns = Vec::with_capacity(headers.len());
    for header in headers {
        let name = header.trim().to_lowercase();
        let column = match Field::from_header(&name) {
            Some(field) if !columns.contains(&Column::Known(field)) => Column::Known(field),
            _ => Column::Extra(name),
        };
        columns.push(column);
    }

    for field in Field::ALL.into_iter().filter(|f| f.is_required()) {
        if !columns.contains(&Column::Known(field)) {
            return Err(DatasetError::MissingRequiredColumn(field.header()));
        }
    }

    let mut records = Vec::with_capacity(rows.len());
    for (idx, cells) in rows.into_iter().enumerate() {
        let blank = cells
            .iter()
            .all(|c| c.as_deref().is_none_or(|s| s.trim().is_empty()));
        if blank {
            debug!(row = idx + 2, "skipping blank row");
            continue;
        }
        let mut record = EventRecord::default();
        for (col_idx, column) in columns.iter().enumerate() {
            let raw = cells.get(col_idx).and_then(|c| c.as_deref());
            match column {
                Column::Known(field) => {
                    record
                        .set_text(*field, raw)
                        .map_err(|value| DatasetError::InvalidTimeBucket { row: idx + 2, value })?;
                }
                Column::Extra(_) => {
                    let value = raw.filter(|s| !s.trim().is_empty()).map(str::to_string);
                    record.extras.push(value);
                }
            }
        }
        records.push(record);
    }

    Ok(Table::new(columns, records))
}
