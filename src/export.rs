use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::table::{Column, Table};

pub const CSV_FILE_NAME: &str = "abp_filtrado.csv";
pub const XLSX_FILE_NAME: &str = "abp_filtrado.xlsx";
pub const SHEET_NAME: &str = "ABP_filtrado";

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub rows: usize,
    pub columns: usize,
    pub csv_path: PathBuf,
    pub xlsx_path: PathBuf,
}

/// Write the filtered table as CSV and XLSX into `dir`.
pub fn export_filtered(dir: &Path, table: &Table) -> Result<ExportReport> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed creating export dir {}", dir.display()))?;

    let csv_path = dir.join(CSV_FILE_NAME);
    let xlsx_path = dir.join(XLSX_FILE_NAME);

    std::fs::write(&csv_path, to_csv_bytes(table)?)
        .with_context(|| format!("failed writing csv to {}", csv_path.display()))?;
    std::fs::write(&xlsx_path, to_xlsx_bytes(table)?)
        .with_context(|| format!("failed writing workbook to {}", xlsx_path.display()))?;

    info!(
        rows = table.len(),
        dir = %dir.display(),
        "exported filtered actions"
    );

    Ok(ExportReport {
        rows: table.len(),
        columns: table.columns().len(),
        csv_path,
        xlsx_path,
    })
}

pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns().iter().map(Column::name))
        .context("write csv header")?;
    for (row_idx, row) in table.rows().iter().enumerate() {
        let cells = (0..table.columns().len())
            .map(|position| table.cell_text(row, position).unwrap_or_default());
        writer
            .write_record(cells)
            .with_context(|| format!("write csv row {row_idx}"))?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow!("flush csv buffer: {}", err.error()))
}

pub fn to_xlsx_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        write_table(sheet, table)?;
    }
    workbook
        .save_to_buffer()
        .context("failed serialising workbook")
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    for (col_idx, column) in table.columns().iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, column.name())
            .with_context(|| format!("write header ({col_idx})"))?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        let row_idx = (idx + 1) as u32;
        for (col_idx, column) in table.columns().iter().enumerate() {
            let col = col_idx as u16;
            let numeric = match column {
                Column::Known(field) if field.is_numeric() => row.numeric(*field),
                _ => None,
            };
            let written = match numeric {
                Some(value) => worksheet.write_number(row_idx, col, value).map(|_| ()),
                None => match table.cell_text(row, col_idx) {
                    Some(text) => worksheet.write_string(row_idx, col, &text).map(|_| ()),
                    None => Ok(()),
                },
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
