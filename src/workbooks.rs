use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::{Workbook, XlsxError};
use tracing::debug;

use crate::{batch::OutputRow, configs::OutputConfig, errors::AppError};

pub const TEMPLATE_HEADERS: [&str; 2] = ["Product Code", "Product Description"];
pub const DEFAULT_OUTPUT_FILENAME: &str = "TranslatedFile.xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub product_code: String,
    pub description: String,
}

/// Rows that survived filtering, plus the 1-based sheet row numbers that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub rows: Vec<SourceRow>,
    pub skipped: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Declined,
}

pub fn read_rows(path: &Path) -> Result<SourceTable, AppError> {
    let source_err = |reason: String| AppError::SourceRead {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| source_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| source_err("workbook does not contain any worksheets".to_string()))?
        .map_err(|e| source_err(format!("failed to read first worksheet: {}", e)))?;

    let mut table = SourceTable::default();
    let Some((last_row, _)) = range.end() else {
        return Ok(table);
    };

    // Sheet row 0 is the header, wherever the used range happens to start.
    for row in 1..=last_row {
        let code = range
            .get_value((row, 0))
            .and_then(cell_text)
            .map(|code| code.trim().to_string());
        let description = range.get_value((row, 1)).and_then(cell_text);

        match (code, description) {
            (Some(product_code), Some(description)) => table.rows.push(SourceRow {
                product_code,
                description,
            }),
            _ => {
                debug!(row = row + 1, "skipping row without code or description");
                table.skipped.push(row + 1);
            }
        }
    }

    Ok(table)
}

/// Blank cells read as `None`; anything else is returned untrimmed.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        other => other.to_string(),
    };
    (!text.trim().is_empty()).then_some(text)
}

pub fn write_translations(
    rows: &[OutputRow],
    output_path: &Path,
    config: &OutputConfig,
) -> Result<(), AppError> {
    let save_err = |source: XlsxError| AppError::SaveWrite {
        path: output_path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&config.sheet_name).map_err(save_err)?;
    sheet.write_string(0, 0, &config.code_header).map_err(save_err)?;
    sheet
        .write_string(0, 1, &config.description_header)
        .map_err(save_err)?;

    for (idx, row) in rows.iter().enumerate() {
        let sheet_row = idx as u32 + 1;
        sheet
            .write_string(sheet_row, 0, &row.product_code)
            .map_err(save_err)?;
        sheet
            .write_string(sheet_row, 1, row.result.text())
            .map_err(save_err)?;
    }

    workbook.save(output_path).map_err(save_err)
}

/// An absent or blank destination means the user chose not to save.
pub fn save_translations(
    rows: &[OutputRow],
    destination: Option<&Path>,
    config: &OutputConfig,
) -> Result<SaveOutcome, AppError> {
    let Some(path) = destination.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(SaveOutcome::Declined);
    };

    write_translations(rows, path, config)?;
    Ok(SaveOutcome::Saved(path.to_path_buf()))
}

pub fn write_template(output_path: &Path) -> Result<(), AppError> {
    let save_err = |source: XlsxError| AppError::SaveWrite {
        path: output_path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in TEMPLATE_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).map_err(save_err)?;
    }
    workbook.save(output_path).map_err(save_err)
}
