use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::grid::{Cell, SheetGrid, column_index};
use crate::labels;

/// Convert an export grid to CSV format
///
/// Every grid row becomes one CSV line, short rows are not padded, and
/// fields containing commas, quotes or newlines are quoted. Merge ranges and
/// widths have no CSV counterpart and are dropped.
///
/// # Examples
/// ```
/// use gradesheet::gradebook::Gradebook;
/// use gradesheet::downloader::to_csv;
///
/// let book = Gradebook::new();
/// let csv = to_csv(&book.sheet_grid().unwrap());
/// assert_eq!(csv.lines().count(), 10);
/// ```
pub fn to_csv(grid: &SheetGrid) -> String {
    let mut csv_content = String::new();

    for row in &grid.rows {
        for (c, cell) in row.iter().enumerate() {
            if c > 0 {
                csv_content.push(',');
            }
            let value = cell.to_string();
            if value.contains(',') || value.contains('"') || value.contains('\n') {
                let escaped = value.replace('"', "\"\"");
                csv_content.push_str(&format!("\"{}\"", escaped));
            } else {
                csv_content.push_str(&value);
            }
        }
        csv_content.push('\n');
    }

    csv_content
}

fn centered() -> Format {
    Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<()> {
    match (cell, format) {
        (Cell::Blank, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (Cell::Blank, None) => {}
        (Cell::Number(n), Some(format)) if n.is_finite() => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        (Cell::Number(n), None) if n.is_finite() => {
            worksheet.write_number(row, col, *n)?;
        }
        (cell, Some(format)) => {
            worksheet.write_string_with_format(row, col, &cell.to_string(), format)?;
        }
        (cell, None) => {
            worksheet.write_string(row, col, &cell.to_string())?;
        }
    }
    Ok(())
}

/// Fill a worksheet from an export grid
///
/// Multi-cell merge ranges are merged with their first cell's text; every
/// cell inside a merge range, single-cell ranges included, is centered both
/// horizontally and vertically. Column widths are applied last.
pub fn fill_worksheet(worksheet: &mut Worksheet, grid: &SheetGrid) -> Result<()> {
    let format = centered();

    for range in grid.merges.iter().filter(|m| !m.is_single()) {
        let text = grid.cell(range.first_row, range.first_col).to_string();
        worksheet.merge_range(
            range.first_row,
            range.first_col,
            range.last_row,
            range.last_col,
            &text,
            &format,
        )?;
    }

    for (r, row) in grid.rows.iter().enumerate() {
        let r = r as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = column_index(c)?;
            match grid.merge_at(r, c) {
                // Already written by merge_range.
                Some(range) if !range.is_single() => continue,
                Some(_) => write_cell(worksheet, r, c, cell, Some(&format))?,
                None => write_cell(worksheet, r, c, cell, None)?,
            }
        }
    }

    for (c, width) in grid.column_widths.iter().enumerate() {
        worksheet.set_column_width(column_index(c)?, *width)?;
    }

    Ok(())
}

/// Convert an export grid to XLSX format
///
/// Uses the rust_xlsxwriter library to build a single-sheet workbook named
/// `Results` and returns the file content.
///
/// # Examples
/// ```
/// use gradesheet::gradebook::Gradebook;
/// use gradesheet::downloader::to_xlsx;
///
/// let book = Gradebook::new();
/// let bytes = to_xlsx(&book.sheet_grid().unwrap()).unwrap();
/// assert_eq!(&bytes[..2], b"PK");
/// ```
pub fn to_xlsx(grid: &SheetGrid) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(labels::SHEET_NAME)?;

    fill_worksheet(&mut worksheet, grid)?;
    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

/// Writes the grid as an `.xlsx` file.
pub fn save_xlsx(grid: &SheetGrid, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_xlsx(grid)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "spreadsheet exported");
    Ok(())
}

/// Writes the grid as a CSV file.
pub fn save_csv(grid: &SheetGrid, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_csv(grid))?;
    info!(path = %path.display(), "csv exported");
    Ok(())
}

/// Convert column number to letter (A=1, B=2, etc.)
///
/// # Examples
/// ```
/// use gradesheet::downloader::column_to_letter;
///
/// assert_eq!(column_to_letter(1), "A");
/// assert_eq!(column_to_letter(26), "Z");
/// assert_eq!(column_to_letter(27), "AA");
/// assert_eq!(column_to_letter(52), "AZ");
/// ```
pub fn column_to_letter(col: u16) -> String {
    let mut name = String::new();
    let mut n = col;

    while n > 0 {
        n -= 1;
        name.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }

    name
}
