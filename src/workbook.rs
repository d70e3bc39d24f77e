use std::collections::HashMap;
use std::path::Path;

use calamine::{Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ReconError, Result};
use crate::models::CellValue;
use crate::styles::{read_xlsx_formats, SheetFormats};

static EMPTY: CellValue = CellValue::Empty;

/// Resolved values and format codes of one worksheet, 1-based coordinates.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: HashMap<(u32, u32), CellValue>,
    formats: SheetFormats,
    max_row: u32,
    max_col: u32,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats(formats: SheetFormats) -> Self {
        Self { formats, ..Self::default() }
    }

    /// Store a value; empty values are not stored and never extend the extents.
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        if value == CellValue::Empty {
            self.cells.remove(&(row, col));
            return;
        }
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
        self.cells.insert((row, col), value);
    }

    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.cells.get(&(row, col)).unwrap_or(&EMPTY)
    }

    pub fn format(&self, row: u32, col: u32) -> Option<&str> {
        self.formats.get(row, col)
    }

    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    pub fn max_col(&self) -> u32 {
        self.max_col
    }

    pub fn styled_cells(&self) -> usize {
        self.formats.styled_cells()
    }
}

/// A worksheet as listed by the workbook; `grid` is `Err` when its cells
/// could not be read.
#[derive(Debug, Clone)]
pub struct SheetEntry {
    pub name: String,
    pub grid: std::result::Result<Grid, String>,
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<SheetEntry>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, name: &str, grid: Grid) {
        self.sheets.push(SheetEntry { name: name.to_string(), grid: Ok(grid) });
    }

    pub fn add_unreadable_sheet(&mut self, name: &str, reason: &str) {
        self.sheets.push(SheetEntry { name: name.to_string(), grid: Err(reason.to_string()) });
    }

    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetEntry> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn cell_value_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        // calamine resolves the workbook's date system (1900 or 1904).
        Data::DateTime(dt) if dt.is_duration() => CellValue::Float(dt.as_f64()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Float(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::String(s.clone())),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}

fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xlsm"))
}

/// Open a spreadsheet and read every sheet's values and format codes.
///
/// Failing to open the file at all is a load error. A single worksheet that
/// cannot be read is kept as an unreadable entry so the caller can decide.
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let load_err = |reason: String| ReconError::Load {
        path: path.display().to_string(),
        reason,
    };
    let mut reader = calamine::open_workbook_auto(path).map_err(|e| load_err(e.to_string()))?;

    let mut formats = if is_xlsx(path) {
        match read_xlsx_formats(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "number formats unavailable; treating all cells as General");
                HashMap::new()
            }
        }
    } else {
        tracing::debug!(path = %path.display(), "not an XLSX package; number formats not read");
        HashMap::new()
    };

    let mut workbook = Workbook::new();
    for name in reader.sheet_names() {
        match reader.worksheet_range(&name) {
            Ok(range) => {
                let (start_row, start_col) = range.start().unwrap_or((0, 0));
                let mut grid = Grid::with_formats(formats.remove(&name).unwrap_or_default());
                for (r, c, data) in range.used_cells() {
                    let row = start_row + r as u32 + 1;
                    let col = start_col + c as u32 + 1;
                    grid.set(row, col, cell_value_from_data(data));
                }
                tracing::debug!(
                    sheet = %name,
                    max_row = grid.max_row(),
                    max_col = grid.max_col(),
                    "loaded sheet"
                );
                workbook.add_sheet(&name, grid);
            }
            Err(e) => {
                tracing::debug!(sheet = %name, error = %e, "unreadable sheet");
                workbook.add_unreadable_sheet(&name, &e.to_string());
            }
        }
    }
    tracing::debug!(path = %path.display(), sheets = ?workbook.sheet_names(), "workbook loaded");
    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

    fn date_cell(serial: f64, is_1904: bool) -> CellValue {
        let dt = ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, is_1904);
        cell_value_from_data(&Data::DateTime(dt))
    }

    #[test]
    fn test_date_serials_follow_workbook_date_system() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(date_cell(45667.0, false), CellValue::DateTime(expected));
        assert_eq!(date_cell(44205.0, true), CellValue::DateTime(expected));
        assert_eq!(date_cell(45667.0, false), date_cell(44205.0, true));

        match date_cell(45667.5, false) {
            CellValue::DateTime(noon) => assert_eq!(noon.format("%H:%M").to_string(), "12:00"),
            other => panic!("expected a date, got {other:?}"),
        }
    }

    #[test]
    fn test_duration_cells_stay_numeric() {
        let dt = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(cell_value_from_data(&Data::DateTime(dt)), CellValue::Float(1.5));
    }

    #[test]
    fn test_grid_extents_ignore_empty() {
        let mut g = Grid::new();
        g.set(3, 2, CellValue::String("x".into()));
        g.set(9, 7, CellValue::Empty);
        assert_eq!((g.max_row(), g.max_col()), (3, 2));
        assert_eq!(g.value(9, 7), &CellValue::Empty);
        assert_eq!(g.value(3, 2), &CellValue::String("x".into()));
    }

    #[test]
    fn test_error_cells_read_as_text() {
        let v = cell_value_from_data(&Data::Error(calamine::CellErrorType::Div0));
        assert_eq!(v, CellValue::String("#DIV/0!".into()));
    }

    #[test]
    fn test_iso_datetime() {
        let v = cell_value_from_data(&Data::DateTimeIso("2024-02-29".into()));
        assert!(matches!(v, CellValue::DateTime(_)));
        let v = cell_value_from_data(&Data::DateTimeIso("not a date".into()));
        assert_eq!(v, CellValue::String("not a date".into()));
    }

    #[test]
    fn test_load_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_workbook(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, ReconError::Load { .. }));
    }

    #[test]
    fn test_load_garbage_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        std::fs::write(&path, b"this is not a zip").unwrap();
        assert!(matches!(load_workbook(&path), Err(ReconError::Load { .. })));
    }

    #[test]
    fn test_load_values_and_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.xlsx");
        let mut wb = XlsxWorkbook::new();
        let pct = Format::new().set_num_format("0.00%");
        let money = Format::new().set_num_format("$#,##0.00");
        let ws = wb.add_worksheet().set_name("Data").unwrap();
        ws.write_string(2, 0, "ID").unwrap();
        ws.write_string(2, 1, "Rate").unwrap();
        ws.write_number(3, 0, 1).unwrap();
        ws.write_number_with_format(3, 1, 0.25, &pct).unwrap();
        ws.write_number_with_format(4, 1, 12.5, &money).unwrap();
        wb.add_worksheet().set_name("Empty").unwrap();
        wb.save(&path).unwrap();

        let loaded = load_workbook(&path).unwrap();
        assert_eq!(loaded.sheet_names(), vec!["Data", "Empty"]);
        let grid = loaded.sheet("Data").unwrap().grid.as_ref().unwrap();
        assert_eq!((grid.max_row(), grid.max_col()), (5, 2));
        assert_eq!(grid.value(3, 1), &CellValue::String("ID".into()));
        assert_eq!(grid.value(4, 1), &CellValue::Float(1.0));
        assert_eq!(grid.format(4, 2), Some("0.00%"));
        assert_eq!(grid.format(5, 2), Some("$#,##0.00"));
        assert_eq!(grid.format(3, 1), Some("General"));

        let empty = loaded.sheet("Empty").unwrap().grid.as_ref().unwrap();
        assert_eq!((empty.max_row(), empty.max_col()), (0, 0));
    }
}
