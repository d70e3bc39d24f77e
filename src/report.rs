use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::Result;
use crate::fmt::{truncate_text, MAX_CELL_TEXT};
use crate::models::{ReconciliationResult, Verdict};
use crate::summary::Summary;

pub const DASHBOARD_SHEET: &str = "QA Dashboard";
pub const DETAIL_SHEET: &str = "Detailed Test Results";

const DETAIL_COLUMNS: [&str; 9] = [
    "SHEET",
    "CELL",
    "FIELD",
    "EXPECTED VALUE",
    "TEST VALUE",
    "DATA TYPE",
    "DATA TYPE REASON",
    "RIGHT/WRONG",
    "REASON",
];

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

fn title_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_size(20)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

fn kpi_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_size(28)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

fn kpi_label_format() -> Format {
    Format::new()
        .set_font_size(12)
        .set_align(FormatAlign::Center)
        .set_font_color(Color::RGB(0x595959))
}

fn header_format(background: Color, font: Color) -> Format {
    Format::new()
        .set_bold()
        .set_font_color(font)
        .set_background_color(background)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Merge a block and put a number in its top-left cell.
fn merged_number(ws: &mut Worksheet, range: (u32, u16, u32, u16), value: f64, format: &Format) -> Result<()> {
    let (r1, c1, r2, c2) = range;
    ws.merge_range(r1, c1, r2, c2, "", format)?;
    ws.write_number_with_format(r1, c1, value, format)?;
    Ok(())
}

fn write_dashboard(ws: &mut Worksheet, summary: &Summary) -> Result<()> {
    let counts = &summary.overall;
    let kpi = kpi_format();
    let label = kpi_label_format();

    ws.merge_range(1, 1, 2, 5, "Data Reconciliation Dashboard", &title_format())?;

    merged_number(ws, (4, 1, 6, 2), counts.value_correct as f64, &kpi)?;
    ws.merge_range(7, 1, 7, 2, "Matching Cells", &label)?;
    merged_number(ws, (4, 4, 6, 5), counts.value_wrong as f64, &kpi)?;
    ws.merge_range(7, 4, 7, 5, "Mismatched Cells", &label)?;

    ws.merge_range(9, 1, 11, 5, &format!("{:.1}%", summary.accuracy()), &kpi)?;
    ws.merge_range(12, 1, 12, 5, "Overall Accuracy Score", &label)?;

    let small_kpi = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_align(FormatAlign::Center);
    ws.merge_range(14, 1, 14, 5, "Data Type Checks", &kpi_label_format().set_bold())?;
    let dtype_cells = [
        (1u16, counts.dtype_correct, "Correct"),
        (3u16, counts.dtype_wrong, "Wrong"),
        (5u16, counts.dtype_not_applicable, "Not Applicable"),
    ];
    for (col, n, text) in dtype_cells {
        ws.write_number_with_format(15, col, n as f64, &small_kpi)?;
        ws.write_string_with_format(16, col, text, &label)?;
    }

    for col in 1..=5u16 {
        ws.set_column_width(col, 20)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Detail sheet
// ---------------------------------------------------------------------------

/// Discrepancies first, then clean cells; each group keeps ledger order.
fn detail_rows(result: &ReconciliationResult) -> Vec<&Verdict> {
    let (clean, flagged): (Vec<&Verdict>, Vec<&Verdict>) = result.verdicts().partition(|v| v.is_clean());
    flagged.into_iter().chain(clean).collect()
}

fn write_details(ws: &mut Worksheet, result: &ReconciliationResult) -> Result<()> {
    let yellow = header_format(Color::RGB(0xFFFF00), Color::Black);
    let red = header_format(Color::RGB(0xFF0000), Color::White);
    let green = header_format(Color::RGB(0x70AD47), Color::White);

    for (i, name) in DETAIL_COLUMNS.iter().enumerate() {
        let format = match i {
            0..=2 => &yellow,
            3..=4 => &red,
            _ => &green,
        };
        ws.write_string_with_format(0, i as u16, *name, format)?;
    }

    let rows = detail_rows(result);
    for (i, v) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        let values = [
            v.sheet(),
            v.cell(),
            v.field(),
            v.expected(),
            v.test(),
            v.dtype().label(),
            v.dtype_reason(),
            v.value().label(),
            v.value_reason(),
        ];
        for (col, text) in values.iter().enumerate() {
            ws.write_string(row, col as u16, truncate_text(text, MAX_CELL_TEXT))?;
        }
    }

    for col in 0..DETAIL_COLUMNS.len() as u16 {
        ws.set_column_width(col, 22)?;
    }
    ws.set_freeze_panes(1, 0)?;
    if !rows.is_empty() {
        ws.autofilter(0, 0, rows.len() as u32, DETAIL_COLUMNS.len() as u16 - 1)?;
    }
    Ok(())
}

/// Render the dashboard and detailed results as an XLSX file in memory.
pub fn render_report(result: &ReconciliationResult, summary: &Summary) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let dashboard = workbook.add_worksheet().set_name(DASHBOARD_SHEET)?;
    write_dashboard(dashboard, summary)?;

    let details = workbook.add_worksheet().set_name(DETAIL_SHEET)?;
    write_details(details, result)?;

    Ok(workbook.save_to_buffer()?)
}
