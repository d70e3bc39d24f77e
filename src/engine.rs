use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use strsim::jaro_winkler;

use crate::aligner::{align_sheets, ColumnLabels, Coordinates, SheetPair};
use crate::classifier::classify;
use crate::error::{ReconError, Result};
use crate::fmt::{cell_address, truncate_text, MAX_COLUMN, MAX_ROW};
use crate::models::{
    CellValue, DtypeResult, ReconciliationResult, SheetVerdicts, SheetWarning, ValueResult,
    Verdict,
};
use crate::normalizer::{canonical_eq, normalize};
use crate::settings::{ReasonStyle, ReconOptions};
use crate::workbook::{load_workbook, Grid, Workbook};

/// Test value shown for every cell of a template sheet absent from the output.
pub const SHEET_MISSING: &str = "<sheet missing>";

/// Jaro-Winkler similarity above which a text mismatch is hinted as a typo.
const SPELLING_HINT_THRESHOLD: f64 = 0.85;

/// Longest excerpt of a cell value quoted inside a reason.
const REASON_QUOTE_CHARS: usize = 200;

fn quote(value: &CellValue) -> String {
    truncate_text(&value.to_string(), REASON_QUOTE_CHARS).into_owned()
}

/// Load both workbooks and reconcile them. Either file failing to open aborts
/// the run before any comparison happens.
pub fn reconcile_files(
    template_path: &Path,
    output_path: &Path,
    options: &ReconOptions,
    cancel: Option<&AtomicBool>,
) -> Result<ReconciliationResult> {
    let template = load_workbook(template_path)?;
    let output = load_workbook(output_path)?;
    tracing::debug!(
        template = %template_path.display(),
        output = %output_path.display(),
        template_sheets = template.sheets().len(),
        output_sheets = output.sheets().len(),
        "workbooks loaded"
    );
    Ok(match cancel {
        Some(flag) => reconcile_with_cancel(&template, &output, options, flag),
        None => reconcile(&template, &output, options),
    })
}

pub fn reconcile(
    template: &Workbook,
    output: &Workbook,
    options: &ReconOptions,
) -> ReconciliationResult {
    reconcile_with_cancel(template, output, options, &AtomicBool::new(false))
}

/// Reconcile sheet by sheet. A sheet that fails is dropped with a warning;
/// `cancel` is only consulted between sheets.
pub fn reconcile_with_cancel(
    template: &Workbook,
    output: &Workbook,
    options: &ReconOptions,
    cancel: &AtomicBool,
) -> ReconciliationResult {
    let mut result = ReconciliationResult::default();

    for pair in align_sheets(template, output, options.sheet_policy) {
        if cancel.load(Ordering::Relaxed) {
            tracing::debug!(next_sheet = pair.name, "run cancelled");
            result.cancelled = true;
            break;
        }
        match reconcile_sheet(&pair, options) {
            Ok(verdicts) => {
                tracing::debug!(sheet = pair.name, checks = verdicts.len(), "sheet reconciled");
                result.sheets.push(SheetVerdicts {
                    sheet: pair.name.to_string(),
                    verdicts,
                });
            }
            Err(e) => {
                tracing::warn!(sheet = pair.name, error = %e, "skipping sheet");
                result.warnings.push(SheetWarning {
                    sheet: pair.name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    result
}

fn sheet_error(sheet: &str, reason: impl Into<String>) -> ReconError {
    ReconError::Sheet {
        sheet: sheet.to_string(),
        reason: reason.into(),
    }
}

/// Compare one sheet. Any error discards everything gathered for it.
fn reconcile_sheet(pair: &SheetPair<'_>, options: &ReconOptions) -> Result<Vec<Verdict>> {
    let template = pair
        .template
        .grid
        .as_ref()
        .map_err(|reason| sheet_error(pair.name, format!("template sheet unreadable: {reason}")))?;
    let output = match pair.output {
        Some(entry) => Some(
            entry
                .grid
                .as_ref()
                .map_err(|reason| sheet_error(pair.name, format!("output sheet unreadable: {reason}")))?,
        ),
        None => None,
    };
    if template.max_row() > MAX_ROW || template.max_col() > MAX_COLUMN {
        return Err(sheet_error(
            pair.name,
            format!(
                "template extent {}x{} exceeds spreadsheet limits",
                template.max_row(),
                template.max_col()
            ),
        ));
    }

    let labels = ColumnLabels::from_grid(template, options.header_row);
    let mut verdicts = Vec::new();

    for (row, col) in Coordinates::for_template(template, options.header_row) {
        let expected = template.value(row, col);
        if expected.is_blank() {
            continue;
        }
        let cell = cell_address(row, col)
            .ok_or_else(|| sheet_error(pair.name, format!("no address for row {row}, column {col}")))?;
        let field = labels.label(col);

        let verdict = match output {
            Some(grid) => compare_cell(pair.name, cell, field, template, grid, row, col, options),
            None => missing_sheet_verdict(pair.name, cell, field, expected),
        };
        verdicts.push(verdict);
    }
    Ok(verdicts)
}

fn missing_sheet_verdict(sheet: &str, cell: String, field: String, expected: &CellValue) -> Verdict {
    let reason = format!("Sheet '{sheet}' is missing from the output workbook");
    Verdict::new(
        sheet,
        cell,
        field,
        expected.to_string(),
        SHEET_MISSING.to_string(),
        DtypeResult::Wrong,
        reason.clone(),
        ValueResult::Wrong,
        format!("{reason}; expected '{}'", quote(expected)),
    )
}

#[allow(clippy::too_many_arguments)]
fn compare_cell(
    sheet: &str,
    cell: String,
    field: String,
    template: &Grid,
    output: &Grid,
    row: u32,
    col: u32,
    options: &ReconOptions,
) -> Verdict {
    let expected = template.value(row, col);
    let actual = output.value(row, col);

    let (dtype, dtype_reason) = if row == options.header_row {
        (DtypeResult::NotApplicable, "Header row; data type not checked".to_string())
    } else {
        let expected_tag = classify(template.format(row, col));
        let actual_tag = classify(output.format(row, col));
        if expected_tag == actual_tag {
            (DtypeResult::Correct, format!("Both formatted as {expected_tag}"))
        } else {
            (
                DtypeResult::Wrong,
                format!("Expected {expected_tag} format but found {actual_tag}"),
            )
        }
    };

    let norm_expected = normalize(expected, options.whitespace);
    let norm_actual = normalize(actual, options.whitespace);
    let (value, value_reason) = if canonical_eq(&norm_expected, &norm_actual) {
        (ValueResult::Correct, "Values match".to_string())
    } else {
        (
            ValueResult::Wrong,
            mismatch_reason(expected, actual, &norm_expected, &norm_actual, options.reasons),
        )
    };

    Verdict::new(
        sheet,
        cell,
        field,
        expected.to_string(),
        actual.to_string(),
        dtype,
        dtype_reason,
        value,
        value_reason,
    )
}

fn mismatch_reason(
    expected: &CellValue,
    actual: &CellValue,
    norm_expected: &CellValue,
    norm_actual: &CellValue,
    style: ReasonStyle,
) -> String {
    let expected = quote(expected);
    if actual.is_blank() {
        return format!("Value missing: expected '{expected}' but the cell is empty");
    }
    let actual = quote(actual);
    let base = format!("Value mismatch: expected '{expected}' but found '{actual}'");
    if style == ReasonStyle::Hinted {
        if let (CellValue::String(a), CellValue::String(b)) = (norm_expected, norm_actual) {
            let similarity = jaro_winkler(a, b);
            if similarity >= SPELLING_HINT_THRESHOLD {
                return format!("{base} (possible spelling mistake, {:.0}% similar)", similarity * 100.0);
            }
        }
    }
    base
}
