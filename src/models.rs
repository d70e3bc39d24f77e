use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// A resolved cell value as read from a workbook. Formula text is never
/// stored; formula cells carry their cached result.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Null or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

/// Coarse semantic type derived from a cell's display-format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormatTag {
    General,
    Accounting,
    Date,
    Percentage,
    Currency,
    Numeric,
    Text,
    Other,
}

impl FormatTag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Accounting => "Accounting",
            Self::Date => "Date",
            Self::Percentage => "Percentage",
            Self::Currency => "Currency",
            Self::Numeric => "Numeric",
            Self::Text => "Text",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DtypeResult {
    Correct,
    Wrong,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl DtypeResult {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Correct => "CORRECT",
            Self::Wrong => "WRONG",
            Self::NotApplicable => "N/A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueResult {
    Correct,
    Wrong,
}

impl ValueResult {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Correct => "RIGHT",
            Self::Wrong => "WRONG",
        }
    }
}

/// Outcome of comparing one template coordinate against the output.
/// Fields are private so a verdict cannot change once recorded.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    sheet: String,
    cell: String,
    field: String,
    expected: String,
    test: String,
    dtype: DtypeResult,
    dtype_reason: String,
    value: ValueResult,
    value_reason: String,
}

impl Verdict {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sheet: &str,
        cell: String,
        field: String,
        expected: String,
        test: String,
        dtype: DtypeResult,
        dtype_reason: String,
        value: ValueResult,
        value_reason: String,
    ) -> Self {
        Self {
            sheet: sheet.to_string(),
            cell,
            field,
            expected,
            test,
            dtype,
            dtype_reason,
            value,
            value_reason,
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }
    pub fn cell(&self) -> &str {
        &self.cell
    }
    pub fn field(&self) -> &str {
        &self.field
    }
    pub fn expected(&self) -> &str {
        &self.expected
    }
    pub fn test(&self) -> &str {
        &self.test
    }
    pub fn dtype(&self) -> DtypeResult {
        self.dtype
    }
    pub fn dtype_reason(&self) -> &str {
        &self.dtype_reason
    }
    pub fn value(&self) -> ValueResult {
        self.value
    }
    pub fn value_reason(&self) -> &str {
        &self.value_reason
    }

    /// True when nothing about this cell was flagged.
    pub fn is_clean(&self) -> bool {
        self.value == ValueResult::Correct && self.dtype != DtypeResult::Wrong
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetVerdicts {
    pub sheet: String,
    pub verdicts: Vec<Verdict>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetWarning {
    pub sheet: String,
    pub reason: String,
}

/// All verdicts of one run, grouped by sheet in template order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationResult {
    pub sheets: Vec<SheetVerdicts>,
    pub warnings: Vec<SheetWarning>,
    pub cancelled: bool,
}

impl ReconciliationResult {
    pub fn sheet(&self, name: &str) -> Option<&[Verdict]> {
        self.sheets
            .iter()
            .find(|s| s.sheet == name)
            .map(|s| s.verdicts.as_slice())
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.sheet.as_str()).collect()
    }

    /// Flat verdict list in ledger order.
    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.sheets.iter().flat_map(|s| s.verdicts.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.iter().all(|s| s.verdicts.is_empty())
    }
}
