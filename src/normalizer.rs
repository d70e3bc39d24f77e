use std::sync::OnceLock;

use regex::Regex;

use crate::models::CellValue;
use crate::settings::WhitespaceRule;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn clean_text(raw: &str, rule: WhitespaceRule) -> String {
    let lowered = raw.trim().to_lowercase();
    match rule {
        WhitespaceRule::Trim => lowered,
        WhitespaceRule::Collapse => whitespace_re().replace_all(&lowered, "").into_owned(),
    }
}

/// Canonical comparable form of a cell value. Non-text values pass through;
/// text is cleaned and then parsed as a number when it looks like one.
pub fn normalize(value: &CellValue, rule: WhitespaceRule) -> CellValue {
    let CellValue::String(raw) = value else {
        return value.clone();
    };
    let cleaned = clean_text(raw, rule);
    if cleaned.contains('.') {
        if let Ok(n) = cleaned.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Float(n);
            }
        }
    } else if let Ok(i) = cleaned.parse::<i64>() {
        return CellValue::Int(i);
    }
    CellValue::String(cleaned)
}

/// Equality of already-normalized values. Ints and floats compare numerically.
pub fn canonical_eq(a: &CellValue, b: &CellValue) -> bool {
    match (a, b) {
        (CellValue::Int(x), CellValue::Float(y)) | (CellValue::Float(y), CellValue::Int(x)) => {
            (*x as f64) == *y
        }
        _ => a == b,
    }
}
