use crate::models::FormatTag;

const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '₹'];
const DATE_TOKENS: [&str; 3] = ["yy", "mm", "dd"];

/// Map a display-format string to its coarse semantic tag.
///
/// Format strings overlap (a currency format also carries `#`, an accounting
/// format also carries `$`), so the checks below run in a fixed order and the
/// first hit wins.
pub fn classify(format: Option<&str>) -> FormatTag {
    let Some(raw) = format else {
        return FormatTag::General;
    };
    let f = raw.to_lowercase();
    if f.trim().is_empty() {
        return FormatTag::General;
    }
    if f.contains("_(") && f.contains('*') && f.contains(')') {
        return FormatTag::Accounting;
    }
    if DATE_TOKENS.iter().any(|t| f.contains(t)) {
        return FormatTag::Date;
    }
    if f.contains('%') {
        return FormatTag::Percentage;
    }
    if f.contains(CURRENCY_SYMBOLS) {
        return FormatTag::Currency;
    }
    if f.contains(['0', '#']) {
        return FormatTag::Numeric;
    }
    if f == "@" {
        return FormatTag::Text;
    }
    if f == "general" {
        return FormatTag::General;
    }
    FormatTag::Other
}
