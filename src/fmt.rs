use std::borrow::Cow;

/// Largest column Excel addresses (XFD).
pub const MAX_COLUMN: u32 = 16_384;
pub const MAX_ROW: u32 = 1_048_576;
/// Most characters one worksheet cell may hold.
pub const MAX_CELL_TEXT: usize = 32_767;

/// Column letters for a 1-based index: 1 → A, 27 → AA.
pub fn column_letters(col: u32) -> Option<String> {
    if col == 0 || col > MAX_COLUMN {
        return None;
    }
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).ok()
}

/// A1-style address for a 1-based (row, col).
pub fn cell_address(row: u32, col: u32) -> Option<String> {
    if row == 0 || row > MAX_ROW {
        return None;
    }
    column_letters(col).map(|letters| format!("{letters}{row}"))
}

/// Format a percentage with the given precision: 97.5 → "97.50%"
pub fn percent(val: f64, decimals: usize) -> String {
    format!("{val:.decimals$}%")
}

/// Cut `text` to at most `max_chars` characters, ending in an ellipsis when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some(_) => {
            let keep = max_chars.saturating_sub(1);
            let end = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
            Cow::Owned(format!("{}…", &text[..end]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1).as_deref(), Some("A"));
        assert_eq!(column_letters(26).as_deref(), Some("Z"));
        assert_eq!(column_letters(27).as_deref(), Some("AA"));
        assert_eq!(column_letters(702).as_deref(), Some("ZZ"));
        assert_eq!(column_letters(703).as_deref(), Some("AAA"));
        assert_eq!(column_letters(16_384).as_deref(), Some("XFD"));
        assert_eq!(column_letters(0), None);
        assert_eq!(column_letters(16_385), None);
    }

    #[test]
    fn test_cell_address() {
        assert_eq!(cell_address(3, 2).as_deref(), Some("B3"));
        assert_eq!(cell_address(0, 2), None);
        assert_eq!(cell_address(MAX_ROW + 1, 1), None);
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(100.0, 2), "100.00%");
        assert_eq!(percent(66.666, 1), "66.7%");
        assert_eq!(percent(0.0, 1), "0.0%");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_text("abcdefghijk", 5), "abcd…");
        assert_eq!(truncate_text("ééééé", 3), "éé…");
        assert_eq!(truncate_text("x".repeat(40_000).as_str(), MAX_CELL_TEXT).chars().count(), MAX_CELL_TEXT);
    }
}
