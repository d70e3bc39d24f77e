//! Number-format extraction for XLSX archives.
//!
//! calamine resolves values but does not expose display formats, so the
//! format code of every styled cell is read straight from the package:
//! `xl/styles.xml` gives numFmts and cellXfs, `xl/workbook.xml` plus its rels
//! give the worksheet part for each sheet name, and each worksheet gives the
//! `s` (style index) attribute per cell.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::Event;
use quick_xml::{Decoder, Reader};
use zip::ZipArchive;

/// Format codes for one sheet, keyed by 1-based (row, col).
#[derive(Debug, Clone, Default)]
pub struct SheetFormats {
    cells: HashMap<(u32, u32), String>,
    default_code: Option<String>,
}

impl SheetFormats {
    pub fn new(cells: HashMap<(u32, u32), String>, default_code: Option<String>) -> Self {
        Self { cells, default_code }
    }

    /// Format code for a cell; unstyled cells take the workbook default.
    pub fn get(&self, row: u32, col: u32) -> Option<&str> {
        self.cells
            .get(&(row, col))
            .map(String::as_str)
            .or(self.default_code.as_deref())
    }

    /// Cells carrying an explicit format other than General.
    pub fn styled_cells(&self) -> usize {
        self.cells
            .values()
            .filter(|code| !code.eq_ignore_ascii_case("general"))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Built-in number formats (ECMA-376 Part 1, 18.8.30)
// ---------------------------------------------------------------------------

pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        5 => "\"$\"#,##0_);(\"$\"#,##0)",
        6 => "\"$\"#,##0_);[Red](\"$\"#,##0)",
        7 => "\"$\"#,##0.00_);(\"$\"#,##0.00)",
        8 => "\"$\"#,##0.00_);[Red](\"$\"#,##0.00)",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0_);(#,##0)",
        38 => "#,##0_);[Red](#,##0)",
        39 => "#,##0.00_);(#,##0.00)",
        40 => "#,##0.00_);[Red](#,##0.00)",
        41 => r#"_(* #,##0_);_(* \(#,##0\);_(* "-"_);_(@_)"#,
        42 => r#"_("$"* #,##0_);_("$"* \(#,##0\);_("$"* "-"_);_(@_)"#,
        43 => r#"_(* #,##0.00_);_(* \(#,##0.00\);_(* "-"??_);_(@_)"#,
        44 => r#"_("$"* #,##0.00_);_("$"* \(#,##0.00\);_("$"* "-"??_);_(@_)"#,
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

// ---------------------------------------------------------------------------
// styles.xml
// ---------------------------------------------------------------------------

/// Attribute value with entity and character references resolved.
fn attr_text(attr: &Attribute<'_>, decoder: Decoder) -> Option<String> {
    attr.decode_and_unescape_value(decoder).ok().map(Cow::into_owned)
}

fn attr_u32(value: &[u8]) -> Option<u32> {
    std::str::from_utf8(value).ok().and_then(|s| s.parse().ok())
}

/// Parse `<numFmts>` into numFmtId → formatCode.
fn parse_num_fmts(xml: &str) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let decoder = reader.decoder();
    let mut buf = Vec::new();
    let mut in_num_fmts = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"numFmts" => {
                in_num_fmts = true;
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"numFmts" => break,
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_num_fmts && e.local_name().as_ref() == b"numFmt" =>
            {
                let mut id = None;
                let mut code = None;
                for attr in e.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"numFmtId" => id = attr_u32(&attr.value),
                        b"formatCode" => code = attr_text(&attr, decoder),
                        _ => {}
                    }
                }
                if let (Some(id), Some(code)) = (id, code) {
                    map.insert(id, code);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    map
}

/// Parse `<cellXfs>` into the numFmtId of each xf, in index order.
fn parse_cell_xf_num_fmts(xml: &str) -> Vec<u32> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = true;
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"cellXfs" => break,
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_cell_xfs && e.local_name().as_ref() == b"xf" =>
            {
                let num_fmt_id = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.local_name().as_ref() == b"numFmtId")
                    .and_then(|a| attr_u32(&a.value))
                    .unwrap_or(0);
                ids.push(num_fmt_id);
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    ids
}

/// Format code per cellXfs index.
pub fn parse_styles_xml(xml: &str) -> Vec<String> {
    let custom = parse_num_fmts(xml);
    parse_cell_xf_num_fmts(xml)
        .into_iter()
        .map(|id| {
            custom
                .get(&id)
                .cloned()
                .or_else(|| builtin_format_code(id).map(str::to_string))
                .unwrap_or_default()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Worksheet XML
// ---------------------------------------------------------------------------

/// Parse a cell reference like "B5" into 1-based (row, col) = (5, 2).
pub fn parse_cell_ref(r: &str) -> Option<(u32, u32)> {
    let split = r.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = r.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut col: u32 = 0;
    for ch in letters.chars() {
        col = col
            .checked_mul(26)?
            .checked_add(ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row, col))
}

/// Extract (row, col, style index) for every cell carrying an `s` attribute.
pub fn parse_sheet_styles(xml: &str) -> Vec<(u32, u32, usize)> {
    let mut cells = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"c" => {
                let mut style_id: Option<usize> = None;
                let mut cell_ref: Option<String> = None;
                for attr in e.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"s" => {
                            style_id = std::str::from_utf8(&attr.value)
                                .ok()
                                .and_then(|s| s.parse().ok());
                        }
                        b"r" => cell_ref = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }
                if let (Some(style_id), Some(cell_ref)) = (style_id, cell_ref) {
                    if let Some((row, col)) = parse_cell_ref(&cell_ref) {
                        cells.push((row, col, style_id));
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    cells
}

// ---------------------------------------------------------------------------
// Package navigation
// ---------------------------------------------------------------------------

fn read_zip_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String, String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| format!("'{path}' not found in XLSX: {e}"))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| format!("failed to read '{path}': {e}"))?;
    Ok(content)
}

/// Map each sheet name to its worksheet part path inside the archive.
pub fn resolve_worksheet_paths(workbook_xml: &str, rels_xml: &str) -> HashMap<String, String> {
    let mut name_to_rid: Vec<(String, String)> = Vec::new();
    let mut reader = Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);
    let decoder = reader.decoder();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rid = None;
                for attr in e.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"name" => name = attr_text(&attr, decoder),
                        b"id" => rid = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }
                if let (Some(name), Some(rid)) = (name, rid) {
                    name_to_rid.push((name, rid));
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    let mut rid_to_target: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let decoder = reader.decoder();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => target = attr_text(&attr, decoder),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rid_to_target.insert(id, target);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    name_to_rid
        .into_iter()
        .filter_map(|(name, rid)| {
            let target = rid_to_target.get(&rid)?;
            let path = match target.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None => format!("xl/{target}"),
            };
            Some((name, path))
        })
        .collect()
}

/// Read per-cell format codes for every worksheet of an XLSX file.
/// Sheets whose part cannot be located are absent from the map.
pub fn read_xlsx_formats(path: &Path) -> Result<HashMap<String, SheetFormats>, String> {
    let file = std::fs::File::open(path).map_err(|e| format!("failed to open for styles: {e}"))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| format!("failed to read XLSX as ZIP: {e}"))?;

    let codes = match read_zip_file(&mut archive, "xl/styles.xml") {
        Ok(xml) => parse_styles_xml(&xml),
        Err(_) => Vec::new(),
    };
    let default_code = codes.first().cloned();

    let workbook_xml = read_zip_file(&mut archive, "xl/workbook.xml")?;
    let rels_xml = read_zip_file(&mut archive, "xl/_rels/workbook.xml.rels")?;
    let paths = resolve_worksheet_paths(&workbook_xml, &rels_xml);

    let mut formats = HashMap::new();
    for (name, ws_path) in paths {
        let xml = match read_zip_file(&mut archive, &ws_path) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::debug!(sheet = %name, error = %e, "no worksheet part for styles");
                continue;
            }
        };
        let cells = parse_sheet_styles(&xml)
            .into_iter()
            .filter_map(|(row, col, style)| codes.get(style).map(|c| ((row, col), c.clone())))
            .collect();
        formats.insert(name, SheetFormats::new(cells, default_code.clone()));
    }
    Ok(formats)
}
