use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};

/// Which sheets take part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SheetPolicy {
    /// Every template sheet; sheets missing from the output are reported cell by cell.
    Template,
    /// Only sheets present in both workbooks.
    Intersection,
}

/// How whitespace inside text cells is cleaned before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WhitespaceRule {
    /// Trim leading and trailing whitespace only.
    Trim,
    /// Remove every whitespace run, including interior ones.
    Collapse,
}

/// How much detail goes into value-mismatch reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReasonStyle {
    Basic,
    /// Adds a spelling-mistake hint when two strings are nearly identical.
    Hinted,
}

pub const DEFAULT_HEADER_ROW: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_sheet_policy")]
    pub sheet_policy: SheetPolicy,
    #[serde(default = "default_whitespace")]
    pub whitespace: WhitespaceRule,
    #[serde(default = "default_reasons")]
    pub reasons: ReasonStyle,
    #[serde(default = "default_header_row")]
    pub header_row: u32,
    #[serde(default = "default_report_dir_string")]
    pub report_dir: String,
}

fn default_sheet_policy() -> SheetPolicy {
    SheetPolicy::Template
}

fn default_whitespace() -> WhitespaceRule {
    WhitespaceRule::Collapse
}

fn default_reasons() -> ReasonStyle {
    ReasonStyle::Basic
}

fn default_header_row() -> u32 {
    DEFAULT_HEADER_ROW
}

fn default_report_dir_string() -> String {
    default_report_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sheet_policy: default_sheet_policy(),
            whitespace: default_whitespace(),
            reasons: default_reasons(),
            header_row: default_header_row(),
            report_dir: default_report_dir_string(),
        }
    }
}

impl Settings {
    pub fn options(&self) -> ReconOptions {
        ReconOptions {
            sheet_policy: self.sheet_policy,
            whitespace: self.whitespace,
            reasons: self.reasons,
            header_row: self.header_row.max(1),
        }
    }
}

/// Engine-facing configuration for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconOptions {
    pub sheet_policy: SheetPolicy,
    pub whitespace: WhitespaceRule,
    pub reasons: ReasonStyle,
    pub header_row: u32,
}

impl Default for ReconOptions {
    fn default() -> Self {
        Settings::default().options()
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("sheetrecon")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_report_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("sheetrecon")
        .join("reports")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ReconError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            sheet_policy: SheetPolicy::Intersection,
            whitespace: WhitespaceRule::Trim,
            reasons: ReasonStyle::Hinted,
            header_row: 5,
            report_dir: "/tmp/reports".to_string(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.sheet_policy, SheetPolicy::Intersection);
        assert_eq!(loaded.whitespace, WhitespaceRule::Trim);
        assert_eq!(loaded.reasons, ReasonStyle::Hinted);
        assert_eq!(loaded.header_row, 5);
        assert_eq!(loaded.report_dir, "/tmp/reports");
    }

    #[test]
    fn test_defaults_are_canonical_variant() {
        let s = Settings::default();
        assert_eq!(s.sheet_policy, SheetPolicy::Template);
        assert_eq!(s.whitespace, WhitespaceRule::Collapse);
        assert_eq!(s.reasons, ReasonStyle::Basic);
        assert_eq!(s.header_row, 3);
        assert!(!s.report_dir.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"sheet_policy": "intersection"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.sheet_policy, SheetPolicy::Intersection);
        assert_eq!(s.whitespace, WhitespaceRule::Collapse);
        assert_eq!(s.header_row, 3);
    }

    #[test]
    fn test_options_clamp_header_row() {
        let s = Settings { header_row: 0, ..Settings::default() };
        assert_eq!(s.options().header_row, 1);
    }
}
