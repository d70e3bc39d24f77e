use serde::Serialize;

use crate::error::Result;
use crate::settings::{load_settings, settings_file_exists, settings_path};

/// Render a settings enum the way it is stored on disk.
fn stored<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let path = settings_path();

    if settings_file_exists() {
        println!("Settings:      {}", path.display());
    } else {
        println!("Settings:      {} (not found, using defaults)", path.display());
    }
    println!();
    println!("Sheet policy:  {}", stored(&settings.sheet_policy));
    println!("Whitespace:    {}", stored(&settings.whitespace));
    println!("Reasons:       {}", stored(&settings.reasons));
    println!("Header row:    {}", settings.header_row);
    println!("Report dir:    {}", settings.report_dir);
    Ok(())
}
