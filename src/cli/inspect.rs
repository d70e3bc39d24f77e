use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Color, Table};

use crate::error::Result;
use crate::fmt::cell_address;
use crate::workbook::load_workbook;

pub fn run(file: &str) -> Result<()> {
    let workbook = load_workbook(Path::new(file))?;

    let mut table = Table::new();
    table.set_header(vec!["Sheet", "Used Range", "Rows", "Columns", "Styled Cells", "Status"]);
    for entry in workbook.sheets() {
        match &entry.grid {
            Ok(grid) => {
                let range = if grid.max_row() == 0 {
                    "(empty)".to_string()
                } else {
                    cell_address(grid.max_row(), grid.max_col())
                        .map(|end| format!("A1:{end}"))
                        .unwrap_or_else(|| "(out of bounds)".to_string())
                };
                table.add_row(vec![
                    Cell::new(&entry.name),
                    Cell::new(range),
                    Cell::new(grid.max_row()),
                    Cell::new(grid.max_col()),
                    Cell::new(grid.styled_cells()),
                    Cell::new("ok").fg(Color::Green),
                ]);
            }
            Err(reason) => {
                table.add_row(vec![
                    Cell::new(&entry.name),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(format!("unreadable: {reason}")).fg(Color::Red),
                ]);
            }
        }
    }

    println!("{}\n{table}", file.bold());
    Ok(())
}
