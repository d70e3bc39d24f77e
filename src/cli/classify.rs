use comfy_table::{Cell, Table};

use crate::classifier::classify;
use crate::error::Result;

pub fn run(formats: &[String]) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Format", "Data Type"]);
    for f in formats {
        table.add_row(vec![Cell::new(f), Cell::new(classify(Some(f)))]);
    }
    println!("{table}");
    Ok(())
}
