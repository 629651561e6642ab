use comfy_table::Table;

use crate::error::Result;
use crate::sources::ALL_SOURCES;

pub fn run() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Name", "Input files"]);
    for source in ALL_SOURCES {
        table.add_row(vec![
            source.key().to_string(),
            source.name().to_string(),
            source.input_files().join(", "),
        ]);
    }
    println!("Supported source systems\n{table}");
    Ok(())
}
