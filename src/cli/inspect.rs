use std::fs::File;
use std::io::Read;
use std::path::Path;

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::format_bytes;

pub fn run(package: &str) -> Result<()> {
    let path = Path::new(package);
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;

    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();

    let mut table = Table::new();
    table.set_header(vec!["Entry", "Rows", "Size"]);
    for name in &names {
        let mut entry = archive.by_name(name)?;
        let size = entry.size();
        let rows = if name.ends_with(".csv") {
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            // Header row doesn't count.
            fmt_rows(content.lines().count())
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(rows),
            Cell::new(format_bytes(size)),
        ]);
    }

    println!("{} ({} entries)\n{table}", path.display(), names.len());
    Ok(())
}

fn fmt_rows(lines: usize) -> String {
    lines.saturating_sub(1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_count_excludes_the_header() {
        assert_eq!(fmt_rows(0), "0");
        assert_eq!(fmt_rows(1), "0");
        assert_eq!(fmt_rows(4), "3");
    }
}
