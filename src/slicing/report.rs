use prettytable::{format, Cell, Row, Table};

use super::export::PlannedSlice;

/// Table of every slice with its output file and geometry
#[derive(Debug)]
pub struct SliceReport<'a> {
    slices: &'a [PlannedSlice],
}

impl<'a> SliceReport<'a> {
    pub fn new(slices: &'a [PlannedSlice]) -> Self {
        Self { slices }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        table.set_titles(Row::new(vec![
            Cell::new("#"),
            Cell::new("File"),
            Cell::new("X"),
            Cell::new("Y"),
            Cell::new("Width"),
            Cell::new("Height"),
        ]));

        for slice in self.slices {
            let filename = slice
                .path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| slice.path.display().to_string());

            table.add_row(Row::new(vec![
                Cell::new(&slice.index.to_string()),
                Cell::new(&filename),
                Cell::new(&slice.rect.x.to_string()),
                Cell::new(&slice.rect.y.to_string()),
                Cell::new(&slice.rect.width.to_string()),
                Cell::new(&slice.rect.height.to_string()),
            ]));
        }

        table
    }

    /// Print the report to stdout
    pub fn print(&self) {
        println!("\nSLICES ({} total)\n", self.slices.len());
        self.to_table().printstd();
        println!();
    }
}
