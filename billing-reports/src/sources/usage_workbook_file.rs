use std::path::PathBuf;

use calamine::{open_workbook_auto, Data, Reader};
use usage_domain::{
    domain::{from_excel_serial, parse_read_date},
    Cell, Table,
};

use crate::pipeline::{PipelineError, Source};

/// Spreadsheet source for the billing export.
///
/// Reads the first worksheet; its first row is the header.
pub struct UsageWorkbookFileSource {
    path: PathBuf,
}

impl UsageWorkbookFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn header_name(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => from_excel_serial(dt.as_f64())
            .map(Cell::DateTime)
            .unwrap_or(Cell::Empty),
        Data::DateTimeIso(s) => {
            let text = Cell::Text(s.clone());
            parse_read_date(&text).map(Cell::DateTime).unwrap_or(text)
        }
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

impl Source for UsageWorkbookFileSource {
    fn load(&self) -> Result<Table, PipelineError> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| PipelineError::Source(format!("failed to open workbook: {e}")))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| PipelineError::Source("workbook has no worksheets".to_string()))?
            .map_err(|e| PipelineError::Source(format!("failed to read first worksheet: {e}")))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(header_name).collect(),
            None => Vec::new(),
        };
        let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(data_to_cell).collect()).collect();

        tracing::debug!(path = %self.path.display(), rows = rows.len(), "workbook loaded");

        Ok(Table::new(headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn workbook_cells_map_to_table_cells() {
        assert_eq!(data_to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(data_to_cell(&Data::Float(12.5)), Cell::Float(12.5));
        assert_eq!(
            data_to_cell(&Data::String("ACTIVE".to_string())),
            Cell::Text("ACTIVE".to_string())
        );
        assert_eq!(
            data_to_cell(&Data::DateTimeIso("2024-11-05T00:00:00".to_string())),
            Cell::DateTime(datetime!(2024-11-05 00:00:00))
        );
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let source = UsageWorkbookFileSource::new("does-not-exist.xlsx");
        assert!(matches!(source.load(), Err(PipelineError::Source(_))));
    }
}
