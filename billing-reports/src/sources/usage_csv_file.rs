use std::path::PathBuf;

use usage_domain::{Cell, Table};

use crate::pipeline::{PipelineError, Source};

/// CSV variant of the billing export, same header names as the workbook.
///
/// Fields are typed per cell: integers, then floats, then text. Dates stay
/// text and are coerced when a component reads `READ DATE HIST`.
pub struct UsageCsvFileSource {
    path: PathBuf,
}

impl UsageCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn field_to_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Cell::Int(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Cell::Float(f),
        _ => Cell::Text(trimmed.to_string()),
    }
}

impl Source for UsageCsvFileSource {
    fn load(&self) -> Result<Table, PipelineError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| PipelineError::Source(format!("failed to open CSV file: {e}")))?;

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| PipelineError::Source(format!("failed to read CSV record: {e}")))?;
            rows.push(record.iter().map(field_to_cell).collect());
        }

        tracing::debug!(path = %self.path.display(), rows = rows.len(), "CSV loaded");

        Ok(Table::new(headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn fields_are_typed_per_cell() {
        assert_eq!(field_to_cell(""), Cell::Empty);
        assert_eq!(field_to_cell(" 1001 "), Cell::Int(1001));
        assert_eq!(field_to_cell("12.5"), Cell::Float(12.5));
        assert_eq!(field_to_cell("M-1"), Cell::Text("M-1".to_string()));
        assert_eq!(field_to_cell("  M-1 "), Cell::Text("M-1".to_string()));
        assert_eq!(field_to_cell("2024-11-05"), Cell::Text("2024-11-05".to_string()));
        assert_eq!(field_to_cell("nan"), Cell::Text("nan".to_string()));
    }

    #[test]
    fn loads_header_and_rows() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        writeln!(file, "Premise,MeterNum,READ DATE HIST,USAGE HIST").unwrap();
        writeln!(file, "1,A,2024-11-05,10").unwrap();
        writeln!(file, "2,B,,").unwrap();
        file.flush().unwrap();

        let table = UsageCsvFileSource::new(file.path()).load().expect("csv loads");
        assert_eq!(table.headers, vec!["Premise", "MeterNum", "READ DATE HIST", "USAGE HIST"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 3), &Cell::Int(10));
        assert!(table.cell(1, 2).is_empty());
    }
}
