use std::path::{Path, PathBuf};

use time::{format_description::BorrowedFormatItem, macros::format_description};
use usage_domain::Cell;

use crate::{
    pipeline::{PipelineError, Sink},
    sinks::{Sheet, ToSheets},
};

const DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// CSV output. A single-sheet report is written to the given path; a
/// multi-sheet report becomes one `<stem>_<sheet>.csv` file per sheet.
pub struct CsvReportSink {
    path: PathBuf,
}

impl CsvReportSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Where each sheet lands, in sheet order.
    pub fn sheet_paths(&self, sheets: &[Sheet]) -> Vec<PathBuf> {
        if sheets.len() == 1 {
            return vec![self.path.clone()];
        }

        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        sheets
            .iter()
            .map(|sheet| self.path.with_file_name(format!("{stem}_{}.csv", sheet.name)))
            .collect()
    }
}

fn cell_to_field(cell: &Cell) -> Result<String, PipelineError> {
    Ok(match cell {
        Cell::Empty => String::new(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Text(s) => s.clone(),
        Cell::Bool(b) => b.to_string(),
        Cell::DateTime(dt) => dt
            .format(DATE_TIME)
            .map_err(|e| PipelineError::Sink(format!("failed to format date: {e}")))?,
    })
}

/// Staging file in the same directory as the final path.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn discard(staged: &[PathBuf]) {
    for path in staged {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, path = %path.display(), "failed to remove staged CSV"),
        }
    }
}

fn write_sheet(path: &Path, sheet: &Sheet) -> Result<(), PipelineError> {
    let sink_err = |e: csv::Error| PipelineError::Sink(format!("failed to write {}: {e}", path.display()));

    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(sink_err)?;
    wtr.write_record(&sheet.headers).map_err(sink_err)?;
    for row in &sheet.rows {
        let fields = row.iter().map(cell_to_field).collect::<Result<Vec<_>, _>>()?;
        wtr.write_record(&fields).map_err(sink_err)?;
    }
    wtr.flush()
        .map_err(|e| PipelineError::Sink(format!("failed to flush {}: {e}", path.display())))
}

impl<T: ToSheets> Sink<T> for CsvReportSink {
    fn write(&self, output: &T) -> Result<(), PipelineError> {
        let sheets = output.to_sheets();
        let paths = self.sheet_paths(&sheets);

        // Nothing lands at a final path until every sheet has been written.
        let mut staged = Vec::with_capacity(paths.len());
        for (sheet, path) in sheets.iter().zip(&paths) {
            let tmp = staging_path(path);
            if let Err(e) = write_sheet(&tmp, sheet) {
                staged.push(tmp);
                discard(&staged);
                tracing::error!(error = %e, path = %path.display(), "CSV write failed");
                return Err(e);
            }
            staged.push(tmp);
        }

        for (idx, (sheet, path)) in sheets.iter().zip(&paths).enumerate() {
            if let Err(e) = std::fs::rename(&staged[idx], path) {
                discard(&staged[idx..]);
                return Err(PipelineError::Sink(format!("failed to move {}: {e}", path.display())));
            }
            tracing::info!(path = %path.display(), rows = sheet.rows.len(), "CSV written");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sheet(name: &str, rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet {
            name: name.to_string(),
            headers: vec!["Premise".to_string(), "READ DATE HIST".to_string()],
            rows,
        }
    }

    struct Report(Vec<Sheet>);

    impl ToSheets for Report {
        fn to_sheets(&self) -> Vec<Sheet> {
            self.0.clone()
        }
    }

    #[test]
    fn multi_sheet_reports_split_into_one_file_per_sheet() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sink = CsvReportSink::new(dir.path().join("Premise_Conflicts.csv"));
        let report = Report(vec![
            sheet("Summary", vec![vec![Cell::Int(1), Cell::Empty]]),
            sheet(
                "Detail",
                vec![vec![Cell::Int(1), Cell::DateTime(datetime!(2024-11-05 00:00:00))]],
            ),
        ]);

        sink.write(&report).expect("write succeeds");

        let detail = std::fs::read_to_string(dir.path().join("Premise_Conflicts_Detail.csv")).unwrap();
        assert_eq!(detail, "Premise,READ DATE HIST\n1,2024-11-05 00:00:00\n");
        assert!(dir.path().join("Premise_Conflicts_Summary.csv").exists());
        assert!(!dir.path().join("Premise_Conflicts.csv").exists());
    }

    #[test]
    fn single_sheet_reports_use_the_given_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("usage.csv");
        let sink = CsvReportSink::new(&path);

        sink.write(&Report(vec![sheet("Sheet1", vec![vec![Cell::Float(15.0), Cell::Empty]])]))
            .expect("write succeeds");

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Premise,READ DATE HIST\n15,\n");
    }

    #[test]
    fn failed_sheet_leaves_no_partial_output() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sink = CsvReportSink::new(dir.path().join("Premise_Conflicts.csv"));
        let report = Report(vec![
            sheet("Summary", vec![vec![Cell::Int(1), Cell::Empty]]),
            sheet("missing/Detail", vec![vec![Cell::Int(1), Cell::Empty]]),
        ]);

        let err = sink.write(&report).unwrap_err();

        assert!(matches!(err, PipelineError::Sink(_)));
        let left: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(left.is_empty(), "unexpected files: {left:?}");
    }

    #[test]
    fn staging_file_sits_beside_the_target() {
        assert_eq!(
            staging_path(Path::new("out/usage.csv")),
            PathBuf::from("out/usage.csv.tmp")
        );
    }
}
