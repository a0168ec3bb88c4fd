use std::path::PathBuf;

use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, XlsxError};
use usage_domain::{domain::to_excel_serial, Cell};

use crate::{
    pipeline::{PipelineError, Sink},
    sinks::{Sheet, ToSheets},
};

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
// Pinned creation date keeps repeated runs byte-identical.
const CREATED: (u16, u8, u8) = (2024, 11, 1);

/// Writes every sheet of a report into a single workbook.
pub struct XlsxReportSink {
    path: PathBuf,
}

impl XlsxReportSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn write_workbook(&self, sheets: &[Sheet]) -> Result<(), XlsxError> {
        let (year, month, day) = CREATED;
        let created = ExcelDateTime::from_ymd(year, month, day)?;
        let mut workbook = Workbook::new();
        workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
        let date_format = Format::new().set_num_format(DATE_FORMAT);

        for sheet in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            for (col, header) in sheet.headers.iter().enumerate() {
                worksheet.write_string(0, col as u16, header)?;
            }

            for (idx, row) in sheet.rows.iter().enumerate() {
                let r = idx as u32 + 1;
                for (col, cell) in row.iter().enumerate() {
                    let c = col as u16;
                    match cell {
                        Cell::Empty => {}
                        Cell::Int(i) => {
                            worksheet.write_number(r, c, *i as f64)?;
                        }
                        Cell::Float(f) => {
                            worksheet.write_number(r, c, *f)?;
                        }
                        Cell::Text(s) => {
                            worksheet.write_string(r, c, s)?;
                        }
                        Cell::Bool(b) => {
                            worksheet.write_boolean(r, c, *b)?;
                        }
                        Cell::DateTime(dt) => {
                            worksheet.write_number_with_format(r, c, to_excel_serial(*dt), &date_format)?;
                        }
                    }
                }
            }
        }

        workbook.save(&self.path)
    }
}

impl<T: ToSheets> Sink<T> for XlsxReportSink {
    fn write(&self, output: &T) -> Result<(), PipelineError> {
        let sheets = output.to_sheets();
        self.write_workbook(&sheets).map_err(|e| {
            tracing::error!(error = %e, path = %self.path.display(), "xlsx write failed");
            PipelineError::Sink(e.to_string())
        })?;

        tracing::info!(
            path = %self.path.display(),
            sheets = sheets.len(),
            rows = sheets.iter().map(|s| s.rows.len()).sum::<usize>(),
            "workbook written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pipeline::Source, sources::UsageWorkbookFileSource};
    use time::macros::datetime;

    struct TwoSheets;

    impl ToSheets for TwoSheets {
        fn to_sheets(&self) -> Vec<Sheet> {
            vec![
                Sheet {
                    name: "Summary".to_string(),
                    headers: vec!["Premise".to_string(), "row_count".to_string()],
                    rows: vec![vec![Cell::Int(1), Cell::Int(3)]],
                },
                Sheet {
                    name: "Detail".to_string(),
                    headers: vec!["Premise".to_string(), "READ DATE HIST".to_string()],
                    rows: vec![vec![
                        Cell::Text("P-1".to_string()),
                        Cell::DateTime(datetime!(2024-11-05 00:00:00)),
                    ]],
                },
            ]
        }
    }

    #[test]
    fn same_report_twice_gives_identical_bytes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = dir.path().join("first.xlsx");
        let second = dir.path().join("second.xlsx");

        XlsxReportSink::new(&first).write(&TwoSheets).expect("write succeeds");
        std::thread::sleep(std::time::Duration::from_millis(1100));
        XlsxReportSink::new(&second).write(&TwoSheets).expect("write succeeds");

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn first_sheet_reads_back_through_the_workbook_source() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("report.xlsx");

        XlsxReportSink::new(&path).write(&TwoSheets).expect("write succeeds");

        let table = UsageWorkbookFileSource::new(&path).load().expect("read succeeds");
        assert_eq!(table.headers, vec!["Premise", "row_count"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 0).as_f64(), Some(1.0));
        assert_eq!(table.cell(0, 1).as_f64(), Some(3.0));
    }
}
