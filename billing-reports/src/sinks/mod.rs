pub mod csv_file;
pub mod xlsx_file;

use std::path::{Path, PathBuf};

use usage_domain::Cell;

use crate::{
    pipeline::{PipelineError, Sink},
    sources::extension,
};

pub use csv_file::CsvReportSink;
pub use xlsx_file::XlsxReportSink;

/// One named output sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Reports that can be laid out as one or more sheets.
pub trait ToSheets {
    fn to_sheets(&self) -> Vec<Sheet>;
}

/// Output file, dispatched on extension.
pub enum ReportFileSink {
    Xlsx(XlsxReportSink),
    Csv(CsvReportSink),
}

impl ReportFileSink {
    /// Validates the output format up front so a bad path fails before any work.
    pub fn create<P: Into<PathBuf>>(path: P) -> Result<Self, PipelineError> {
        let path = path.into();
        match extension(&path).as_deref() {
            Some("xlsx") => Ok(Self::Xlsx(XlsxReportSink::new(path))),
            Some("csv") => Ok(Self::Csv(CsvReportSink::new(path))),
            _ => Err(PipelineError::Sink(format!(
                "unsupported output format: {}",
                path.display()
            ))),
        }
    }
}

impl<T: ToSheets> Sink<T> for ReportFileSink {
    fn write(&self, output: &T) -> Result<(), PipelineError> {
        match self {
            Self::Xlsx(s) => s.write(output),
            Self::Csv(s) => s.write(output),
        }
    }
}

/// Absolute form of an output path for the run summary.
pub fn resolve_output_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dispatches_on_extension() {
        assert!(matches!(
            ReportFileSink::create("out.xlsx"),
            Ok(ReportFileSink::Xlsx(_))
        ));
        assert!(matches!(
            ReportFileSink::create("out.CSV"),
            Ok(ReportFileSink::Csv(_))
        ));
        assert!(matches!(
            ReportFileSink::create("out.xls"),
            Err(PipelineError::Sink(_))
        ));
    }

    #[test]
    fn resolved_paths_are_absolute() {
        assert!(resolve_output_path(Path::new("not-written-yet.xlsx")).is_absolute());
    }
}
