pub mod usage_csv_file;
pub mod usage_workbook_file;

use std::path::{Path, PathBuf};

use usage_domain::Table;

use crate::pipeline::{PipelineError, Source};

pub use usage_csv_file::UsageCsvFileSource;
pub use usage_workbook_file::UsageWorkbookFileSource;

/// Input file, dispatched on extension.
pub enum UsageFileSource {
    Workbook(UsageWorkbookFileSource),
    Csv(UsageCsvFileSource),
}

impl UsageFileSource {
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, PipelineError> {
        let path = path.into();
        match extension(&path).as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => {
                Ok(Self::Workbook(UsageWorkbookFileSource::new(path)))
            }
            Some("csv") => Ok(Self::Csv(UsageCsvFileSource::new(path))),
            _ => Err(PipelineError::Source(format!(
                "unsupported input format: {}",
                path.display()
            ))),
        }
    }
}

impl Source for UsageFileSource {
    fn load(&self) -> Result<Table, PipelineError> {
        match self {
            Self::Workbook(s) => s.load(),
            Self::Csv(s) => s.load(),
        }
    }
}

pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
