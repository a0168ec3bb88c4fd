pub mod ident;
pub mod month_label;
pub mod read_date;
pub mod usage_record;

pub use ident::Ident;
pub use month_label::{MonthLabel, MonthWindow};
pub use read_date::{from_excel_serial, parse_read_date, to_excel_serial};
pub use usage_record::UsageRecord;
