pub mod domain;
pub mod error;
pub mod table;

pub use domain::{Ident, MonthLabel, MonthWindow, UsageRecord};
pub use error::SchemaError;
pub use table::{Cell, Table};
