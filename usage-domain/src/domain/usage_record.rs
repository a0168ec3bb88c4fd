use time::PrimitiveDateTime;

use crate::{
    domain::{ident::Ident, month_label::MonthLabel, read_date::parse_read_date},
    error::SchemaError,
    table::Table,
};

pub const PREMISE: &str = "Premise";
pub const METER_NUM: &str = "MeterNum";
pub const ACCT_NUM: &str = "AcctNum";
pub const STATUS: &str = "Status";
pub const CYC: &str = "Cyc";
pub const READ_DATE_HIST: &str = "READ DATE HIST";
pub const USAGE_HIST: &str = "USAGE HIST";

/// One meter read from the billing export.
///
/// Columns the caller did not require may be absent from the input; they
/// project to `None`. `row` points back at the source table row.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub row: usize,
    pub premise: Option<Ident>,
    pub meter_num: Option<Ident>,
    pub acct_num: Option<Ident>,
    pub status: Option<Ident>,
    pub cyc: Option<Ident>,
    pub read_date: Option<PrimitiveDateTime>,
    pub usage: Option<f64>,
}

impl UsageRecord {
    pub fn project(table: &Table, required: &[&str]) -> Result<Vec<UsageRecord>, SchemaError> {
        table.require(required)?;

        let premise = table.column(PREMISE);
        let meter_num = table.column(METER_NUM);
        let acct_num = table.column(ACCT_NUM);
        let status = table.column(STATUS);
        let cyc = table.column(CYC);
        let read_date = table.column(READ_DATE_HIST);
        let usage = table.column(USAGE_HIST);

        let ident = |row: usize, col: Option<usize>| col.and_then(|c| Ident::from_cell(table.cell(row, c)));

        let records = (0..table.len())
            .map(|row| UsageRecord {
                row,
                premise: ident(row, premise),
                meter_num: ident(row, meter_num),
                acct_num: ident(row, acct_num),
                status: ident(row, status),
                cyc: ident(row, cyc),
                read_date: read_date.and_then(|c| parse_read_date(table.cell(row, c))),
                usage: usage.and_then(|c| table.cell(row, c).as_f64()),
            })
            .collect();

        Ok(records)
    }

    pub fn month_label(&self) -> Option<MonthLabel> {
        self.read_date.map(|dt| MonthLabel::from_date(dt.date()))
    }
}
