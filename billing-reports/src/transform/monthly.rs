use std::collections::{BTreeMap, HashMap, HashSet};

use usage_domain::{
    domain::usage_record::{CYC, METER_NUM, PREMISE, READ_DATE_HIST, STATUS, USAGE_HIST},
    Cell, Ident, MonthLabel, MonthWindow, Table, UsageRecord,
};

use crate::{
    pipeline::{PipelineError, Transform},
    sinks::{Sheet, ToSheets},
};

pub const KEY_COLUMNS: [&str; 4] = [PREMISE, METER_NUM, STATUS, CYC];
pub const REQUIRED_COLUMNS: [&str; 6] = [PREMISE, METER_NUM, STATUS, CYC, READ_DATE_HIST, USAGE_HIST];

const SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub premise: Ident,
    pub meter_num: Ident,
    pub status: Ident,
    pub cyc: Ident,
}

impl GroupKey {
    fn of(record: &UsageRecord) -> Option<Self> {
        Some(Self {
            premise: record.premise.clone()?,
            meter_num: record.meter_num.clone()?,
            status: record.status.clone()?,
            cyc: record.cyc.clone()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub key: GroupKey,
    /// One value per entry of `MonthlyMatrix::months`.
    pub values: Vec<f64>,
}

/// Usage pivoted to one row per premise/meter/status/cycle and one column per month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyMatrix {
    pub months: Vec<MonthLabel>,
    pub rows: Vec<MatrixRow>,
    /// Keyed records with no usable read date.
    pub unparsed_dates: usize,
    /// Keyed records whose month falls outside the window; their usage is dropped.
    pub out_of_window: usize,
}

impl MonthlyMatrix {
    pub fn value(&self, key: &GroupKey, month: &str) -> Option<f64> {
        let col = self.months.iter().position(|m| m.to_string() == month)?;
        self.rows.iter().find(|r| &r.key == key).map(|r| r.values[col])
    }
}

/// Group by (Premise, MeterNum, Status, Cyc), sum usage per month label, and
/// keep only the labels of `window`, in window order.
pub fn aggregate(records: &[UsageRecord], window: &MonthWindow) -> MonthlyMatrix {
    let canonical = window.labels();
    let in_window: HashSet<MonthLabel> = canonical.iter().copied().collect();

    let mut groups: BTreeMap<GroupKey, HashMap<MonthLabel, f64>> = BTreeMap::new();
    let mut observed: HashSet<MonthLabel> = HashSet::new();
    let mut unkeyed = 0usize;
    let mut unparsed_dates = 0usize;
    let mut out_of_window = 0usize;
    let mut excluded_usage = 0.0;

    for record in records {
        let Some(key) = GroupKey::of(record) else {
            unkeyed += 1;
            continue;
        };
        let sums = groups.entry(key).or_default();

        let Some(label) = record.month_label() else {
            unparsed_dates += 1;
            tracing::debug!(row = record.row, "read date missing or unparseable");
            continue;
        };

        let usage = record.usage.unwrap_or(0.0);
        if !in_window.contains(&label) {
            out_of_window += 1;
            excluded_usage += usage;
            continue;
        }

        observed.insert(label);
        *sums.entry(label).or_insert(0.0) += usage;
    }

    if unkeyed > 0 {
        tracing::warn!(records = unkeyed, "records with an empty key column excluded");
    }
    if unparsed_dates > 0 {
        metrics::counter!("read_date_parse_failures_total").increment(unparsed_dates as u64);
        tracing::warn!(
            records = unparsed_dates,
            "records without a usable read date are not attributed to any month"
        );
    }
    if out_of_window > 0 {
        metrics::counter!("usage_out_of_window_records_total").increment(out_of_window as u64);
        tracing::warn!(
            records = out_of_window,
            usage = excluded_usage,
            "usage outside the month window dropped from output"
        );
    }

    let months: Vec<MonthLabel> = canonical.into_iter().filter(|m| observed.contains(m)).collect();

    let rows = groups
        .into_iter()
        .map(|(key, sums)| MatrixRow {
            values: months
                .iter()
                .map(|m| sums.get(m).copied().unwrap_or(0.0))
                .collect(),
            key,
        })
        .collect();

    MonthlyMatrix {
        months,
        rows,
        unparsed_dates,
        out_of_window,
    }
}

impl ToSheets for MonthlyMatrix {
    fn to_sheets(&self) -> Vec<Sheet> {
        let headers = KEY_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.months.iter().map(ToString::to_string))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                [&row.key.premise, &row.key.meter_num, &row.key.status, &row.key.cyc]
                    .into_iter()
                    .map(Ident::to_cell)
                    .chain(row.values.iter().map(|v| Cell::Float(*v)))
                    .collect()
            })
            .collect();

        vec![Sheet {
            name: SHEET_NAME.to_string(),
            headers,
            rows,
        }]
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonthlyUsageTransform {
    window: MonthWindow,
}

impl MonthlyUsageTransform {
    pub fn new(window: MonthWindow) -> Self {
        Self { window }
    }
}

impl Transform for MonthlyUsageTransform {
    type Output = MonthlyMatrix;

    fn apply(&self, input: &Table) -> Result<MonthlyMatrix, PipelineError> {
        let records = UsageRecord::project(input, &REQUIRED_COLUMNS)?;
        let matrix = aggregate(&records, &self.window);
        tracing::info!(
            groups = matrix.rows.len(),
            months = matrix.months.len(),
            "monthly usage aggregated"
        );
        Ok(matrix)
    }
}
