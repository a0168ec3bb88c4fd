use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
};

use usage_domain::{
    domain::usage_record::{ACCT_NUM, METER_NUM, PREMISE},
    Cell, Ident, SchemaError, Table, UsageRecord,
};

use crate::{
    pipeline::{PipelineError, Transform},
    sinks::{Sheet, ToSheets},
};

pub const REQUIRED_COLUMNS: [&str; 3] = [ACCT_NUM, PREMISE, METER_NUM];
pub const SUMMARY_SHEET: &str = "Summary";
pub const DETAIL_SHEET: &str = "Detail";

const SUMMARY_COLUMNS: [&str; 4] = [PREMISE, "distinct_accts", "distinct_meters", "row_count"];

/// Per-premise counts. Empty account/meter cells are not counted as values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiseGroup {
    pub premise: Ident,
    pub distinct_accts: usize,
    pub distinct_meters: usize,
    pub row_count: usize,
}

impl PremiseGroup {
    pub fn is_conflicting(&self) -> bool {
        self.distinct_accts > 1 || self.distinct_meters > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictReport {
    /// Conflicting premises, ascending by premise.
    pub summary: Vec<PremiseGroup>,
    pub detail_headers: Vec<String>,
    /// Raw input rows of conflicting premises in detail order.
    pub detail: Vec<Vec<Cell>>,
}

#[derive(Default)]
struct Counts<'a> {
    accts: HashSet<&'a Ident>,
    meters: HashSet<&'a Ident>,
    rows: usize,
}

/// Groups ascending by premise. Records without a premise are skipped.
pub fn group_by_premise(records: &[UsageRecord]) -> Vec<PremiseGroup> {
    let mut groups: BTreeMap<&Ident, Counts<'_>> = BTreeMap::new();

    for record in records {
        let Some(premise) = record.premise.as_ref() else {
            continue;
        };
        let counts = groups.entry(premise).or_default();
        counts.rows += 1;
        if let Some(acct) = record.acct_num.as_ref() {
            counts.accts.insert(acct);
        }
        if let Some(meter) = record.meter_num.as_ref() {
            counts.meters.insert(meter);
        }
    }

    groups
        .into_iter()
        .map(|(premise, counts)| PremiseGroup {
            premise: premise.clone(),
            distinct_accts: counts.accts.len(),
            distinct_meters: counts.meters.len(),
            row_count: counts.rows,
        })
        .collect()
}

fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Premise, AcctNum, MeterNum, then read date; empty values sort last.
fn detail_order(a: &UsageRecord, b: &UsageRecord) -> Ordering {
    nulls_last(&a.premise, &b.premise)
        .then_with(|| nulls_last(&a.acct_num, &b.acct_num))
        .then_with(|| nulls_last(&a.meter_num, &b.meter_num))
        .then_with(|| nulls_last(&a.read_date, &b.read_date))
}

/// Find premises tied to more than one account or meter.
pub fn detect(table: &Table) -> Result<ConflictReport, SchemaError> {
    let records = UsageRecord::project(table, &REQUIRED_COLUMNS)?;

    let summary: Vec<PremiseGroup> = group_by_premise(&records)
        .into_iter()
        .filter(PremiseGroup::is_conflicting)
        .collect();

    let conflicting: HashSet<&Ident> = summary.iter().map(|g| &g.premise).collect();
    let mut selected: Vec<&UsageRecord> = records
        .iter()
        .filter(|r| r.premise.as_ref().is_some_and(|p| conflicting.contains(p)))
        .collect();
    // Stable, so complete ties keep input order.
    selected.sort_by(|a, b| detail_order(a, b));

    let width = table.headers.len();
    let detail = selected
        .into_iter()
        .map(|r| {
            let mut row = table.rows[r.row].clone();
            row.resize(width.max(row.len()), Cell::Empty);
            row
        })
        .collect();

    Ok(ConflictReport {
        summary,
        detail_headers: table.headers.clone(),
        detail,
    })
}

impl ToSheets for ConflictReport {
    fn to_sheets(&self) -> Vec<Sheet> {
        let summary_rows = self
            .summary
            .iter()
            .map(|g| {
                vec![
                    g.premise.to_cell(),
                    Cell::Int(g.distinct_accts as i64),
                    Cell::Int(g.distinct_meters as i64),
                    Cell::Int(g.row_count as i64),
                ]
            })
            .collect();

        vec![
            Sheet {
                name: SUMMARY_SHEET.to_string(),
                headers: SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect(),
                rows: summary_rows,
            },
            Sheet {
                name: DETAIL_SHEET.to_string(),
                headers: self.detail_headers.clone(),
                rows: self.detail.clone(),
            },
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConflictTransform;

impl Transform for ConflictTransform {
    type Output = ConflictReport;

    fn apply(&self, input: &Table) -> Result<ConflictReport, PipelineError> {
        let report = detect(input)?;
        metrics::counter!("premise_conflicts_total").increment(report.summary.len() as u64);
        tracing::info!(
            premises = report.summary.len(),
            detail_rows = report.detail.len(),
            "premise conflicts detected"
        );
        Ok(report)
    }
}
