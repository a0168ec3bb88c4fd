use time::PrimitiveDateTime;

use crate::error::SchemaError;

/// A single spreadsheet value as loaded from the input file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    DateTime(PrimitiveDateTime),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Text is accepted when it parses as a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Cell::Int(i) => *i as f64,
            Cell::Float(f) => *f,
            Cell::Text(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// The first sheet of an input workbook: header row plus data rows.
///
/// Rows may be shorter than the header; missing trailing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact, case-sensitive header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve every name in `names`, or report all of the missing ones at once.
    pub fn require(&self, names: &[&str]) -> Result<Vec<usize>, SchemaError> {
        let mut indices = Vec::with_capacity(names.len());
        let mut missing = Vec::new();

        for name in names {
            match self.column(name) {
                Some(idx) => indices.push(idx),
                None => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(SchemaError { missing })
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["Premise".to_string(), "READ DATE HIST".to_string()],
            vec![vec![Cell::Int(1)]],
        )
    }

    #[test]
    fn column_lookup_is_exact_and_case_sensitive() {
        let t = table();
        assert_eq!(t.column("READ DATE HIST"), Some(1));
        assert_eq!(t.column("read date hist"), None);
        assert_eq!(t.column("READ  DATE HIST"), None);
    }

    #[test]
    fn require_lists_every_missing_column_in_request_order() {
        let t = table();
        let err = t.require(&["AcctNum", "Premise", "MeterNum"]).unwrap_err();
        assert_eq!(err.missing, vec!["AcctNum".to_string(), "MeterNum".to_string()]);
        assert_eq!(err.to_string(), r#"missing required columns: ["AcctNum", "MeterNum"]"#);
    }

    #[test]
    fn short_rows_read_as_empty() {
        let t = table();
        assert_eq!(t.cell(0, 0), &Cell::Int(1));
        assert!(t.cell(0, 1).is_empty());
        assert!(t.cell(5, 0).is_empty());
    }

    #[test]
    fn numeric_view_rejects_non_finite_and_free_text() {
        assert_eq!(Cell::Text(" 12.5 ".to_string()).as_f64(), Some(12.5));
        assert_eq!(Cell::Text("NaN".to_string()).as_f64(), None);
        assert_eq!(Cell::Text("n/a".to_string()).as_f64(), None);
        assert_eq!(Cell::Bool(true).as_f64(), None);
    }
}
