use std::fmt;

use crate::table::Cell;

/// Identifier value (premise, meter, account, status, cycle).
///
/// Integral numeric cells become `Number` so `1001` and `1001.0` group together;
/// everything else is compared as text. Numbers order before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ident {
    Number(i64),
    Text(String),
}

// Largest magnitude at which every integer is exactly representable in f64.
const MAX_EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

impl Ident {
    /// Empty cells carry no identity and yield `None`.
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Empty => None,
            Cell::Int(i) => Some(Ident::Number(*i)),
            Cell::Float(f) if f.is_nan() => None,
            Cell::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_F64_INT => {
                Some(Ident::Number(*f as i64))
            }
            Cell::Float(f) => Some(Ident::Text(f.to_string())),
            Cell::Text(s) if s.is_empty() => None,
            Cell::Text(s) => Some(Ident::Text(s.clone())),
            Cell::Bool(b) => Some(Ident::Text(b.to_string())),
            Cell::DateTime(dt) => Some(Ident::Text(dt.to_string())),
        }
    }

    pub fn to_cell(&self) -> Cell {
        match self {
            Ident::Number(n) => Cell::Int(*n),
            Ident::Text(s) => Cell::Text(s.clone()),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Number(n) => write!(f, "{n}"),
            Ident::Text(s) => f.write_str(s),
        }
    }
}
