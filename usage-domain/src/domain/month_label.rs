use std::fmt;

use time::{Date, Month};

const ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Month bucket for a read date, rendered as `%b%y` (e.g. `Nov24`).
///
/// Only the two-digit year is kept, so labels compare the way their text does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthLabel {
    yy: u8,
    month: u8,
}

impl MonthLabel {
    pub fn new(year: i32, month: Month) -> Self {
        Self {
            yy: year.rem_euclid(100) as u8,
            month: month as u8,
        }
    }

    pub fn from_date(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn month(&self) -> Month {
        Month::try_from(self.month).unwrap_or(Month::January)
    }

    pub fn two_digit_year(&self) -> u8 {
        self.yy
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abbrev = ABBREVIATIONS[usize::from(self.month) - 1];
        write!(f, "{abbrev}{:02}", self.yy)
    }
}

/// Canonical, ordered sequence of month columns kept in the monthly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    start_year: i32,
    start_month: Month,
    months: usize,
}

impl Default for MonthWindow {
    /// Nov24 through Oct25.
    fn default() -> Self {
        Self::new(2024, Month::November, 12)
    }
}

impl MonthWindow {
    pub fn new(start_year: i32, start_month: Month, months: usize) -> Self {
        Self {
            start_year,
            start_month,
            months,
        }
    }

    pub fn labels(&self) -> Vec<MonthLabel> {
        let mut year = self.start_year;
        let mut month = self.start_month;

        (0..self.months)
            .map(|_| {
                let label = MonthLabel::new(year, month);
                if month == Month::December {
                    year += 1;
                }
                month = month.next();
                label
            })
            .collect()
    }
}
