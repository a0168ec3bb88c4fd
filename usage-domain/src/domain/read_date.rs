use time::{
    format_description::{
        well_known::{Iso8601, Rfc3339},
        BorrowedFormatItem,
    },
    macros::{datetime, format_description},
    Date, Duration, OffsetDateTime, PrimitiveDateTime,
};

use crate::table::Cell;

type Layout = &'static [BorrowedFormatItem<'static>];

/// Layouts carrying a time of day, tried against the whole value.
const DATE_TIME_LAYOUTS: [Layout; 8] = [
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]"),
    format_description!("[month padding:none]/[day padding:none]/[year] [hour padding:none]:[minute]:[second]"),
    format_description!("[month padding:none]/[day padding:none]/[year] [hour padding:none]:[minute]"),
    format_description!(
        "[month padding:none]/[day padding:none]/[year] [hour repr:12 padding:none]:[minute]:[second] [period case_sensitive:false]"
    ),
    format_description!(
        "[month padding:none]/[day padding:none]/[year] [hour repr:12 padding:none]:[minute] [period case_sensitive:false]"
    ),
];

/// Date-only layouts; a match reads as midnight.
const DATE_LAYOUTS: [Layout; 8] = [
    format_description!("[year]-[month]-[day]"),
    format_description!("[year]/[month]/[day]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[month padding:none]-[day padding:none]-[year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
    format_description!("[day padding:none]-[month repr:short case_sensitive:false]-[year]"),
    format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
];

// Day zero of the 1900 date system as Excel counts it.
const EXCEL_EPOCH: PrimitiveDateTime = datetime!(1899-12-30 00:00:00);
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Coerce a `READ DATE HIST` cell into a timestamp.
///
/// Unparseable values yield `None` rather than an error; the caller keeps the
/// record and simply cannot attribute it to a month.
pub fn parse_read_date(cell: &Cell) -> Option<PrimitiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_date_text(s),
        _ => None,
    }
}

pub fn from_excel_serial(serial: f64) -> Option<PrimitiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round() as i64;
    EXCEL_EPOCH.checked_add(Duration::milliseconds(millis))
}

pub fn to_excel_serial(dt: PrimitiveDateTime) -> f64 {
    (dt - EXCEL_EPOCH).as_seconds_f64() / 86_400.0
}

fn parse_date_text(raw: &str) -> Option<PrimitiveDateTime> {
    let trimmed = raw.trim();
    let widened = widen_two_digit_year(trimmed);
    let s = widened.as_deref().unwrap_or(trimmed);

    if let Ok(odt) = OffsetDateTime::parse(s, &Rfc3339) {
        // Wall-clock time as written; the zone is not applied.
        return Some(PrimitiveDateTime::new(odt.date(), odt.time()));
    }
    if let Ok(dt) = PrimitiveDateTime::parse(s, &Iso8601::DEFAULT) {
        return Some(dt);
    }
    if let Some(dt) = DATE_TIME_LAYOUTS
        .iter()
        .find_map(|layout| PrimitiveDateTime::parse(s, *layout).ok())
    {
        return Some(dt);
    }
    if let Some(date) = parse_date(s) {
        return Some(date.midnight());
    }

    // A time of day we cannot read still leaves a usable date in front of it.
    s.match_indices([' ', 'T'])
        .find_map(|(idx, _)| parse_date(s[..idx].trim_end()))
        .map(Date::midnight)
}

fn parse_date(s: &str) -> Option<Date> {
    DATE_LAYOUTS.iter().find_map(|layout| Date::parse(s, *layout).ok())
}

/// `M/D/YY` becomes `M/D/20YY`; a two-digit year has no century to resolve.
fn widen_two_digit_year(s: &str) -> Option<String> {
    let end = s.find([' ', 'T']).unwrap_or(s.len());
    let (date, rest) = s.split_at(end);
    let (head, yy) = date.rsplit_once('/')?;
    if head.matches('/').count() != 1 || yy.is_empty() || yy.len() > 2 || !yy.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{head}/20{yy:0>2}{rest}"))
}
