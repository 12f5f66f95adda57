//! Calendar-safe date construction.
//!
//! Dates in the citation dialect arrive as separate Year/Month/Day texts. Some
//! records carry impossible dates; two of them are corrected (Feb 29 outside a
//! leap year, day 31 in a 30-day month), everything else invalid is rejected.

use chrono::NaiveDate;
use tracing::debug;

use super::document::NodeRef;
use super::error::{DomainError, DomainResult};
use super::resolve::resolve_text;

/// Month abbreviations used by the dialect, mapped to zero-padded numbers.
pub const MONTHS: [(&str, &str); 12] = [
    ("Jan", "01"),
    ("Feb", "02"),
    ("Mar", "03"),
    ("Apr", "04"),
    ("May", "05"),
    ("Jun", "06"),
    ("Jul", "07"),
    ("Aug", "08"),
    ("Sep", "09"),
    ("Oct", "10"),
    ("Nov", "11"),
    ("Dec", "12"),
];

fn month_from_abbreviation(raw: &str) -> Option<&'static str> {
    MONTHS
        .iter()
        .find(|(abbr, _)| *abbr == raw)
        .map(|(_, number)| *number)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build a date from raw year/month/day texts.
///
/// Returns `Ok(None)` when year or month is missing. A missing day means the
/// first of the month.
pub fn normalize_date(
    year: Option<&str>,
    month: Option<&str>,
    day: Option<&str>,
) -> DomainResult<Option<NaiveDate>> {
    let invalid = |reason: &str| DomainError::InvalidDate {
        year: year.map(str::to_string),
        month: month.map(str::to_string),
        day: day.map(str::to_string),
        reason: reason.to_string(),
    };

    let month_number = match non_blank(month) {
        Some(raw) if raw.chars().all(|c| c.is_ascii_digit()) => Some(raw),
        Some(raw) => Some(month_from_abbreviation(raw).ok_or_else(|| invalid("unknown month"))?),
        None => None,
    };

    let (Some(year_raw), Some(month_raw)) = (non_blank(year), month_number) else {
        return Ok(None);
    };

    let y: i32 = year_raw.parse().map_err(|_| invalid("non-numeric year"))?;
    let m: u32 = month_raw.parse().map_err(|_| invalid("non-numeric month"))?;
    let d: u32 = match non_blank(day) {
        Some(raw) => raw.parse().map_err(|_| invalid("non-numeric day"))?,
        None => 1,
    };

    if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
        return Ok(Some(date));
    }

    let corrected = correct_day(y, m, d).ok_or_else(|| invalid("not a calendar date"))?;
    debug!("corrected date {}-{:02}-{:02} to {}", y, m, d, corrected);
    Ok(Some(corrected))
}

/// The two recoverable calendar slips; None for anything else.
fn correct_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    match (month, day) {
        (2, 29) => NaiveDate::from_ymd_opt(year, 2, 28),
        (4 | 6 | 9 | 11, 31) => NaiveDate::from_ymd_opt(year, month, 30),
        _ => None,
    }
}

/// Read `Year`/`Month`/`Day` under `node` and normalize them.
pub fn date_from_node(node: NodeRef<'_>) -> DomainResult<Option<NaiveDate>> {
    let year = resolve_text(node, "Year");
    let month = resolve_text(node, "Month");
    let day = resolve_text(node, "Day");
    normalize_date(year.as_deref(), month.as_deref(), day.as_deref())
}

/// Optional date container: absent container or incomplete parts give None.
pub fn optional_date(parent: NodeRef<'_>, container: &str) -> DomainResult<Option<NaiveDate>> {
    match parent.find(container) {
        Some(node) => date_from_node(node),
        None => Ok(None),
    }
}

/// Mandatory date container.
pub fn required_date(
    parent: NodeRef<'_>,
    container: &'static str,
    entity: &'static str,
) -> DomainResult<NaiveDate> {
    optional_date(parent, container)?.ok_or_else(|| DomainError::missing(entity, container))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[rstest]
    #[case(Some("2023"), Some("2"), Some("29"), ymd(2023, 2, 28))]
    #[case(Some("2024"), Some("2"), Some("29"), ymd(2024, 2, 29))]
    #[case(Some("2023"), Some("4"), Some("31"), ymd(2023, 4, 30))]
    #[case(Some("2023"), Some("11"), Some("31"), ymd(2023, 11, 30))]
    #[case(Some("2023"), None, Some("15"), None)]
    #[case(None, Some("3"), Some("1"), None)]
    #[case(Some("2023"), Some("3"), None, ymd(2023, 3, 1))]
    #[case(Some("2023"), Some("Feb"), Some("29"), ymd(2023, 2, 28))]
    #[case(Some("1999"), Some("Dec"), None, ymd(1999, 12, 1))]
    #[case(Some("2001"), Some("07"), Some("04"), ymd(2001, 7, 4))]
    #[case(Some(" "), Some("3"), Some("1"), None)]
    fn given_parts_when_normalizing_then_applies_policy(
        #[case] year: Option<&str>,
        #[case] month: Option<&str>,
        #[case] day: Option<&str>,
        #[case] expected: Option<NaiveDate>,
    ) {
        assert_eq!(normalize_date(year, month, day).unwrap(), expected);
    }

    #[rstest]
    #[case(Some("2023"), Some("2"), Some("30"))]
    #[case(Some("2023"), Some("13"), Some("1"))]
    #[case(Some("2023"), Some("Foo"), Some("1"))]
    #[case(Some("20x3"), Some("1"), Some("1"))]
    #[case(Some("2023"), Some("1"), Some("first"))]
    #[case(Some("2023"), Some("1"), Some("0"))]
    fn given_uncorrectable_parts_when_normalizing_then_fails_with_raw_text(
        #[case] year: Option<&str>,
        #[case] month: Option<&str>,
        #[case] day: Option<&str>,
    ) {
        let err = normalize_date(year, month, day).unwrap_err();
        match err {
            DomainError::InvalidDate {
                year: y,
                month: m,
                day: d,
                ..
            } => {
                assert_eq!(y.as_deref(), year);
                assert_eq!(m.as_deref(), month);
                assert_eq!(d.as_deref(), day);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn given_month_table_then_has_twelve_padded_entries() {
        assert_eq!(MONTHS.len(), 12);
        assert!(MONTHS.iter().all(|(_, n)| n.len() == 2));
        assert_eq!(month_from_abbreviation("Sep"), Some("09"));
        assert_eq!(month_from_abbreviation("sep"), None);
    }
}
