use chrono::NaiveDate;

/// Date format used on the command line and inside search predicates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds the received-date predicate for an inclusive `[start, end]` window.
pub fn date_range_predicate(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "received>={} AND received<={}",
        start.format(DATE_FORMAT),
        end.format(DATE_FORMAT)
    )
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}
