//! Template filters.

use chrono::NaiveDate;
use folio_content::parse_date;
use minijinja::Value;

/// Rendered for values that are not dates.
pub const INVALID_DATE: &str = "Invalid Date";

/// Long-form US English date: `January 5, 2024`.
pub fn format_readable_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// The `readableDate` filter.
pub fn readable_date(value: Value) -> String {
    value
        .as_str()
        .and_then(parse_date)
        .map(format_readable_date)
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_long_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        assert_eq!(format_readable_date(date), "January 5, 2024");
    }

    #[test]
    fn does_not_pad_days() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();

        assert_eq!(format_readable_date(date), "December 25, 2023");
    }

    #[test]
    fn filter_accepts_strings() {
        assert_eq!(readable_date(Value::from("2024-01-05")), "January 5, 2024");
        assert_eq!(
            readable_date(Value::from("2024-01-05T23:00:00-08:00")),
            "January 5, 2024"
        );
    }

    #[test]
    fn filter_marks_invalid_input() {
        assert_eq!(readable_date(Value::from("soon")), INVALID_DATE);
        assert_eq!(readable_date(Value::from(42)), INVALID_DATE);
        assert_eq!(readable_date(Value::UNDEFINED), INVALID_DATE);
    }
}
