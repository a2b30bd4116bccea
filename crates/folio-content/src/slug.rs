//! Slug derivation from dated file names.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// `YYYY-MM-DD-` at the start of a file name. ASCII digits only.
static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}-").expect("Invalid date prefix regex")
});

/// Derive the slug for a file name by stripping one leading date prefix.
///
/// `2024-01-05-hello-world` becomes `hello-world`; names without a prefix
/// are returned unchanged. No other normalization happens.
pub fn derive_slug(file_name: &str) -> &str {
    match DATE_PREFIX.find(file_name) {
        Some(m) => &file_name[m.end()..],
        None => file_name,
    }
}

/// The date encoded in a file name's prefix, if it is a real calendar date.
pub fn date_prefix(file_name: &str) -> Option<NaiveDate> {
    let m = DATE_PREFIX.find(file_name)?;
    NaiveDate::parse_from_str(&file_name[..m.end() - 1], "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_date_prefix() {
        assert_eq!(derive_slug("2024-01-05-hello-world"), "hello-world");
        assert_eq!(derive_slug("1999-12-31-party"), "party");
    }

    #[test]
    fn leaves_undated_names_unchanged() {
        assert_eq!(derive_slug("about"), "about");
        assert_eq!(derive_slug("2024-01-05"), "2024-01-05");
        assert_eq!(derive_slug("24-01-05-short-year"), "24-01-05-short-year");
        assert_eq!(derive_slug("notes-2024-01-05-x"), "notes-2024-01-05-x");
        assert_eq!(derive_slug(""), "");
    }

    #[test]
    fn strips_only_the_leading_prefix() {
        assert_eq!(
            derive_slug("2024-01-05-2023-12-31-recap"),
            "2023-12-31-recap"
        );
    }

    #[test]
    fn keeps_trailing_text_verbatim() {
        assert_eq!(derive_slug("2024-01-05-Hello World"), "Hello World");
        assert_eq!(derive_slug("2024-01-05-"), "");
        assert_eq!(derive_slug("2024-01-05-café"), "café");
    }

    #[test]
    fn ignores_non_ascii_digits() {
        // Arabic-Indic digits are Unicode \d but not part of the prefix
        assert_eq!(derive_slug("٢٠٢٤-01-05-post"), "٢٠٢٤-01-05-post");
    }

    #[test]
    fn reads_date_prefix() {
        assert_eq!(
            date_prefix("2024-01-05-hello-world"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(date_prefix("about"), None);
        assert_eq!(date_prefix("2024-13-40-not-a-date"), None);
    }
}
