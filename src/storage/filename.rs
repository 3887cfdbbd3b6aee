//! Storage keys for new captures.
//!
//! Names look like `img_MMDDYYYYHHMMSS.png` in local wall-clock time. The resolution is
//! one second: two captures stored within the same second get the same name and the
//! later write replaces the earlier one. No suffix or collision check is added.

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

pub const CAPTURE_PREFIX: &str = "img_";
pub const CAPTURE_EXTENSION: &str = ".png";

/// Builds the filename for a capture taken at `now`.
pub fn generate_filename<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}{}{}",
        CAPTURE_PREFIX,
        now.format("%m%d%Y%H%M%S"),
        CAPTURE_EXTENSION
    )
}

/// Filename for a capture taken right now, local time.
pub fn generate_filename_now() -> String {
    generate_filename(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use regex::Regex;

    #[test]
    fn test_fields_are_zero_padded() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(generate_filename(&ts), "img_01022024030405.png");
    }

    #[test]
    fn test_month_day_year_order() {
        let ts = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 58).unwrap();
        assert_eq!(generate_filename(&ts), "img_12312025235958.png");
    }

    #[test]
    fn test_same_second_collides() {
        let a = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let b = a + chrono::Duration::milliseconds(999);
        assert_eq!(generate_filename(&a), generate_filename(&b));
    }

    #[test]
    fn test_now_has_expected_shape() {
        let pattern = Regex::new(r"^img_\d{14}\.png$").unwrap();
        assert!(pattern.is_match(&generate_filename_now()));
    }
}
