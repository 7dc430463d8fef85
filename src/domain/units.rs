//! Conversions between user-facing ages in years and the days stored on records.

/// Days per year used for every age conversion.
pub const DAYS_PER_YEAR: i64 = 365;

/// Whole years to days.
#[must_use]
pub fn years_to_days(years: i64) -> i64 {
    years * DAYS_PER_YEAR
}

/// Days to whole years (truncating).
#[must_use]
pub fn days_to_years(days: i64) -> i64 {
    days / DAYS_PER_YEAR
}
