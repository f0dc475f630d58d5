/// Trading days in one year for the Business/252 convention.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub trait DayCountProvider {
    fn year_fraction(days: usize) -> f64;
}

/// # Business252
/// Business/252 day count convention: every simulated step is one trading
/// day, worth `1 / 252` of a year.
/// # Example
/// ```
/// use mcrisk::prelude::*;
///
/// assert_eq!(Business252::year_fraction(22), 22.0 / 252.0);
/// assert_eq!(Business252::step(), 1.0 / 252.0);
/// ```
pub struct Business252;

impl Business252 {
    /// Year fraction of a single trading day.
    pub fn step() -> f64 {
        Self::year_fraction(1)
    }
}

impl DayCountProvider for Business252 {
    fn year_fraction(days: usize) -> f64 {
        days as f64 / TRADING_DAYS_PER_YEAR
    }
}
