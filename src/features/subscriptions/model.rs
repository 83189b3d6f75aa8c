//! Subscription records

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A recurring monthly charge the owner wants to be warned about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub owner: String,
    pub service_name: String,
    /// Day of month the charge happens (1-31)
    pub billing_day: u32,
    pub cost: f64,
    pub currency: String,
    /// Billing date the owner was last notified for
    pub last_notified_for: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Billing days that fall on `date`: its own day, plus every later day when `date`
/// closes a short month (the 30th of April also covers a billing day of 31)
pub fn billing_days_for(date: NaiveDate) -> Vec<u32> {
    let day = date.day();
    let last = days_in_month(date);
    if day == last {
        (day..=31).collect()
    } else {
        vec![day]
    }
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2023, 2, 10)), 28);
        assert_eq!(days_in_month(date(2024, 4, 1)), 30);
        assert_eq!(days_in_month(date(2024, 12, 31)), 31);
    }

    #[test]
    fn test_billing_days_mid_month() {
        assert_eq!(billing_days_for(date(2024, 3, 15)), vec![15]);
    }

    #[test]
    fn test_billing_days_short_month_end() {
        assert_eq!(billing_days_for(date(2024, 4, 30)), vec![30, 31]);
        assert_eq!(billing_days_for(date(2023, 2, 28)), vec![28, 29, 30, 31]);
        assert_eq!(billing_days_for(date(2024, 1, 31)), vec![31]);
    }
}
