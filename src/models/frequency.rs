use crate::errors::AppError;
use chrono::{Days, Months, NaiveDate};
use serde::Serialize;
use std::str::FromStr;

/// Cadence of a recurring task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    EveryOtherWeek,
    Monthly,
}

impl Frequency {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::EveryOtherWeek => "every_other_week",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "every_other_week" => Some(Frequency::EveryOtherWeek),
            "monthly" => Some(Frequency::Monthly),
            _ => None,
        }
    }

    /// Next occurrence after `from`.
    ///
    /// Monthly advancement keeps the day of month and clamps to the last day
    /// of the target month (Jan 31 → Feb 28/29).
    pub fn advance(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => from.checked_add_days(Days::new(1)),
            Frequency::Weekly => from.checked_add_days(Days::new(7)),
            Frequency::EveryOtherWeek => from.checked_add_days(Days::new(14)),
            Frequency::Monthly => from.checked_add_months(Months::new(1)),
        }
    }
}

impl FromStr for Frequency {
    type Err = AppError;

    /// Accepts the stored names plus `every-other-week` and `biweekly`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "biweekly" => Ok(Frequency::EveryOtherWeek),
            other => {
                Frequency::from_db_str(other).ok_or_else(|| AppError::InvalidFrequency(s.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn cadences_advance_by_their_step() {
        let from = d(2025, 12, 25);
        assert_eq!(Frequency::Daily.advance(from), Some(d(2025, 12, 26)));
        assert_eq!(Frequency::Weekly.advance(from), Some(d(2026, 1, 1)));
        assert_eq!(Frequency::EveryOtherWeek.advance(from), Some(d(2026, 1, 8)));
        assert_eq!(Frequency::Monthly.advance(d(2024, 1, 31)), Some(d(2024, 2, 29)));
    }

    #[test]
    fn aliases_parse_to_every_other_week() {
        for s in ["biweekly", "every-other-week", "Every_Other_Week"] {
            assert_eq!(s.parse::<Frequency>().unwrap(), Frequency::EveryOtherWeek);
        }
        assert!(matches!(
            "yearly".parse::<Frequency>(),
            Err(AppError::InvalidFrequency(_))
        ));
    }
}
