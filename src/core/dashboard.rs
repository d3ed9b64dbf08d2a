//! Dashboard statistics for the acting user.
//!
//! Everything is scoped to finished, approved time logs on projects the user
//! owns. Team members' hours on those projects count toward the team figures;
//! their hours on projects owned by anyone else never show up.

use crate::core::auth::Actor;
use crate::db::pool::DbPool;
use crate::db::{stats, tasks as task_db, time_logs as log_db};
use crate::errors::AppResult;
use crate::models::dashboard::{Bucket, CurrencyTotals, DashboardStats, TrendPoint};
use crate::utils::formatting::round2;
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

pub const TREND_DAYS: u64 = 7;

#[derive(Default)]
struct Acc {
    minutes: i64,
    amount: f64,
}

impl Acc {
    fn add(&mut self, minutes: i64, rate: f64) {
        self.minutes += minutes;
        self.amount += minutes as f64 / 60.0 * rate;
    }

    fn bucket(&self) -> Bucket {
        Bucket {
            hours: round2(self.minutes as f64 / 60.0),
            amount: round2(self.amount),
        }
    }
}

/// Paid/unpaid totals per currency, ordered by currency code.
pub fn currency_totals(logs: &[stats::ScopedLog]) -> Vec<CurrencyTotals> {
    let mut by_currency: BTreeMap<&str, (Acc, Acc)> = BTreeMap::new();

    for log in logs {
        let (paid, unpaid) = by_currency.entry(log.currency.as_str()).or_default();
        if log.is_paid {
            paid.add(log.minutes, log.hourly_rate);
        } else {
            unpaid.add(log.minutes, log.hourly_rate);
        }
    }

    by_currency
        .into_iter()
        .map(|(currency, (paid, unpaid))| CurrencyTotals {
            currency: currency.to_string(),
            paid: paid.bucket(),
            unpaid: unpaid.bucket(),
        })
        .collect()
}

/// One point per day from `today - 6` through `today`.
pub fn trend(logs: &[stats::ScopedLog], user_id: i64, today: NaiveDate) -> Vec<TrendPoint> {
    (0..TREND_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| {
            let (mut mine, mut team) = (0i64, 0i64);
            for log in logs.iter().filter(|l| l.date == date) {
                if log.user_id == user_id {
                    mine += log.minutes;
                } else {
                    team += log.minutes;
                }
            }
            TrendPoint {
                date,
                user_hours: round2(mine as f64 / 60.0),
                team_hours: round2(team as f64 / 60.0),
            }
        })
        .collect()
}

pub struct DashboardLogic;

impl DashboardLogic {
    pub fn build(pool: &mut DbPool, actor: &Actor, today: NaiveDate) -> AppResult<DashboardStats> {
        let conn = &pool.conn;
        let logs = stats::scoped_logs(conn, actor.id())?;

        Ok(DashboardStats {
            reference_date: today,
            totals: currency_totals(&logs),
            trend: trend(&logs, actor.id(), today),
            clients: stats::count_clients(conn, actor.id())?,
            active_projects: stats::count_active_projects(conn, actor.id())?,
            open_tasks: task_db::count_open_assigned(conn, actor.id())?,
            pending_approvals: log_db::count_pending_for_owner(conn, actor.id())?,
            running_timer: log_db::running_for_user(conn, actor.id())?.map(|l| l.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::stats::ScopedLog;

    fn log(user_id: i64, date: &str, minutes: i64, rate: f64, paid: bool, cur: &str) -> ScopedLog {
        ScopedLog {
            user_id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            minutes,
            hourly_rate: rate,
            is_paid: paid,
            currency: cur.to_string(),
        }
    }

    #[test]
    fn totals_split_by_currency_and_payment() {
        let logs = vec![
            log(1, "2025-03-10", 90, 100.0, false, "USD"),
            log(2, "2025-03-10", 30, 60.0, true, "USD"),
            log(1, "2025-03-11", 60, 80.0, false, "EUR"),
        ];
        let totals = currency_totals(&logs);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].currency, "EUR");
        assert_eq!(totals[0].unpaid, Bucket { hours: 1.0, amount: 80.0 });
        assert_eq!(totals[1].unpaid, Bucket { hours: 1.5, amount: 150.0 });
        assert_eq!(totals[1].paid, Bucket { hours: 0.5, amount: 30.0 });
    }

    #[test]
    fn trend_covers_seven_days_ending_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let logs = vec![
            log(1, "2025-03-12", 120, 0.0, false, "USD"),
            log(2, "2025-03-12", 45, 0.0, false, "USD"),
            log(1, "2025-03-06", 60, 0.0, false, "USD"),
            log(1, "2025-03-05", 600, 0.0, false, "USD"),
        ];
        let points = trend(&logs, 1, today);

        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2025, 3, 6).unwrap());
        assert_eq!(points[0].user_hours, 1.0);
        assert_eq!(points[6].user_hours, 2.0);
        assert_eq!(points[6].team_hours, 0.75);
    }
}
