use chrono::NaiveDate;
use serde::Serialize;

/// Hours and amount accumulated in one paid/unpaid bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bucket {
    pub hours: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyTotals {
    pub currency: String,
    pub paid: Bucket,
    pub unpaid: Bucket,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub user_hours: f64,
    pub team_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub reference_date: NaiveDate,
    pub totals: Vec<CurrencyTotals>,
    pub trend: Vec<TrendPoint>,
    pub clients: i64,
    pub active_projects: i64,
    pub open_tasks: i64,
    pub pending_approvals: i64,
    pub running_timer: Option<i64>,
}
