use clap::ValueEnum;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeLog {
    pub id: i64,
    pub user_id: i64,
    pub project_id: i64,
    pub task_id: Option<i64>,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
    pub hourly_rate: f64,
    pub is_paid: bool,
    pub status: ApprovalStatus,
    pub invoice_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TimeLog {
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Worked hours (0 while the timer is still running).
    pub fn hours(&self) -> f64 {
        self.duration_minutes.unwrap_or(0) as f64 / 60.0
    }

    pub fn amount(&self) -> f64 {
        self.hours() * self.hourly_rate
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeLogInput {
    pub task_id: Option<i64>,
    pub description: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub tags: Vec<String>,
}

/// Filters shared by `time list` and the time-log export.
#[derive(Debug, Clone, Default)]
pub struct TimeLogFilter {
    pub project_id: Option<i64>,
    pub status: Option<ApprovalStatus>,
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
    pub only_mine: bool,
}

/// Time log joined with the names needed for listings and exports.
#[derive(Debug, Clone, Serialize)]
pub struct TimeLogRow {
    #[serde(flatten)]
    pub log: TimeLog,
    pub project_name: String,
    pub task_title: Option<String>,
    pub user_email: String,
    pub currency: String,
}
