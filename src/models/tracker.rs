use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Github,
    Jira,
}

impl Provider {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Jira => "jira",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "github" => Some(Provider::Github),
            "jira" => Some(Provider::Jira),
            _ => None,
        }
    }
}

/// Link between a project and a remote issue tracker.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerLink {
    pub project_id: i64,
    pub provider: Provider,
    pub repository: String,
    pub base_url: Option<String>,
    pub last_synced_at: Option<String>,
}

/// Issue as returned by a remote tracker, before it becomes a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalIssue {
    pub external_id: String,
    pub title: String,
    pub body: Option<String>,
    pub url: String,
    pub closed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}
