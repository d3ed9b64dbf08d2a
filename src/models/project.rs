use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub client_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub currency: String,
    pub hourly_rate: f64,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    pub name: Option<String>,
    pub client_id: Option<i64>,
    pub description: Option<String>,
    pub currency: Option<String>,
    pub hourly_rate: Option<f64>,
}

/// A user taking part in a project, with an optional per-project rate.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectMember {
    pub project_id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub hourly_rate: Option<f64>,
}

/// A user in the owner's team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    pub owner_id: i64,
    pub member_id: i64,
    pub name: String,
    pub email: String,
    pub hourly_rate: Option<f64>,
}
