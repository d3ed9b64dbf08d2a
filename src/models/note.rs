use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub client_id: Option<i64>,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}
