use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub author: String,
    pub body: String,
    pub created_at: String,
}
