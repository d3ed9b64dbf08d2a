use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub stored_path: String,
    pub size_bytes: i64,
    pub created_at: String,
}
