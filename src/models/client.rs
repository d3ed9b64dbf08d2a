use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Client {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub currency: String,
    pub hourly_rate: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted by create/update. `None` leaves a value untouched on update.
#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub currency: Option<String>,
    pub hourly_rate: Option<f64>,
}
