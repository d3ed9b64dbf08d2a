use crate::config::Config;
use crate::core::auth::{Actor, ensure_owns_client};
use crate::core::validate;
use crate::db::clients as client_db;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::client::{Client, ClientInput};

pub struct ClientLogic;

impl ClientLogic {
    pub fn create(pool: &mut DbPool, cfg: &Config, actor: &Actor, input: &ClientInput) -> AppResult<Client> {
        let name = validate::non_empty("name", input.name.as_deref().unwrap_or(""))?;
        let email = match input.email.as_deref() {
            Some(e) => Some(validate::email("email", e)?),
            None => None,
        };
        let currency = validate::currency(input.currency.as_deref().unwrap_or(&cfg.default_currency))?;
        let hourly_rate = input
            .hourly_rate
            .map(|r| validate::non_negative("hourly_rate", r))
            .transpose()?;

        let mut client = Client {
            id: 0,
            user_id: actor.id(),
            name,
            email,
            address: validate::optional_text(input.address.as_ref()),
            currency,
            hourly_rate,
            created_at: String::new(),
            updated_at: String::new(),
        };

        client.id = client_db::insert_client(&pool.conn, &client)?;
        audit(&pool.conn, "client_add", &client.id.to_string(), &client.name);
        client_db::get_client(&pool.conn, client.id)
    }

    /// Fetch a client the actor owns.
    pub fn get(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<Client> {
        let client = client_db::get_client(&pool.conn, id)?;
        ensure_owns_client(actor, &client)?;
        Ok(client)
    }

    pub fn list(pool: &mut DbPool, actor: &Actor) -> AppResult<Vec<Client>> {
        client_db::list_clients(&pool.conn, actor.id())
    }

    pub fn update(pool: &mut DbPool, actor: &Actor, id: i64, input: &ClientInput) -> AppResult<Client> {
        let mut client = Self::get(pool, actor, id)?;

        if let Some(name) = &input.name {
            client.name = validate::non_empty("name", name)?;
        }
        if let Some(email) = &input.email {
            client.email = Some(validate::email("email", email)?);
        }
        if input.address.is_some() {
            client.address = validate::optional_text(input.address.as_ref());
        }
        if let Some(cur) = &input.currency {
            client.currency = validate::currency(cur)?;
        }
        if let Some(rate) = input.hourly_rate {
            client.hourly_rate = Some(validate::non_negative("hourly_rate", rate)?);
        }

        client_db::update_client(&pool.conn, &client)?;
        audit(&pool.conn, "client_edit", &client.id.to_string(), &client.name);
        client_db::get_client(&pool.conn, id)
    }

    /// Delete a client. Clients with invoices are kept for bookkeeping.
    pub fn delete(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        let client = Self::get(pool, actor, id)?;

        if client_db::count_invoices(&pool.conn, id)? > 0 {
            return Err(AppError::validation(
                "client",
                format!("client #{id} has invoices and cannot be deleted"),
            ));
        }

        client_db::delete_client(&pool.conn, id)?;
        audit(&pool.conn, "client_del", &id.to_string(), &client.name);
        Ok(())
    }
}
