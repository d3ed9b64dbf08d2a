use crate::core::validate;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::users as user_db;
use crate::errors::{AppError, AppResult};
use crate::models::user::User;

pub struct UserLogic;

impl UserLogic {
    pub fn register(pool: &mut DbPool, name: &str, email: &str) -> AppResult<User> {
        let name = validate::non_empty("name", name)?;
        let email = validate::email("email", email)?;

        if user_db::find_by_email(&pool.conn, &email)?.is_some() {
            return Err(AppError::validation(
                "email",
                format!("'{email}' is already registered"),
            ));
        }

        let user = user_db::insert_user(&pool.conn, &name, &email)?;
        audit(&pool.conn, "user_add", &user.email, &format!("Registered {}", user.name));
        Ok(user)
    }

    pub fn list(pool: &mut DbPool) -> AppResult<Vec<User>> {
        user_db::list_users(&pool.conn)
    }

    /// Check that the e-mail belongs to a registered user.
    pub fn find(pool: &mut DbPool, email: &str) -> AppResult<User> {
        user_db::find_by_email(&pool.conn, email)?.ok_or_else(|| AppError::not_found("User", email))
    }
}
