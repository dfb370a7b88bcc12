use kernel::model::{id::UserId, user::User};
use shared::error::{AppError, AppResult};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        let role = row
            .role
            .parse()
            .map_err(|_| AppError::ConversionEntityError(row.role.clone()))?;
        Ok(User {
            user_id: row.user_id,
            user_name: row.user_name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            role,
        })
    }
}
