use std::sync::Arc;

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use kernel::model::{auth::AccessToken, id::UserId};
use kernel::repository::auth::AuthRepository;
use shared::error::{AppError, AppResult};

use crate::{database::ConnectionPool, redis::RedisClient};

fn auth_key(access_token: &AccessToken) -> String {
    format!("auth:token:{}", access_token.0)
}

#[derive(Debug, FromRow)]
struct UserCredentialRow {
    user_id: UserId,
    password_hash: String,
}

pub struct AuthRepositoryImpl {
    db: ConnectionPool,
    kv: Arc<RedisClient>,
    ttl: u64,
}

impl AuthRepositoryImpl {
    pub fn new(db: ConnectionPool, kv: Arc<RedisClient>, ttl: u64) -> Self {
        Self { db, kv, ttl }
    }
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn fetch_user_id_from_token(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<UserId>> {
        let Some(value) = self.kv.get(&auth_key(access_token)).await? else {
            return Ok(None);
        };
        let user_id = value.parse::<Uuid>()?;
        Ok(Some(UserId::from(user_id)))
    }

    async fn verify_user(&self, email: &str, password: &str) -> AppResult<UserId> {
        let row: Option<UserCredentialRow> =
            sqlx::query_as("SELECT user_id, password_hash FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;

        // ユーザーが見つからない場合も検証失敗と同じエラーにする
        let row = row.ok_or(AppError::UnauthenticatedError)?;

        let valid = bcrypt::verify(password, &row.password_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        Ok(row.user_id)
    }

    async fn create_token(&self, user_id: UserId) -> AppResult<AccessToken> {
        let token = AccessToken(Uuid::new_v4().simple().to_string());
        self.kv
            .set_ex(&auth_key(&token), &user_id.to_string(), self.ttl)
            .await?;
        Ok(token)
    }

    async fn delete_token(&self, access_token: &AccessToken) -> AppResult<()> {
        self.kv.delete(&auth_key(access_token)).await
    }
}
