use async_trait::async_trait;
use derive_new::new;

use kernel::model::{
    id::UserId,
    role::Role,
    user::{
        event::{CreateUser, UpdateUserPassword, UpdateUserProfile},
        User,
    },
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::user::UserRow, ConnectionPool};

const USER_SELECT: &str = r#"
    SELECT user_id, user_name, email, phone, company, role
    FROM users
"#;

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        // 同じメールアドレスの登録は弾く
        let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE email = $1")
            .bind(&event.email)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        if exists.is_some() {
            return Err(AppError::UnprocessableEntity(format!(
                "メールアドレス（{}）は既に登録されています。",
                event.email
            )));
        }

        let user_id = UserId::new();
        let password_hash = bcrypt::hash(&event.password, bcrypt::DEFAULT_COST)?;
        let res = sqlx::query(
            r#"
                INSERT INTO users
                (user_id, user_name, email, password_hash, phone, company, role)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id)
        .bind(&event.user_name)
        .bind(&event.email)
        .bind(&password_hash)
        .bind(&event.phone)
        .bind(&event.company)
        .bind(Role::User.as_ref())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No user record has been created".into(),
            ));
        }

        self.fetch_user(user_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!("作成したユーザー（{user_id}）を取得できませんでした。"))
        })
    }

    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>> {
        self.fetch_user(current_user_id).await
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("{USER_SELECT} ORDER BY created_at DESC"))
                .fetch_all(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        self.fetch_user(user_id).await
    }

    async fn update_profile(&self, event: UpdateUserProfile) -> AppResult<User> {
        let res = sqlx::query(
            r#"
                UPDATE users
                SET
                    user_name = COALESCE($2, user_name),
                    phone = COALESCE($3, phone),
                    company = COALESCE($4, company),
                    updated_at = CURRENT_TIMESTAMP
                WHERE user_id = $1
            "#,
        )
        .bind(event.user_id)
        .bind(&event.user_name)
        .bind(&event.phone)
        .bind(&event.company)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "ユーザー（{}）が見つかりませんでした。",
                event.user_id
            )));
        }

        self.fetch_user(event.user_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "ユーザー（{}）が見つかりませんでした。",
                event.user_id
            ))
        })
    }

    async fn update_password(&self, event: UpdateUserPassword) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 現在のパスワードの検証に成功した場合のみ更新する
        let current_hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE user_id = $1 FOR UPDATE")
                .bind(event.user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;

        let current_hash = current_hash.ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "ユーザー（{}）が見つかりませんでした。",
                event.user_id
            ))
        })?;

        let valid = bcrypt::verify(&event.current_password, &current_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        let new_hash = bcrypt::hash(&event.new_password, bcrypt::DEFAULT_COST)?;
        sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = CURRENT_TIMESTAMP WHERE user_id = $1",
        )
        .bind(event.user_id)
        .bind(&new_hash)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}

impl UserRepositoryImpl {
    async fn fetch_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{USER_SELECT} WHERE user_id = $1"))
                .bind(user_id)
                .fetch_optional(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;

        row.map(User::try_from).transpose()
    }
}
