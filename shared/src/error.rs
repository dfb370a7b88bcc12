use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    // 予約希望時刻が過去になっているときのエラー
    #[error("{0}")]
    InvalidSchedule(String),
    // 現在のステータスからは遷移できない操作を要求されたときのエラー
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    InvalidAction(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("リクエストされたデータの変換に失敗しました。")]
    ConversionEntityError(String),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("ログインに失敗しました。")]
    UnauthenticatedError,
    #[error("認証情報が誤っています。")]
    UnauthorizedError,
    #[error("この操作は許可されていません。")]
    ForbiddenOperation,
    #[error(transparent)]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error(transparent)]
    BcryptError(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    ConvertToUuidError(#[from] uuid::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            AppError::InvalidSchedule(_) | AppError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthenticatedError | AppError::UnauthorizedError => {
                StatusCode::UNAUTHORIZED
            }
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ConversionEntityError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::TransactionError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::BcryptError(_)
            | AppError::ConvertToUuidError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // 5xx 系は調査に使うため原因チェーンごとログに残す
        if status_code.is_server_error() {
            tracing::error!(
                error.cause_chain = ?self,
                error.message = %self,
                "Unexpected error happened"
            );
        }

        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    // エラー種別ごとに異なるステータスコードへ割り当てられていることを確認する
    #[test]
    fn error_kinds_map_to_distinct_status_codes() {
        let invalid_schedule = AppError::InvalidSchedule("過去の時刻です。".into())
            .into_response()
            .status();
        let invalid_state = AppError::InvalidState("遷移できません。".into())
            .into_response()
            .status();
        let not_found = AppError::EntityNotFound("存在しません。".into())
            .into_response()
            .status();

        assert_eq!(invalid_schedule, StatusCode::BAD_REQUEST);
        assert_eq!(invalid_state, StatusCode::CONFLICT);
        assert_eq!(not_found, StatusCode::NOT_FOUND);
    }

    #[test]
    fn forbidden_operation_returns_403() {
        let res = AppError::ForbiddenOperation.into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
