use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::id::UserId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::user::{
        UpdateUserPasswordRequest, UpdateUserPasswordRequestWithUserId, UpdateUserProfileRequest,
        UpdateUserProfileRequestWithUserId, UserResponse, UsersResponse,
    },
};

pub async fn show_profile(user: AuthorizedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.user))
}

pub async fn update_profile(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    req.validate(&())?;

    let event = UpdateUserProfileRequestWithUserId::new(user.id(), req);
    registry
        .user_repository()
        .update_profile(event.into())
        .await
        .map(UserResponse::from)
        .map(Json)
}

pub async fn change_password(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserPasswordRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    let event = UpdateUserPasswordRequestWithUserId::new(user.id(), req);
    registry
        .user_repository()
        .update_password(event.into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn show_user(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UserResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .user_repository()
        .find_by_id(user_id)
        .await
        .and_then(|found| match found {
            Some(found) => Ok(Json(found.into())),
            None => Err(AppError::EntityNotFound(format!(
                "ユーザー（{user_id}）が見つかりませんでした。"
            ))),
        })
}

pub async fn show_user_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UsersResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .user_repository()
        .find_all()
        .await
        .map(UsersResponse::from)
        .map(Json)
}
