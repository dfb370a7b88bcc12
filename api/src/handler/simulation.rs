use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Local;
use garde::Validate;
use kernel::model::{id::RideId, ride::event::CompleteRide};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::{
        ride::RideResponse,
        simulation::{BulkCompleteRequest, BulkCompleteResponse, EligibleRidesResponse},
    },
};

// 本番では希望時刻を過ぎた承認済みリクエストが時刻駆動で完了になる想定。
// ここはその代用として管理者が手で完了へ進めるための口

pub async fn show_eligible_rides(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EligibleRidesResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .ride_repository()
        .find_eligible_for_completion(Local::now())
        .await
        .map(EligibleRidesResponse::from)
        .map(Json)
}

pub async fn complete_ride(
    user: AuthorizedUser,
    Path(ride_id): Path<RideId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RideResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .ride_repository()
        .complete(CompleteRide::new(ride_id))
        .await
        .map(RideResponse::from)
        .map(Json)
}

pub async fn bulk_complete_rides(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<BulkCompleteRequest>,
) -> AppResult<Json<BulkCompleteResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate(&())?;

    registry
        .ride_repository()
        .complete_bulk(req.ride_ids)
        .await
        .map(BulkCompleteResponse::from)
        .map(Json)
}
