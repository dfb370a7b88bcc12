use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::id::RideId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::ride::{
        CancelRideRequestWithIds, CreateRideRequest, CreateRideRequestWithUserId,
        PaginatedRideResponse, RideListQuery, RideListQueryWithUserId, RideResponse,
        UpdateRideRequest, UpdateRideRequestWithIds,
    },
};

pub async fn register_ride(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateRideRequest>,
) -> AppResult<(StatusCode, Json<RideResponse>)> {
    req.validate(&())?;

    let event = CreateRideRequestWithUserId::new(user.id(), req);
    registry
        .ride_repository()
        .create(event.into())
        .await
        .map(|ride| (StatusCode::CREATED, Json(ride.into())))
}

pub async fn show_my_rides(
    user: AuthorizedUser,
    Query(query): Query<RideListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaginatedRideResponse>> {
    query.validate(&())?;

    let filter = RideListQueryWithUserId::new(user.id(), query);
    registry
        .ride_repository()
        .find_own(filter.into())
        .await
        .map(PaginatedRideResponse::from)
        .map(Json)
}

pub async fn show_ride(
    user: AuthorizedUser,
    Path(ride_id): Path<RideId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RideResponse>> {
    registry
        .ride_repository()
        .find_own_by_id(ride_id, user.id())
        .await
        .and_then(|ride| match ride {
            Some(ride) => Ok(Json(ride.into())),
            None => Err(AppError::EntityNotFound(format!(
                "配車リクエスト（{ride_id}）が見つかりませんでした。"
            ))),
        })
}

pub async fn update_ride(
    user: AuthorizedUser,
    Path(ride_id): Path<RideId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateRideRequest>,
) -> AppResult<Json<RideResponse>> {
    req.validate(&())?;

    let event = UpdateRideRequestWithIds::new(ride_id, user.id(), req);
    registry
        .ride_repository()
        .update_own(event.into())
        .await
        .map(RideResponse::from)
        .map(Json)
}

pub async fn cancel_ride(
    user: AuthorizedUser,
    Path(ride_id): Path<RideId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RideResponse>> {
    let event = CancelRideRequestWithIds::new(ride_id, user.id());
    registry
        .ride_repository()
        .cancel_own(event.into())
        .await
        .map(RideResponse::from)
        .map(Json)
}
