use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;
use garde::Validate;
use kernel::model::{
    analytics::AnalyticsRange,
    id::RideId,
    ride::{event::DecideRide, AdminRideAction},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::{
        analytics::{
            AdminActionRecordResponse, AnalyticsQuery, AnalyticsResponse, DailyRideCountResponse,
            DashboardResponse, StatusCountResponse, TopRequesterResponse,
        },
        ride::{AdminRideListQuery, DecideRideRequest, PaginatedRideResponse, RideResponse},
    },
};

// 集計の既定の上限件数。元の管理画面の表示件数に合わせている
const TOP_REQUESTERS_LIMIT: i64 = 10;
const RECENT_ACTIONS_LIMIT: i64 = 10;

pub async fn show_all_rides(
    user: AuthorizedUser,
    Query(query): Query<AdminRideListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaginatedRideResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    query.validate(&())?;

    registry
        .ride_repository()
        .find_all(query.into())
        .await
        .map(PaginatedRideResponse::from)
        .map(Json)
}

pub async fn decide_ride(
    user: AuthorizedUser,
    Path(ride_id): Path<RideId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<DecideRideRequest>,
) -> AppResult<Json<RideResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate(&())?;

    // APPROVE / REJECT / CANCEL 以外のトークンはここで弾く
    let action = req.action.parse::<AdminRideAction>().map_err(|_| {
        AppError::InvalidAction(format!("不正なアクションです: {}", req.action))
    })?;

    let event = DecideRide::new(ride_id, user.id(), action, req.reason);
    registry
        .ride_repository()
        .decide(event)
        .await
        .map(RideResponse::from)
        .map(Json)
}

pub async fn show_analytics(
    user: AuthorizedUser,
    Query(query): Query<AnalyticsQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<AnalyticsResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }

    let range = AnalyticsRange::from(query);
    let now = Local::now();
    let analytics_repository = registry.analytics_repository();

    let total_rides = analytics_repository.count_total(&range).await?;
    let rides_by_status = analytics_repository.count_by_status(&range).await?;
    let rides_per_day = analytics_repository.rides_per_day(&range, now).await?;
    let top_requesters = analytics_repository
        .top_requesters(&range, TOP_REQUESTERS_LIMIT)
        .await?;
    let recent_admin_actions = analytics_repository
        .recent_admin_actions(&range, RECENT_ACTIONS_LIMIT)
        .await?;

    Ok(Json(AnalyticsResponse::new(
        total_rides,
        rides_by_status
            .into_iter()
            .map(StatusCountResponse::from)
            .collect(),
        rides_per_day
            .into_iter()
            .map(DailyRideCountResponse::from)
            .collect(),
        top_requesters
            .into_iter()
            .map(TopRequesterResponse::from)
            .collect(),
        recent_admin_actions
            .into_iter()
            .map(AdminActionRecordResponse::from)
            .collect(),
    )))
}

pub async fn show_dashboard(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<DashboardResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .analytics_repository()
        .dashboard(Local::now())
        .await
        .map(DashboardResponse::from)
        .map(Json)
}
