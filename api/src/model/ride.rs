use chrono::{DateTime, Local, NaiveDate};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    admin_action::AdminAction,
    id::{AdminActionId, RideId, UserId},
    list::{ListOptions, PaginatedList},
    ride::{
        event::{CancelRide, CreateRide, UpdateRide},
        AdminRideAction, AdminRideFilter, OwnRideFilter, Ride, RideStatus,
    },
    user::{ActionAdmin, RideRequester},
};
use serde::{Deserialize, Serialize};
use shared::datetime::range_bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatusName {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl From<RideStatus> for RideStatusName {
    fn from(value: RideStatus) -> Self {
        match value {
            RideStatus::Pending => Self::Pending,
            RideStatus::Approved => Self::Approved,
            RideStatus::Rejected => Self::Rejected,
            RideStatus::Cancelled => Self::Cancelled,
            RideStatus::Completed => Self::Completed,
        }
    }
}

impl From<RideStatusName> for RideStatus {
    fn from(value: RideStatusName) -> Self {
        match value {
            RideStatusName::Pending => Self::Pending,
            RideStatusName::Approved => Self::Approved,
            RideStatusName::Rejected => Self::Rejected,
            RideStatusName::Cancelled => Self::Cancelled,
            RideStatusName::Completed => Self::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideActionName {
    Approve,
    Reject,
    Cancel,
}

impl From<AdminRideAction> for RideActionName {
    fn from(value: AdminRideAction) -> Self {
        match value {
            AdminRideAction::Approve => Self::Approve,
            AdminRideAction::Reject => Self::Reject,
            AdminRideAction::Cancel => Self::Cancel,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    #[garde(length(min = 5))]
    pub pickup_location: String,
    #[garde(length(min = 5))]
    pub drop_location: String,
    #[garde(skip)]
    pub scheduled_time: DateTime<Local>,
    #[garde(inner(length(min = 5)))]
    pub purpose: Option<String>,
    #[garde(inner(length(max = 500)))]
    pub notes: Option<String>,
}

#[derive(new)]
pub struct CreateRideRequestWithUserId(UserId, CreateRideRequest);

impl From<CreateRideRequestWithUserId> for CreateRide {
    fn from(value: CreateRideRequestWithUserId) -> Self {
        let CreateRideRequestWithUserId(
            user_id,
            CreateRideRequest {
                pickup_location,
                drop_location,
                scheduled_time,
                purpose,
                notes,
            },
        ) = value;
        CreateRide {
            requested_by: user_id,
            pickup_location,
            drop_location,
            scheduled_time,
            purpose,
            notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRideRequest {
    #[garde(inner(length(min = 5)))]
    pub pickup_location: Option<String>,
    #[garde(inner(length(min = 5)))]
    pub drop_location: Option<String>,
    #[garde(skip)]
    pub scheduled_time: Option<DateTime<Local>>,
    #[garde(inner(length(min = 5)))]
    pub purpose: Option<String>,
    #[garde(inner(length(max = 500)))]
    pub notes: Option<String>,
}

#[derive(new)]
pub struct UpdateRideRequestWithIds(RideId, UserId, UpdateRideRequest);

impl From<UpdateRideRequestWithIds> for UpdateRide {
    fn from(value: UpdateRideRequestWithIds) -> Self {
        let UpdateRideRequestWithIds(
            ride_id,
            user_id,
            UpdateRideRequest {
                pickup_location,
                drop_location,
                scheduled_time,
                purpose,
                notes,
            },
        ) = value;
        UpdateRide {
            ride_id,
            requested_by: user_id,
            pickup_location,
            drop_location,
            scheduled_time,
            purpose,
            notes,
        }
    }
}

#[derive(new)]
pub struct CancelRideRequestWithIds(RideId, UserId);

impl From<CancelRideRequestWithIds> for CancelRide {
    fn from(value: CancelRideRequestWithIds) -> Self {
        let CancelRideRequestWithIds(ride_id, user_id) = value;
        CancelRide {
            ride_id,
            requested_by: user_id,
        }
    }
}

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

const fn default_page() -> i64 {
    DEFAULT_PAGE
}

const fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RideListQuery {
    #[garde(skip)]
    pub status: Option<RideStatusName>,
    #[garde(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i64,
    #[garde(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(new)]
pub struct RideListQueryWithUserId(UserId, RideListQuery);

impl From<RideListQueryWithUserId> for OwnRideFilter {
    fn from(value: RideListQueryWithUserId) -> Self {
        let RideListQueryWithUserId(user_id, RideListQuery { status, page, limit }) = value;
        OwnRideFilter {
            requested_by: user_id,
            status: status.map(RideStatus::from),
            options: ListOptions::new(page, limit),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminRideListQuery {
    #[garde(skip)]
    pub status: Option<RideStatusName>,
    #[garde(skip)]
    pub user_id: Option<UserId>,
    #[garde(skip)]
    pub start_date: Option<NaiveDate>,
    #[garde(skip)]
    pub end_date: Option<NaiveDate>,
    #[garde(skip)]
    pub search: Option<String>,
    #[garde(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i64,
    #[garde(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl From<AdminRideListQuery> for AdminRideFilter {
    fn from(value: AdminRideListQuery) -> Self {
        let AdminRideListQuery {
            status,
            user_id,
            start_date,
            end_date,
            search,
            page,
            limit,
        } = value;
        // カレンダー日付はここでローカルの絶対時刻範囲へ正規化する
        let (scheduled_from, scheduled_until) = range_bounds(start_date, end_date);
        AdminRideFilter {
            status: status.map(RideStatus::from),
            requested_by: user_id,
            scheduled_from,
            scheduled_until,
            search,
            options: ListOptions::new(page, limit),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DecideRideRequest {
    // 不正なトークンは InvalidAction として返すため、ここでは文字列で受ける
    #[garde(length(min = 1))]
    pub action: String,
    #[garde(inner(length(min = 5)))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideResponse {
    pub ride_id: RideId,
    pub requester: RideRequesterResponse,
    pub pickup_location: String,
    pub drop_location: String,
    pub scheduled_time: DateTime<Local>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub status: RideStatusName,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    pub admin_actions: Vec<AdminActionResponse>,
}

impl From<Ride> for RideResponse {
    fn from(value: Ride) -> Self {
        let Ride {
            ride_id,
            requester,
            pickup_location,
            drop_location,
            scheduled_time,
            purpose,
            notes,
            status,
            created_at,
            updated_at,
            admin_actions,
        } = value;
        Self {
            ride_id,
            requester: requester.into(),
            pickup_location,
            drop_location,
            scheduled_time,
            purpose,
            notes,
            status: status.into(),
            created_at,
            updated_at,
            admin_actions: admin_actions
                .into_iter()
                .map(AdminActionResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequesterResponse {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub company: Option<String>,
}

impl From<RideRequester> for RideRequesterResponse {
    fn from(value: RideRequester) -> Self {
        let RideRequester {
            user_id,
            user_name,
            email,
            company,
        } = value;
        Self {
            user_id,
            user_name,
            email,
            company,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionAdminResponse {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
}

impl From<ActionAdmin> for ActionAdminResponse {
    fn from(value: ActionAdmin) -> Self {
        let ActionAdmin {
            user_id,
            user_name,
            email,
        } = value;
        Self {
            user_id,
            user_name,
            email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminActionResponse {
    pub admin_action_id: AdminActionId,
    pub action: RideActionName,
    pub reason: Option<String>,
    pub admin: ActionAdminResponse,
    pub created_at: DateTime<Local>,
}

impl From<AdminAction> for AdminActionResponse {
    fn from(value: AdminAction) -> Self {
        let AdminAction {
            admin_action_id,
            action,
            reason,
            admin,
            created_at,
        } = value;
        Self {
            admin_action_id,
            action: action.into(),
            reason,
            admin: admin.into(),
            created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRideResponse {
    pub rides: Vec<RideResponse>,
    pub pagination: PaginationResponse,
}

impl From<PaginatedList<Ride>> for PaginatedRideResponse {
    fn from(value: PaginatedList<Ride>) -> Self {
        let pagination = PaginationResponse {
            page: value.page,
            limit: value.limit,
            total: value.total,
            pages: value.pages(),
        };
        Self {
            rides: value.items.into_iter().map(RideResponse::from).collect(),
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_enforces_field_lengths() {
        let req: CreateRideRequest = serde_json::from_value(serde_json::json!({
            "pickupLocation": "HQ",
            "dropLocation": "Airport Terminal 1",
            "scheduledTime": "2099-01-15T10:00:00+09:00"
        }))
        .unwrap();
        // 乗車地が 5 文字未満なので弾かれる
        assert!(req.validate(&()).is_err());

        let req: CreateRideRequest = serde_json::from_value(serde_json::json!({
            "pickupLocation": "Office Building A",
            "dropLocation": "Airport Terminal 1",
            "scheduledTime": "2099-01-15T10:00:00+09:00",
            "notes": "a".repeat(501)
        }))
        .unwrap();
        // 備考は 500 文字まで
        assert!(req.validate(&()).is_err());

        let req: CreateRideRequest = serde_json::from_value(serde_json::json!({
            "pickupLocation": "Office Building A",
            "dropLocation": "Airport Terminal 1",
            "scheduledTime": "2099-01-15T10:00:00+09:00",
            "purpose": "Client Meeting",
            "notes": "Need to arrive 30 minutes early"
        }))
        .unwrap();
        assert!(req.validate(&()).is_ok());
    }

    #[test]
    fn list_query_falls_back_to_default_pagination() {
        let query: RideListQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert!(query.validate(&()).is_ok());
    }

    #[test]
    fn list_query_rejects_out_of_range_pagination() {
        let query: RideListQuery =
            serde_json::from_value(serde_json::json!({ "page": 0 })).unwrap();
        assert!(query.validate(&()).is_err());

        let query: RideListQuery =
            serde_json::from_value(serde_json::json!({ "limit": 101 })).unwrap();
        assert!(query.validate(&()).is_err());
    }

    #[test]
    fn status_tokens_deserialize_in_screaming_snake_case() {
        let status: RideStatusName = serde_json::from_value(serde_json::json!("PENDING")).unwrap();
        assert_eq!(status, RideStatusName::Pending);
        assert!(serde_json::from_value::<RideStatusName>(serde_json::json!("pending")).is_err());
    }

    #[test]
    fn admin_query_converts_dates_to_inclusive_bounds() {
        let query: AdminRideListQuery = serde_json::from_value(serde_json::json!({
            "startDate": "2024-03-01",
            "endDate": "2024-03-31"
        }))
        .unwrap();
        let filter = AdminRideFilter::from(query);

        let from = filter.scheduled_from.unwrap();
        let until = filter.scheduled_until.unwrap();
        assert_eq!(from.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(until.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        // 終端はその日の 23:59:59.999
        assert!(until > from);
        assert_eq!(until.timestamp_subsec_millis(), 999);
    }
}
