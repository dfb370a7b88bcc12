use chrono::{DateTime, Local, NaiveDate};
use derive_new::new;
use kernel::model::{
    admin_action::{ActionRide, AdminActionRecord},
    analytics::{
        AnalyticsRange, DailyRideCount, Dashboard, DashboardSummary, StatusCount, TopRequester,
    },
    id::{AdminActionId, RideId},
};
use serde::{Deserialize, Serialize};
use shared::datetime::range_bounds;

use crate::model::ride::{
    ActionAdminResponse, RideActionName, RideRequesterResponse, RideResponse, RideStatusName,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<AnalyticsQuery> for AnalyticsRange {
    fn from(value: AnalyticsQuery) -> Self {
        let (from, until) = range_bounds(value.start_date, value.end_date);
        AnalyticsRange::new(from, until)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountResponse {
    pub status: RideStatusName,
    pub count: i64,
}

impl From<StatusCount> for StatusCountResponse {
    fn from(value: StatusCount) -> Self {
        Self {
            status: value.status.into(),
            count: value.count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRideCountResponse {
    pub date: NaiveDate,
    pub count: i64,
}

impl From<DailyRideCount> for DailyRideCountResponse {
    fn from(value: DailyRideCount) -> Self {
        Self {
            date: value.date,
            count: value.count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopRequesterResponse {
    pub user: RideRequesterResponse,
    pub ride_count: i64,
}

impl From<TopRequester> for TopRequesterResponse {
    fn from(value: TopRequester) -> Self {
        Self {
            user: value.requester.into(),
            ride_count: value.ride_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRideResponse {
    pub ride_id: RideId,
    pub pickup_location: String,
    pub drop_location: String,
    pub status: RideStatusName,
    pub requester: RideRequesterResponse,
}

impl From<ActionRide> for ActionRideResponse {
    fn from(value: ActionRide) -> Self {
        let ActionRide {
            ride_id,
            pickup_location,
            drop_location,
            status,
            requester,
        } = value;
        Self {
            ride_id,
            pickup_location,
            drop_location,
            status: status.into(),
            requester: requester.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminActionRecordResponse {
    pub admin_action_id: AdminActionId,
    pub action: RideActionName,
    pub reason: Option<String>,
    pub admin: ActionAdminResponse,
    pub ride: ActionRideResponse,
    pub created_at: DateTime<Local>,
}

impl From<AdminActionRecord> for AdminActionRecordResponse {
    fn from(value: AdminActionRecord) -> Self {
        let AdminActionRecord {
            admin_action_id,
            action,
            reason,
            admin,
            ride,
            created_at,
        } = value;
        Self {
            admin_action_id,
            action: action.into(),
            reason,
            admin: admin.into(),
            ride: ride.into(),
            created_at,
        }
    }
}

#[derive(Debug, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_rides: i64,
    pub rides_by_status: Vec<StatusCountResponse>,
    pub rides_per_day: Vec<DailyRideCountResponse>,
    pub top_users: Vec<TopRequesterResponse>,
    pub recent_admin_actions: Vec<AdminActionRecordResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummaryResponse {
    pub today_rides: i64,
    pub week_rides: i64,
    pub month_rides: i64,
    pub total_rides: i64,
    pub pending_rides: i64,
    pub approved_rides: i64,
}

impl From<DashboardSummary> for DashboardSummaryResponse {
    fn from(value: DashboardSummary) -> Self {
        let DashboardSummary {
            today_rides,
            week_rides,
            month_rides,
            total_rides,
            pending_rides,
            approved_rides,
        } = value;
        Self {
            today_rides,
            week_rides,
            month_rides,
            total_rides,
            pending_rides,
            approved_rides,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub summary: DashboardSummaryResponse,
    pub recent_rides: Vec<RideResponse>,
    pub recent_actions: Vec<AdminActionRecordResponse>,
}

impl From<Dashboard> for DashboardResponse {
    fn from(value: Dashboard) -> Self {
        let Dashboard {
            summary,
            recent_rides,
            recent_actions,
        } = value;
        Self {
            summary: summary.into(),
            recent_rides: recent_rides.into_iter().map(RideResponse::from).collect(),
            recent_actions: recent_actions
                .into_iter()
                .map(AdminActionRecordResponse::from)
                .collect(),
        }
    }
}
