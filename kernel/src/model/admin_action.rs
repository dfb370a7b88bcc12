use chrono::{DateTime, Local};

use crate::model::{
    id::{AdminActionId, RideId},
    ride::{AdminRideAction, RideStatus},
    user::{ActionAdmin, RideRequester},
};

/// 管理者判断の監査レコード。`decide` の成功ごとにちょうど 1 件追記され、
/// 以後更新も削除もされない。
#[derive(Debug, Clone)]
pub struct AdminAction {
    pub admin_action_id: AdminActionId,
    pub action: AdminRideAction,
    pub reason: Option<String>,
    pub admin: ActionAdmin,
    pub created_at: DateTime<Local>,
}

/// 監査フィード用。対象の配車リクエストの概要も一緒に持つ。
#[derive(Debug, Clone)]
pub struct AdminActionRecord {
    pub admin_action_id: AdminActionId,
    pub action: AdminRideAction,
    pub reason: Option<String>,
    pub admin: ActionAdmin,
    pub ride: ActionRide,
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct ActionRide {
    pub ride_id: RideId,
    pub pickup_location: String,
    pub drop_location: String,
    pub status: RideStatus,
    pub requester: RideRequester,
}
