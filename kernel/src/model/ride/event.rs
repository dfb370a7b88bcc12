use chrono::{DateTime, Local};
use derive_new::new;

use crate::model::{
    id::{RideId, UserId},
    ride::AdminRideAction,
};

#[derive(Debug, new)]
pub struct CreateRide {
    pub requested_by: UserId,
    pub pickup_location: String,
    pub drop_location: String,
    pub scheduled_time: DateTime<Local>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
}

// 指定のあったフィールドだけを上書きする
#[derive(Debug, new)]
pub struct UpdateRide {
    pub ride_id: RideId,
    pub requested_by: UserId,
    pub pickup_location: Option<String>,
    pub drop_location: Option<String>,
    pub scheduled_time: Option<DateTime<Local>>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, new)]
pub struct CancelRide {
    pub ride_id: RideId,
    pub requested_by: UserId,
}

#[derive(Debug, new)]
pub struct DecideRide {
    pub ride_id: RideId,
    pub decided_by: UserId,
    pub action: AdminRideAction,
    pub reason: Option<String>,
}

#[derive(Debug, new)]
pub struct CompleteRide {
    pub ride_id: RideId,
}
