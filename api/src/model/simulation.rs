use garde::Validate;
use kernel::model::{id::RideId, ride::Ride};
use serde::{Deserialize, Serialize};

use crate::model::ride::RideResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkCompleteRequest {
    #[garde(length(min = 1))]
    pub ride_ids: Vec<RideId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleRidesResponse {
    pub eligible_rides: Vec<RideResponse>,
    pub count: usize,
}

impl From<Vec<Ride>> for EligibleRidesResponse {
    fn from(value: Vec<Ride>) -> Self {
        let eligible_rides: Vec<RideResponse> =
            value.into_iter().map(RideResponse::from).collect();
        Self {
            count: eligible_rides.len(),
            eligible_rides,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCompleteResponse {
    pub completed_rides: Vec<RideResponse>,
    pub count: usize,
}

impl From<Vec<Ride>> for BulkCompleteResponse {
    fn from(value: Vec<Ride>) -> Self {
        let completed_rides: Vec<RideResponse> =
            value.into_iter().map(RideResponse::from).collect();
        Self {
            count: completed_rides.len(),
            completed_rides,
        }
    }
}
