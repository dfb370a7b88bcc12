use garde::Validate;
use kernel::model::id::UserId;
use serde::{Deserialize, Serialize};

use crate::model::user::RoleName;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub user_id: UserId,
    pub role: RoleName,
    pub access_token: String,
}
