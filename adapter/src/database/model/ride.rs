use chrono::{DateTime, Local};
use kernel::model::{
    admin_action::{ActionRide, AdminAction, AdminActionRecord},
    analytics::{StatusCount, TopRequester},
    id::{AdminActionId, RideId, UserId},
    ride::Ride,
    user::{ActionAdmin, RideRequester},
};
use shared::error::{AppError, AppResult};
use sqlx::FromRow;

// rides と users を JOIN した 1 行。監査レコードは別クエリで取得して
// `into_ride` で合流させる。
#[derive(Debug, FromRow)]
pub struct RideRow {
    pub ride_id: RideId,
    pub pickup_location: String,
    pub drop_location: String,
    pub scheduled_time: DateTime<Local>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub company: Option<String>,
}

impl RideRow {
    pub fn into_ride(self, admin_actions: Vec<AdminAction>) -> AppResult<Ride> {
        let status = self
            .status
            .parse()
            .map_err(|_| AppError::ConversionEntityError(self.status.clone()))?;
        Ok(Ride {
            ride_id: self.ride_id,
            requester: RideRequester {
                user_id: self.user_id,
                user_name: self.user_name,
                email: self.email,
                company: self.company,
            },
            pickup_location: self.pickup_location,
            drop_location: self.drop_location,
            scheduled_time: self.scheduled_time,
            purpose: self.purpose,
            notes: self.notes,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            admin_actions,
        })
    }
}

// admin_actions と判断した管理者を JOIN した 1 行（配車リクエスト配下の履歴用）
#[derive(Debug, FromRow)]
pub struct RideActionRow {
    pub admin_action_id: AdminActionId,
    pub ride_id: RideId,
    pub action: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Local>,
    pub admin_id: UserId,
    pub admin_name: String,
    pub admin_email: String,
}

impl RideActionRow {
    pub fn into_action(self) -> AppResult<(RideId, AdminAction)> {
        let action = self
            .action
            .parse()
            .map_err(|_| AppError::ConversionEntityError(self.action.clone()))?;
        Ok((
            self.ride_id,
            AdminAction {
                admin_action_id: self.admin_action_id,
                action,
                reason: self.reason,
                admin: ActionAdmin {
                    user_id: self.admin_id,
                    user_name: self.admin_name,
                    email: self.admin_email,
                },
                created_at: self.created_at,
            },
        ))
    }
}

// 監査フィード用。対象の配車リクエストと申請者まで JOIN した 1 行
#[derive(Debug, FromRow)]
pub struct AdminActionRecordRow {
    pub admin_action_id: AdminActionId,
    pub action: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Local>,
    pub admin_id: UserId,
    pub admin_name: String,
    pub admin_email: String,
    pub ride_id: RideId,
    pub pickup_location: String,
    pub drop_location: String,
    pub ride_status: String,
    pub requester_id: UserId,
    pub requester_name: String,
    pub requester_email: String,
    pub requester_company: Option<String>,
}

impl TryFrom<AdminActionRecordRow> for AdminActionRecord {
    type Error = AppError;

    fn try_from(row: AdminActionRecordRow) -> AppResult<Self> {
        let action = row
            .action
            .parse()
            .map_err(|_| AppError::ConversionEntityError(row.action.clone()))?;
        let ride_status = row
            .ride_status
            .parse()
            .map_err(|_| AppError::ConversionEntityError(row.ride_status.clone()))?;
        Ok(AdminActionRecord {
            admin_action_id: row.admin_action_id,
            action,
            reason: row.reason,
            admin: ActionAdmin {
                user_id: row.admin_id,
                user_name: row.admin_name,
                email: row.admin_email,
            },
            ride: ActionRide {
                ride_id: row.ride_id,
                pickup_location: row.pickup_location,
                drop_location: row.drop_location,
                status: ride_status,
                requester: RideRequester {
                    user_id: row.requester_id,
                    user_name: row.requester_name,
                    email: row.requester_email,
                    company: row.requester_company,
                },
            },
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct StatusCountRow {
    pub status: String,
    pub count: i64,
}

impl TryFrom<StatusCountRow> for StatusCount {
    type Error = AppError;

    fn try_from(row: StatusCountRow) -> AppResult<Self> {
        let status = row
            .status
            .parse()
            .map_err(|_| AppError::ConversionEntityError(row.status.clone()))?;
        Ok(StatusCount {
            status,
            count: row.count,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct TopRequesterRow {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub company: Option<String>,
    pub ride_count: i64,
}

impl From<TopRequesterRow> for TopRequester {
    fn from(row: TopRequesterRow) -> Self {
        TopRequester {
            requester: RideRequester {
                user_id: row.user_id,
                user_name: row.user_name,
                email: row.email,
                company: row.company,
            },
            ride_count: row.ride_count,
        }
    }
}
