use chrono::{DateTime, Local};
use derive_new::new;
use strum::{AsRefStr, EnumIter, EnumString};

use crate::model::{
    admin_action::AdminAction,
    id::{RideId, UserId},
    list::ListOptions,
    user::RideRequester,
};

pub mod event;

/// 配車リクエストのステータス。
///
/// 遷移できる組み合わせは以下のみ。
///   PENDING  → APPROVED / REJECTED / CANCELLED
///   APPROVED → CANCELLED / COMPLETED
/// REJECTED・CANCELLED・COMPLETED は終端で、以降の遷移はない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl RideStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RideStatus::Rejected | RideStatus::Cancelled | RideStatus::Completed
        )
    }

    pub fn can_transition_to(self, next: RideStatus) -> bool {
        matches!(
            (self, next),
            (RideStatus::Pending, RideStatus::Approved)
                | (RideStatus::Pending, RideStatus::Rejected)
                | (RideStatus::Pending, RideStatus::Cancelled)
                | (RideStatus::Approved, RideStatus::Cancelled)
                | (RideStatus::Approved, RideStatus::Completed)
        )
    }

    // 申請者自身のキャンセルは PENDING と APPROVED のみ許可する。
    // 管理者の CANCEL（PENDING のみ）とは別経路であることに注意。
    pub fn can_requester_cancel(self) -> bool {
        matches!(self, RideStatus::Pending | RideStatus::Approved)
    }
}

/// 管理者が配車リクエストに下せる判断。
/// いずれも対象が PENDING のときだけ有効。
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRideAction {
    Approve,
    Reject,
    Cancel,
}

impl AdminRideAction {
    pub fn target_status(self) -> RideStatus {
        match self {
            AdminRideAction::Approve => RideStatus::Approved,
            AdminRideAction::Reject => RideStatus::Rejected,
            AdminRideAction::Cancel => RideStatus::Cancelled,
        }
    }
}

/// 希望時刻の妥当性チェック。作成時と PENDING 中の更新時にのみ適用する。
pub fn schedule_is_future(scheduled_time: DateTime<Local>, now: DateTime<Local>) -> bool {
    scheduled_time > now
}

/// 完了シミュレーションの対象になれるか。
/// 承認済みで、かつ希望時刻を過ぎている配車リクエストのみ。
pub fn is_eligible_for_completion(
    status: RideStatus,
    scheduled_time: DateTime<Local>,
    now: DateTime<Local>,
) -> bool {
    status == RideStatus::Approved && scheduled_time <= now
}

#[derive(Debug)]
pub struct Ride {
    pub ride_id: RideId,
    pub requester: RideRequester,
    pub pickup_location: String,
    pub drop_location: String,
    pub scheduled_time: DateTime<Local>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub status: RideStatus,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    pub admin_actions: Vec<AdminAction>,
}

#[derive(Debug, new)]
pub struct OwnRideFilter {
    pub requested_by: UserId,
    pub status: Option<RideStatus>,
    pub options: ListOptions,
}

#[derive(Debug, new)]
pub struct AdminRideFilter {
    pub status: Option<RideStatus>,
    pub requested_by: Option<UserId>,
    pub scheduled_from: Option<DateTime<Local>>,
    pub scheduled_until: Option<DateTime<Local>>,
    pub search: Option<String>,
    pub options: ListOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use strum::IntoEnumIterator;

    // 正当な遷移エッジの全列挙
    const LEGAL_EDGES: [(RideStatus, RideStatus); 5] = [
        (RideStatus::Pending, RideStatus::Approved),
        (RideStatus::Pending, RideStatus::Rejected),
        (RideStatus::Pending, RideStatus::Cancelled),
        (RideStatus::Approved, RideStatus::Cancelled),
        (RideStatus::Approved, RideStatus::Completed),
    ];

    #[test]
    fn transitions_are_exactly_the_legal_edges() {
        for from in RideStatus::iter() {
            for to in RideStatus::iter() {
                let expected = LEGAL_EDGES.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outbound_transitions() {
        for from in RideStatus::iter().filter(|s| s.is_terminal()) {
            for to in RideStatus::iter() {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn admin_actions_map_to_their_target_status() {
        assert_eq!(AdminRideAction::Approve.target_status(), RideStatus::Approved);
        assert_eq!(AdminRideAction::Reject.target_status(), RideStatus::Rejected);
        assert_eq!(AdminRideAction::Cancel.target_status(), RideStatus::Cancelled);
    }

    #[test]
    fn every_admin_action_is_a_legal_transition_from_pending() {
        for action in AdminRideAction::iter() {
            assert!(RideStatus::Pending.can_transition_to(action.target_status()));
        }
    }

    #[test]
    fn requester_cancel_is_limited_to_pending_and_approved() {
        for status in RideStatus::iter() {
            let expected = matches!(status, RideStatus::Pending | RideStatus::Approved);
            assert_eq!(status.can_requester_cancel(), expected, "{status:?}");
        }
    }

    #[test]
    fn schedule_must_be_strictly_future() {
        let now = Local::now();
        assert!(schedule_is_future(now + Duration::hours(1), now));
        assert!(!schedule_is_future(now, now));
        assert!(!schedule_is_future(now - Duration::hours(1), now));
    }

    #[test]
    fn completion_eligibility_requires_approved_and_overdue() {
        let now = Local::now();
        let overdue = now - Duration::minutes(10);
        let upcoming = now + Duration::minutes(10);

        assert!(is_eligible_for_completion(RideStatus::Approved, overdue, now));
        // 希望時刻ちょうども対象に含まれる
        assert!(is_eligible_for_completion(RideStatus::Approved, now, now));
        assert!(!is_eligible_for_completion(RideStatus::Approved, upcoming, now));
        assert!(!is_eligible_for_completion(RideStatus::Pending, overdue, now));
        assert!(!is_eligible_for_completion(RideStatus::Completed, overdue, now));
    }

    #[test]
    fn status_tokens_round_trip_through_strum() {
        for status in RideStatus::iter() {
            let token = status.as_ref();
            assert_eq!(token, token.to_uppercase());
            assert_eq!(token.parse::<RideStatus>().ok(), Some(status));
        }
        assert!("DRIVING".parse::<RideStatus>().is_err());
    }
}
