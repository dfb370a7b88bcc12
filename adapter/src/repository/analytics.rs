use async_trait::async_trait;
use chrono::{DateTime, Duration, Local};
use derive_new::new;
use sqlx::{Postgres, QueryBuilder};

use kernel::model::{
    admin_action::AdminActionRecord,
    analytics::{
        daily_histogram, AnalyticsRange, DailyRideCount, Dashboard, DashboardSummary,
        StatusCount, TopRequester,
    },
    ride::{Ride, RideStatus},
};
use kernel::repository::analytics::AnalyticsRepository;
use shared::{
    datetime::{end_of_day, start_of_day, start_of_month, start_of_week},
    error::{AppError, AppResult},
};

use crate::database::{
    model::ride::{AdminActionRecordRow, StatusCountRow, TopRequesterRow},
    ConnectionPool,
};
use crate::repository::ride::RideRepositoryImpl;

// 監査フィードの共通 SELECT 句。判断した管理者と対象の配車リクエスト、
// その申請者までを 1 行に JOIN する
const ACTION_RECORD_SELECT: &str = r#"
    SELECT
        a.admin_action_id,
        a.action,
        a.reason,
        a.created_at,
        ad.user_id AS admin_id,
        ad.user_name AS admin_name,
        ad.email AS admin_email,
        r.ride_id,
        r.pickup_location,
        r.drop_location,
        r.status AS ride_status,
        ru.user_id AS requester_id,
        ru.user_name AS requester_name,
        ru.email AS requester_email,
        ru.company AS requester_company
    FROM admin_actions AS a
    INNER JOIN users AS ad ON a.admin_id = ad.user_id
    INNER JOIN rides AS r ON a.ride_id = r.ride_id
    INNER JOIN users AS ru ON r.user_id = ru.user_id
"#;

#[derive(new)]
pub struct AnalyticsRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl AnalyticsRepository for AnalyticsRepositoryImpl {
    async fn count_total(&self, range: &AnalyticsRange) -> AppResult<i64> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM rides WHERE 1 = 1");
        push_scheduled_range(&mut qb, range);

        qb.build_query_scalar()
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)
    }

    async fn count_by_status(&self, range: &AnalyticsRange) -> AppResult<Vec<StatusCount>> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT status, COUNT(*) AS count FROM rides WHERE 1 = 1");
        push_scheduled_range(&mut qb, range);
        qb.push(" GROUP BY status ORDER BY count DESC, status ASC");

        let rows: Vec<StatusCountRow> = qb
            .build_query_as()
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(StatusCount::try_from).collect()
    }

    // 日別の件数。バケット詰めはローカル日付基準の純粋関数に寄せているため、
    // ここでは範囲内の希望時刻を引くだけ
    async fn rides_per_day(
        &self,
        range: &AnalyticsRange,
        now: DateTime<Local>,
    ) -> AppResult<Vec<DailyRideCount>> {
        // 範囲の指定がないときは直近 30 日を対象にする
        let from = range.from.unwrap_or(now - Duration::days(30));

        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT scheduled_time FROM rides WHERE scheduled_time >= ");
        qb.push_bind(from);
        if let Some(until) = range.until {
            qb.push(" AND scheduled_time <= ").push_bind(until);
        }

        let scheduled_times: Vec<DateTime<Local>> = qb
            .build_query_scalar()
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(daily_histogram(&scheduled_times))
    }

    // 申請数の多いユーザー上位。退会等でユーザーが引けない申請は
    // INNER JOIN により結果から除外される
    async fn top_requesters(
        &self,
        range: &AnalyticsRange,
        limit: i64,
    ) -> AppResult<Vec<TopRequester>> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            r#"
                SELECT
                    u.user_id,
                    u.user_name,
                    u.email,
                    u.company,
                    COUNT(*) AS ride_count
                FROM rides AS r
                INNER JOIN users AS u ON r.user_id = u.user_id
                WHERE 1 = 1
            "#,
        );
        push_scheduled_range_aliased(&mut qb, range);
        // 同数のときの並びをユーザー ID で安定させる
        qb.push(
            " GROUP BY u.user_id, u.user_name, u.email, u.company \
             ORDER BY ride_count DESC, u.user_id ASC LIMIT ",
        )
        .push_bind(limit);

        let rows: Vec<TopRequesterRow> = qb
            .build_query_as()
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(TopRequester::from).collect())
    }

    // 直近の管理者判断。配車リクエストの希望時刻ではなく、
    // 判断そのものの作成時刻で絞り込む
    async fn recent_admin_actions(
        &self,
        range: &AnalyticsRange,
        limit: i64,
    ) -> AppResult<Vec<AdminActionRecord>> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(ACTION_RECORD_SELECT);
        qb.push(" WHERE 1 = 1");
        if let Some(from) = range.from {
            qb.push(" AND a.created_at >= ").push_bind(from);
        }
        if let Some(until) = range.until {
            qb.push(" AND a.created_at <= ").push_bind(until);
        }
        qb.push(" ORDER BY a.created_at DESC LIMIT ").push_bind(limit);

        let rows: Vec<AdminActionRecordRow> = qb
            .build_query_as()
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(AdminActionRecord::try_from).collect()
    }

    async fn dashboard(&self, now: DateTime<Local>) -> AppResult<Dashboard> {
        let today = now.date_naive();

        let today_rides = self
            .count_scheduled_between(Some(start_of_day(today)), Some(end_of_day(today)))
            .await?;
        let week_rides = self
            .count_scheduled_between(Some(start_of_week(now)), None)
            .await?;
        let month_rides = self
            .count_scheduled_between(Some(start_of_month(now)), None)
            .await?;
        let total_rides = self.count_scheduled_between(None, None).await?;
        let pending_rides = self.count_with_status(RideStatus::Pending).await?;
        let approved_rides = self.count_with_status(RideStatus::Approved).await?;

        let recent_rides = self.recent_rides(5).await?;
        let recent_actions = self
            .recent_admin_actions(&AnalyticsRange::default(), 5)
            .await?;

        Ok(Dashboard {
            summary: DashboardSummary {
                today_rides,
                week_rides,
                month_rides,
                total_rides,
                pending_rides,
                approved_rides,
            },
            recent_rides,
            recent_actions,
        })
    }
}

impl AnalyticsRepositoryImpl {
    async fn count_scheduled_between(
        &self,
        from: Option<DateTime<Local>>,
        until: Option<DateTime<Local>>,
    ) -> AppResult<i64> {
        let range = AnalyticsRange::new(from, until);
        self.count_total(&range).await
    }

    async fn count_with_status(&self, status: RideStatus) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM rides WHERE status = $1")
            .bind(status.as_ref())
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)
    }

    // 作成の新しい順の配車リクエスト。履歴付きの組み立ては
    // 配車リクエスト側のリポジトリに委ねる
    async fn recent_rides(&self, limit: i64) -> AppResult<Vec<Ride>> {
        let ride_repo = RideRepositoryImpl::new(self.db.clone());
        ride_repo.find_recently_created(limit).await
    }
}

fn push_scheduled_range(qb: &mut QueryBuilder<'_, Postgres>, range: &AnalyticsRange) {
    if let Some(from) = range.from {
        qb.push(" AND scheduled_time >= ").push_bind(from);
    }
    if let Some(until) = range.until {
        qb.push(" AND scheduled_time <= ").push_bind(until);
    }
}

fn push_scheduled_range_aliased(qb: &mut QueryBuilder<'_, Postgres>, range: &AnalyticsRange) {
    if let Some(from) = range.from {
        qb.push(" AND r.scheduled_time >= ").push_bind(from);
    }
    if let Some(until) = range.until {
        qb.push(" AND r.scheduled_time <= ").push_bind(until);
    }
}
