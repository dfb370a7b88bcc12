use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use derive_new::new;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use kernel::model::{
    admin_action::AdminAction,
    id::{AdminActionId, RideId, UserId},
    list::PaginatedList,
    ride::{
        event::{CancelRide, CompleteRide, CreateRide, DecideRide, UpdateRide},
        schedule_is_future, AdminRideFilter, OwnRideFilter, Ride, RideStatus,
    },
};
use kernel::repository::ride::RideRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::ride::{RideActionRow, RideRow},
    ConnectionPool,
};

// rides と申請者を JOIN する共通 SELECT 句
const RIDE_SELECT: &str = r#"
    SELECT
        r.ride_id,
        r.pickup_location,
        r.drop_location,
        r.scheduled_time,
        r.purpose,
        r.notes,
        r.status,
        r.created_at,
        r.updated_at,
        u.user_id,
        u.user_name,
        u.email,
        u.company
    FROM rides AS r
    INNER JOIN users AS u ON r.user_id = u.user_id
"#;

#[derive(new)]
pub struct RideRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl RideRepository for RideRepositoryImpl {
    // 配車リクエストの作成を行う
    async fn create(&self, event: CreateRide) -> AppResult<Ride> {
        // 希望時刻の妥当性は作成時と PENDING 中の更新時にだけ確認する
        if !schedule_is_future(event.scheduled_time, Local::now()) {
            return Err(AppError::InvalidSchedule(
                "希望時刻には未来の時刻を指定してください。".into(),
            ));
        }

        let ride_id = RideId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO rides
                (ride_id, user_id, pickup_location, drop_location,
                scheduled_time, purpose, notes, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(ride_id)
        .bind(event.requested_by)
        .bind(&event.pickup_location)
        .bind(&event.drop_location)
        .bind(event.scheduled_time)
        .bind(&event.purpose)
        .bind(&event.notes)
        .bind(RideStatus::Pending.as_ref())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No ride record has been created".into(),
            ));
        }

        self.fetch_ride(ride_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "作成した配車リクエスト（{ride_id}）を取得できませんでした。"
            ))
        })
    }

    async fn find_own_by_id(
        &self,
        ride_id: RideId,
        requested_by: UserId,
    ) -> AppResult<Option<Ride>> {
        let row: Option<RideRow> =
            sqlx::query_as(&format!("{RIDE_SELECT} WHERE r.ride_id = $1 AND r.user_id = $2"))
                .bind(ride_id)
                .bind(requested_by)
                .fetch_optional(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let actions = self.fetch_actions_for(&[row.ride_id]).await?;
                Ok(Some(Self::assemble(row, actions)?))
            }
        }
    }

    // 申請者本人の一覧。希望時刻の新しい順
    async fn find_own(&self, filter: OwnRideFilter) -> AppResult<PaginatedList<Ride>> {
        let mut count_qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM rides AS r WHERE r.user_id = ");
        count_qb.push_bind(filter.requested_by);
        if let Some(status) = filter.status {
            count_qb
                .push(" AND r.status = ")
                .push_bind(status.as_ref().to_string());
        }
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(RIDE_SELECT);
        qb.push(" WHERE r.user_id = ").push_bind(filter.requested_by);
        if let Some(status) = filter.status {
            qb.push(" AND r.status = ")
                .push_bind(status.as_ref().to_string());
        }
        qb.push(" ORDER BY r.scheduled_time DESC LIMIT ")
            .push_bind(filter.options.limit)
            .push(" OFFSET ")
            .push_bind(filter.options.offset());

        let rows: Vec<RideRow> = qb
            .build_query_as()
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        let items = self.assemble_all(rows).await?;
        Ok(PaginatedList::new(
            total,
            filter.options.page,
            filter.options.limit,
            items,
        ))
    }

    // 管理者向けの全件一覧。ステータス・申請者・希望時刻範囲・
    // フリーワード検索（乗車地・降車地・目的・申請者名・メール・会社名の
    // 大文字小文字を区別しない部分一致の OR）で絞り込む
    async fn find_all(&self, filter: AdminRideFilter) -> AppResult<PaginatedList<Ride>> {
        let mut count_qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM rides AS r INNER JOIN users AS u ON r.user_id = u.user_id",
        );
        push_admin_filters(&mut count_qb, &filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(RIDE_SELECT);
        push_admin_filters(&mut qb, &filter);
        qb.push(" ORDER BY r.scheduled_time DESC LIMIT ")
            .push_bind(filter.options.limit)
            .push(" OFFSET ")
            .push_bind(filter.options.offset());

        let rows: Vec<RideRow> = qb
            .build_query_as()
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        let items = self.assemble_all(rows).await?;
        Ok(PaginatedList::new(
            total,
            filter.options.page,
            filter.options.limit,
            items,
        ))
    }

    // 申請者本人による編集操作を行う
    async fn update_own(&self, event: UpdateRide) -> AppResult<Ride> {
        let mut tx = self.db.begin().await?;

        // 事前のチェックとして、以下を調べる。
        // - 指定の配車リクエストが存在し、申請者本人のものか
        // - ステータスが PENDING のままか
        // - 希望時刻を変更する場合、それが未来の時刻か
        {
            let status = fetch_own_status_for_update(&mut tx, event.ride_id, event.requested_by)
                .await?;

            if status != RideStatus::Pending {
                return Err(AppError::InvalidState(
                    "PENDING の配車リクエストのみ編集できます。".into(),
                ));
            }

            if let Some(scheduled_time) = event.scheduled_time {
                if !schedule_is_future(scheduled_time, Local::now()) {
                    return Err(AppError::InvalidSchedule(
                        "希望時刻には未来の時刻を指定してください。".into(),
                    ));
                }
            }
        }

        // 指定のあったフィールドだけを COALESCE で上書きする
        let res = sqlx::query(
            r#"
                UPDATE rides
                SET
                    pickup_location = COALESCE($2, pickup_location),
                    drop_location = COALESCE($3, drop_location),
                    scheduled_time = COALESCE($4, scheduled_time),
                    purpose = COALESCE($5, purpose),
                    notes = COALESCE($6, notes),
                    updated_at = CURRENT_TIMESTAMP
                WHERE ride_id = $1
            "#,
        )
        .bind(event.ride_id)
        .bind(&event.pickup_location)
        .bind(&event.drop_location)
        .bind(event.scheduled_time)
        .bind(&event.purpose)
        .bind(&event.notes)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No ride record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.fetch_ride_or_not_found(event.ride_id).await
    }

    // 申請者本人によるキャンセル操作を行う。
    // 管理者判断とは異なり監査レコードは追記しない
    async fn cancel_own(&self, event: CancelRide) -> AppResult<Ride> {
        let mut tx = self.db.begin().await?;

        {
            let status = fetch_own_status_for_update(&mut tx, event.ride_id, event.requested_by)
                .await?;

            if !status.can_requester_cancel() {
                return Err(AppError::InvalidState(
                    "PENDING または APPROVED の配車リクエストのみキャンセルできます。".into(),
                ));
            }
        }

        let res = sqlx::query(
            r#"
                UPDATE rides
                SET status = $2, updated_at = CURRENT_TIMESTAMP
                WHERE ride_id = $1
            "#,
        )
        .bind(event.ride_id)
        .bind(RideStatus::Cancelled.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No ride record has been cancelled".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.fetch_ride_or_not_found(event.ride_id).await
    }

    // 管理者判断を実行する。ステータス更新と admin_actions への追記は
    // 必ず 1 トランザクションで行い、片方だけが残ることはない
    async fn decide(&self, event: DecideRide) -> AppResult<Ride> {
        let next_status = event.action.target_status();

        let mut tx = self.db.begin().await?;

        // 読み直しではなく UPDATE の WHERE 句で PENDING を確認する。
        // 同じ配車リクエストに二人の管理者が同時に判断した場合、
        // 後の方は rows_affected = 0 になり InvalidState で失敗する
        let res = sqlx::query(
            r#"
                UPDATE rides
                SET status = $2, updated_at = CURRENT_TIMESTAMP
                WHERE ride_id = $1 AND status = $3
            "#,
        )
        .bind(event.ride_id)
        .bind(next_status.as_ref())
        .bind(RideStatus::Pending.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            // 対象が存在しないのか、状態が進んでいたのかを切り分ける
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM rides WHERE ride_id = $1")
                    .bind(event.ride_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;

            return Err(match current {
                None => AppError::EntityNotFound(format!(
                    "配車リクエスト（{}）が見つかりませんでした。",
                    event.ride_id
                )),
                Some(status) => AppError::InvalidState(format!(
                    "PENDING の配車リクエストのみ判断できます（現在のステータス: {status}）。"
                )),
            });
        }

        let admin_action_id = AdminActionId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO admin_actions
                (admin_action_id, admin_id, ride_id, action, reason)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(admin_action_id)
        .bind(event.decided_by)
        .bind(event.ride_id)
        .bind(event.action.as_ref())
        .bind(&event.reason)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No admin action record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.fetch_ride_or_not_found(event.ride_id).await
    }

    // 完了シミュレーションの対象一覧を取得する。
    // 承認済みかつ希望時刻を過ぎたもの。希望時刻の新しい順
    async fn find_eligible_for_completion(&self, now: DateTime<Local>) -> AppResult<Vec<Ride>> {
        let rows: Vec<RideRow> = sqlx::query_as(&format!(
            "{RIDE_SELECT} WHERE r.status = $1 AND r.scheduled_time <= $2 \
             ORDER BY r.scheduled_time DESC"
        ))
        .bind(RideStatus::Approved.as_ref())
        .bind(now)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        self.assemble_all(rows).await
    }

    // 完了シミュレーションを実行する。
    // 時刻駆動の自動遷移の代用なので監査レコードは残さない
    async fn complete(&self, event: CompleteRide) -> AppResult<Ride> {
        let res = sqlx::query(
            r#"
                UPDATE rides
                SET status = $2, updated_at = CURRENT_TIMESTAMP
                WHERE ride_id = $1 AND status = $3
            "#,
        )
        .bind(event.ride_id)
        .bind(RideStatus::Completed.as_ref())
        .bind(RideStatus::Approved.as_ref())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM rides WHERE ride_id = $1")
                    .bind(event.ride_id)
                    .fetch_optional(self.db.inner_ref())
                    .await
                    .map_err(AppError::SpecificOperationError)?;

            return Err(match current {
                None => AppError::EntityNotFound(format!(
                    "配車リクエスト（{}）が見つかりませんでした。",
                    event.ride_id
                )),
                Some(status) => AppError::InvalidState(format!(
                    "APPROVED の配車リクエストのみ完了にできます（現在のステータス: {status}）。"
                )),
            });
        }

        self.fetch_ride_or_not_found(event.ride_id).await
    }

    // 一括完了シミュレーション。渡された ID のうち現在 APPROVED のものだけを
    // それぞれ独立に完了へ進める。対象外の ID は黙って除外する
    async fn complete_bulk(&self, ride_ids: Vec<RideId>) -> AppResult<Vec<Ride>> {
        let ids: Vec<Uuid> = ride_ids.iter().map(RideId::raw).collect();
        let eligible: Vec<RideId> = sqlx::query_scalar(
            "SELECT ride_id FROM rides WHERE ride_id = ANY($1) AND status = $2",
        )
        .bind(ids)
        .bind(RideStatus::Approved.as_ref())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if eligible.is_empty() {
            return Err(AppError::UnprocessableEntity(
                "完了にできる配車リクエストがありません。".into(),
            ));
        }

        // リクエスト間のアトミック性は提供しない。部分的な成功は意図どおり
        let mut completed = Vec::with_capacity(eligible.len());
        for ride_id in eligible {
            let res = sqlx::query(
                r#"
                    UPDATE rides
                    SET status = $2, updated_at = CURRENT_TIMESTAMP
                    WHERE ride_id = $1 AND status = $3
                "#,
            )
            .bind(ride_id)
            .bind(RideStatus::Completed.as_ref())
            .bind(RideStatus::Approved.as_ref())
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

            // 直前に他の操作で状態が進んでいた場合もエラーにせず除外する
            if res.rows_affected() < 1 {
                continue;
            }

            completed.push(self.fetch_ride_or_not_found(ride_id).await?);
        }

        Ok(completed)
    }
}

impl RideRepositoryImpl {
    // 作成の新しい順の一覧。ダッシュボードの「最近の配車リクエスト」用
    pub async fn find_recently_created(&self, limit: i64) -> AppResult<Vec<Ride>> {
        let rows: Vec<RideRow> =
            sqlx::query_as(&format!("{RIDE_SELECT} ORDER BY r.created_at DESC LIMIT $1"))
                .bind(limit)
                .fetch_all(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;

        self.assemble_all(rows).await
    }

    async fn fetch_ride(&self, ride_id: RideId) -> AppResult<Option<Ride>> {
        let row: Option<RideRow> = sqlx::query_as(&format!("{RIDE_SELECT} WHERE r.ride_id = $1"))
            .bind(ride_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let actions = self.fetch_actions_for(&[row.ride_id]).await?;
                Ok(Some(Self::assemble(row, actions)?))
            }
        }
    }

    async fn fetch_ride_or_not_found(&self, ride_id: RideId) -> AppResult<Ride> {
        self.fetch_ride(ride_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!("配車リクエスト（{ride_id}）が見つかりませんでした。"))
        })
    }

    // 指定の配車リクエスト群に紐づく監査レコードを新しい順でまとめて引く
    async fn fetch_actions_for(
        &self,
        ride_ids: &[RideId],
    ) -> AppResult<HashMap<RideId, Vec<AdminAction>>> {
        if ride_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<Uuid> = ride_ids.iter().map(RideId::raw).collect();
        let rows: Vec<RideActionRow> = sqlx::query_as(
            r#"
                SELECT
                    a.admin_action_id,
                    a.ride_id,
                    a.action,
                    a.reason,
                    a.created_at,
                    ad.user_id AS admin_id,
                    ad.user_name AS admin_name,
                    ad.email AS admin_email
                FROM admin_actions AS a
                INNER JOIN users AS ad ON a.admin_id = ad.user_id
                WHERE a.ride_id = ANY($1)
                ORDER BY a.created_at DESC
            "#,
        )
        .bind(ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut grouped: HashMap<RideId, Vec<AdminAction>> = HashMap::new();
        for row in rows {
            let (ride_id, action) = row.into_action()?;
            grouped.entry(ride_id).or_default().push(action);
        }
        Ok(grouped)
    }

    fn assemble(row: RideRow, mut actions: HashMap<RideId, Vec<AdminAction>>) -> AppResult<Ride> {
        let ride_actions = actions.remove(&row.ride_id).unwrap_or_default();
        row.into_ride(ride_actions)
    }

    async fn assemble_all(&self, rows: Vec<RideRow>) -> AppResult<Vec<Ride>> {
        let ride_ids: Vec<RideId> = rows.iter().map(|row| row.ride_id).collect();
        let mut actions = self.fetch_actions_for(&ride_ids).await?;
        rows.into_iter()
            .map(|row| {
                let ride_actions = actions.remove(&row.ride_id).unwrap_or_default();
                row.into_ride(ride_actions)
            })
            .collect()
    }
}

// 本人確認込みで現在のステータスを取得し、行ロックを取る
async fn fetch_own_status_for_update(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    ride_id: RideId,
    requested_by: UserId,
) -> AppResult<RideStatus> {
    let status: Option<String> = sqlx::query_scalar(
        "SELECT status FROM rides WHERE ride_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(ride_id)
    .bind(requested_by)
    .fetch_optional(&mut **tx)
    .await
    .map_err(AppError::SpecificOperationError)?;

    let status = status.ok_or_else(|| {
        AppError::EntityNotFound(format!("配車リクエスト（{ride_id}）が見つかりませんでした。"))
    })?;

    status
        .parse()
        .map_err(|_| AppError::ConversionEntityError(status.clone()))
}

// 管理者一覧の絞り込み条件を WHERE 句として積む。
// 件数クエリと一覧クエリの両方で同じ条件を使うための共通化
fn push_admin_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &AdminRideFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(status) = filter.status {
        qb.push(" AND r.status = ")
            .push_bind(status.as_ref().to_string());
    }
    if let Some(requested_by) = filter.requested_by {
        qb.push(" AND r.user_id = ").push_bind(requested_by);
    }
    if let Some(from) = filter.scheduled_from {
        qb.push(" AND r.scheduled_time >= ").push_bind(from);
    }
    if let Some(until) = filter.scheduled_until {
        qb.push(" AND r.scheduled_time <= ").push_bind(until);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (r.pickup_location ILIKE ")
            .push_bind(pattern.clone());
        qb.push(" OR r.drop_location ILIKE ").push_bind(pattern.clone());
        qb.push(" OR COALESCE(r.purpose, '') ILIKE ")
            .push_bind(pattern.clone());
        qb.push(" OR u.user_name ILIKE ").push_bind(pattern.clone());
        qb.push(" OR u.email ILIKE ").push_bind(pattern.clone());
        qb.push(" OR COALESCE(u.company, '') ILIKE ").push_bind(pattern);
        qb.push(")");
    }
}
