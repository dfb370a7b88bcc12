use async_trait::async_trait;
use chrono::{DateTime, Local};
use shared::error::AppResult;

use crate::model::{
    admin_action::AdminActionRecord,
    analytics::{AnalyticsRange, DailyRideCount, Dashboard, StatusCount, TopRequester},
};

/// 集計専用の読み取り側。一切の更新を行わない。
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    // 範囲内の配車リクエスト総数
    async fn count_total(&self, range: &AnalyticsRange) -> AppResult<i64>;
    // ステータスごとの件数内訳
    async fn count_by_status(&self, range: &AnalyticsRange) -> AppResult<Vec<StatusCount>>;
    // 日別件数。範囲指定がなければ now の 30 日前を下限にする
    async fn rides_per_day(
        &self,
        range: &AnalyticsRange,
        now: DateTime<Local>,
    ) -> AppResult<Vec<DailyRideCount>>;
    // 申請数の多いユーザー上位。件数降順、同数はユーザー ID で安定化
    async fn top_requesters(
        &self,
        range: &AnalyticsRange,
        limit: i64,
    ) -> AppResult<Vec<TopRequester>>;
    // 直近の管理者判断。判断自体の作成時刻で絞り込む
    async fn recent_admin_actions(
        &self,
        range: &AnalyticsRange,
        limit: i64,
    ) -> AppResult<Vec<AdminActionRecord>>;
    // ダッシュボード集計（当日・今週・今月・全期間などのまとめ）
    async fn dashboard(&self, now: DateTime<Local>) -> AppResult<Dashboard>;
}
