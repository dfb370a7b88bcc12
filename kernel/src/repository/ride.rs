use async_trait::async_trait;
use chrono::{DateTime, Local};
use shared::error::AppResult;

use crate::model::{
    id::{RideId, UserId},
    list::PaginatedList,
    ride::{
        event::{CancelRide, CompleteRide, CreateRide, DecideRide, UpdateRide},
        AdminRideFilter, OwnRideFilter, Ride,
    },
};

#[async_trait]
pub trait RideRepository: Send + Sync {
    // 新しい配車リクエストを PENDING で登録する
    async fn create(&self, event: CreateRide) -> AppResult<Ride>;
    // 申請者本人の配車リクエストを 1 件取得する
    async fn find_own_by_id(&self, ride_id: RideId, requested_by: UserId)
        -> AppResult<Option<Ride>>;
    // 申請者本人の配車リクエスト一覧をページ付きで取得する
    async fn find_own(&self, filter: OwnRideFilter) -> AppResult<PaginatedList<Ride>>;
    // 管理者向け。全配車リクエストを絞り込み・検索付きで取得する
    async fn find_all(&self, filter: AdminRideFilter) -> AppResult<PaginatedList<Ride>>;
    // PENDING の間だけ申請者本人がフィールドを編集できる
    async fn update_own(&self, event: UpdateRide) -> AppResult<Ride>;
    // 申請者本人によるキャンセル。監査レコードは残らない
    async fn cancel_own(&self, event: CancelRide) -> AppResult<Ride>;
    // 管理者判断。ステータス更新と監査レコード追記を 1 トランザクションで行う
    async fn decide(&self, event: DecideRide) -> AppResult<Ride>;
    // 完了シミュレーションの対象（承認済みかつ希望時刻超過）を取得する
    async fn find_eligible_for_completion(&self, now: DateTime<Local>) -> AppResult<Vec<Ride>>;
    // 完了シミュレーション。APPROVED -> COMPLETED のみ許可
    async fn complete(&self, event: CompleteRide) -> AppResult<Ride>;
    // 一括完了シミュレーション。APPROVED のものだけを個別に完了させる
    async fn complete_bulk(&self, ride_ids: Vec<RideId>) -> AppResult<Vec<Ride>>;
}
