use adapter::database::{connect_database_with, ConnectionPool};
use anyhow::Result;
use chrono::{Duration, Local};
use kernel::model::{
    id::{RideId, UserId},
    ride::{
        event::{CompleteRide, CreateRide, DecideRide},
        AdminRideAction,
    },
};
use kernel::repository::ride::RideRepository;
use shared::config::AppConfig;

use adapter::repository::ride::RideRepositoryImpl;

// デモ・動作確認用の初期データ投入ツール。
// ユーザーは upsert、配車リクエストは空のときだけ投入する
#[tokio::main]
async fn main() -> Result<()> {
    let app_config = AppConfig::new()?;
    let pool = connect_database_with(&app_config.database);

    println!("🌱 シードデータの投入を開始します");

    let admin = upsert_user(
        &pool,
        "Admin User",
        "admin@rapido.com",
        "admin123",
        Some("+1234567890"),
        Some("Rapido"),
        "ADMIN",
    )
    .await?;
    let john = upsert_user(
        &pool,
        "John Doe",
        "john.doe@company.com",
        "user123",
        Some("+1234567891"),
        Some("Tech Corp"),
        "USER",
    )
    .await?;
    let jane = upsert_user(
        &pool,
        "Jane Smith",
        "jane.smith@company.com",
        "user123",
        Some("+1234567892"),
        Some("Innovation Inc"),
        "USER",
    )
    .await?;
    let mike = upsert_user(
        &pool,
        "Mike Johnson",
        "mike.johnson@company.com",
        "user123",
        Some("+1234567893"),
        Some("Startup XYZ"),
        "USER",
    )
    .await?;

    let ride_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rides")
        .fetch_one(pool.inner_ref())
        .await?;
    if ride_count > 0 {
        println!("配車リクエストは既に存在するためスキップします");
        return Ok(());
    }

    let ride_repo = RideRepositoryImpl::new(pool.clone());
    let now = Local::now();

    // PENDING のまま残すリクエスト
    ride_repo
        .create(CreateRide::new(
            john,
            "Office Building A".into(),
            "Airport Terminal 1".into(),
            now + Duration::days(1),
            Some("Client Meeting".into()),
            Some("Need to arrive 30 minutes early".into()),
        ))
        .await?;
    ride_repo
        .create(CreateRide::new(
            mike,
            "Startup XYZ Office".into(),
            "Convention Center".into(),
            now + Duration::days(1) + Duration::hours(3),
            Some("Tech Conference".into()),
            None,
        ))
        .await?;

    // 承認済みのリクエスト
    let approved = ride_repo
        .create(CreateRide::new(
            john,
            "Tech Corp Headquarters".into(),
            "Downtown Hotel".into(),
            now + Duration::days(2),
            Some("Business Dinner".into()),
            None,
        ))
        .await?;
    ride_repo
        .decide(DecideRide::new(
            approved.ride_id,
            admin,
            AdminRideAction::Approve,
            None,
        ))
        .await?;

    // 却下されたリクエスト
    let rejected = ride_repo
        .create(CreateRide::new(
            jane,
            "Innovation Inc Lobby".into(),
            "City Airport".into(),
            now + Duration::days(3),
            Some("Overseas Trip".into()),
            None,
        ))
        .await?;
    ride_repo
        .decide(DecideRide::new(
            rejected.ride_id,
            admin,
            AdminRideAction::Reject,
            Some("社用車の空きがありません。".into()),
        ))
        .await?;

    // 完了シミュレーションの対象になる、希望時刻超過の承認済みリクエスト
    let overdue = ride_repo
        .create(CreateRide::new(
            jane,
            "Innovation Inc Lobby".into(),
            "Client Office Tower".into(),
            now + Duration::days(1),
            Some("Contract Signing".into()),
            None,
        ))
        .await?;
    ride_repo
        .decide(DecideRide::new(
            overdue.ride_id,
            admin,
            AdminRideAction::Approve,
            None,
        ))
        .await?;
    backdate_ride(&pool, overdue.ride_id, now - Duration::hours(2)).await?;

    // 完了済みのリクエスト
    let completed = ride_repo
        .create(CreateRide::new(
            mike,
            "Startup XYZ Office".into(),
            "Main Station".into(),
            now + Duration::days(1),
            Some("Investor Meeting".into()),
            None,
        ))
        .await?;
    ride_repo
        .decide(DecideRide::new(
            completed.ride_id,
            admin,
            AdminRideAction::Approve,
            None,
        ))
        .await?;
    backdate_ride(&pool, completed.ride_id, now - Duration::days(1)).await?;
    ride_repo.complete(CompleteRide::new(completed.ride_id)).await?;

    println!("✅ シードデータの投入が完了しました");

    Ok(())
}

async fn upsert_user(
    pool: &ConnectionPool,
    user_name: &str,
    email: &str,
    password: &str,
    phone: Option<&str>,
    company: Option<&str>,
    role: &str,
) -> Result<UserId> {
    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    let user_id: UserId = sqlx::query_scalar(
        r#"
            INSERT INTO users
            (user_id, user_name, email, password_hash, phone, company, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO UPDATE
            SET
                user_name = EXCLUDED.user_name,
                password_hash = EXCLUDED.password_hash,
                phone = EXCLUDED.phone,
                company = EXCLUDED.company,
                role = EXCLUDED.role
            RETURNING user_id
        "#,
    )
    .bind(UserId::new())
    .bind(user_name)
    .bind(email)
    .bind(&password_hash)
    .bind(phone)
    .bind(company)
    .bind(role)
    .fetch_one(pool.inner_ref())
    .await?;

    println!("  ユーザーを登録しました: {email}");
    Ok(user_id)
}

// 作成時の未来時刻チェックを通したあとで、動作確認用に希望時刻を過去へずらす
async fn backdate_ride(
    pool: &ConnectionPool,
    ride_id: RideId,
    scheduled_time: chrono::DateTime<Local>,
) -> Result<()> {
    sqlx::query("UPDATE rides SET scheduled_time = $2 WHERE ride_id = $1")
        .bind(ride_id)
        .bind(scheduled_time)
        .execute(pool.inner_ref())
        .await?;
    Ok(())
}
