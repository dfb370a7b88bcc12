//! 日付範囲の正規化ユーティリティ。
//!
//! カレンダー上の日付（ローカルタイムゾーン）を絶対時刻へ変換する処理を
//! ここへ集約する。`startDate 00:00:00.000` 〜 `endDate 23:59:59.999` という
//! 包含範囲の解釈は、予約の絞り込み・集計・ダッシュボードのすべてで共通。

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone,
};

// ローカル日付と時刻を絶対時刻に解決する。
// DST 切り替えで存在しない・曖昧な時刻は直近の有効時刻へ倒す。
fn at_local(date: NaiveDate, time: NaiveTime) -> DateTime<Local> {
    let naive = date.and_time(time);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => Local
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(Local::now),
    }
}

fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// その日の始まり（00:00:00.000）
pub fn start_of_day(date: NaiveDate) -> DateTime<Local> {
    at_local(date, NaiveTime::MIN)
}

/// その日の終わり（23:59:59.999）
pub fn end_of_day(date: NaiveDate) -> DateTime<Local> {
    at_local(date, end_of_day_time())
}

/// 包含的な日付範囲 `[start, end]` を絶対時刻の組に変換する。
/// 片側のみ指定された場合は指定側のみ Some になる。
pub fn range_bounds(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> (Option<DateTime<Local>>, Option<DateTime<Local>>) {
    (start_date.map(start_of_day), end_date.map(end_of_day))
}

/// 集計用の週の始まり。日曜 00:00 起点。
pub fn start_of_week(now: DateTime<Local>) -> DateTime<Local> {
    let days_from_sunday = now.weekday().num_days_from_sunday() as i64;
    start_of_day(now.date_naive() - Duration::days(days_from_sunday))
}

/// 集計用の月の始まり。
pub fn start_of_month(now: DateTime<Local>) -> DateTime<Local> {
    let first = now.date_naive().with_day(1).unwrap_or(now.date_naive());
    start_of_day(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Weekday};

    #[test]
    fn day_bounds_cover_the_full_local_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let start = start_of_day(date);
        let end = end_of_day(date);

        assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(end.timestamp_subsec_millis(), 999);
        assert!(start < end);
    }

    #[test]
    fn range_bounds_keep_unspecified_sides_open() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        let (start, end) = range_bounds(Some(date), None);
        assert!(start.is_some());
        assert!(end.is_none());

        let (start, end) = range_bounds(None, Some(date));
        assert!(start.is_none());
        assert_eq!(end.unwrap().date_naive(), date);
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-03-15 は金曜日
        let friday = start_of_day(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let week_start = start_of_week(friday);

        assert_eq!(week_start.weekday(), Weekday::Sun);
        assert_eq!(week_start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(week_start.hour(), 0);
    }

    #[test]
    fn sunday_is_its_own_week_start() {
        let sunday = start_of_day(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(start_of_week(sunday).date_naive(), sunday.date_naive());
    }

    #[test]
    fn month_starts_on_the_first() {
        let mid = start_of_day(NaiveDate::from_ymd_opt(2024, 2, 20).unwrap());
        let month_start = start_of_month(mid);

        assert_eq!(month_start.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(month_start.hour(), 0);
    }
}
