use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use derive_new::new;

use crate::model::{
    admin_action::AdminActionRecord,
    ride::{Ride, RideStatus},
    user::RideRequester,
};

/// 集計の絞り込みに使う絶対時刻の範囲。
/// `shared::datetime::range_bounds` で日付から変換したものを渡す。
#[derive(Debug, Clone, Copy, Default, new)]
pub struct AnalyticsRange {
    pub from: Option<DateTime<Local>>,
    pub until: Option<DateTime<Local>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct StatusCount {
    pub status: RideStatus,
    pub count: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DailyRideCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug)]
pub struct TopRequester {
    pub requester: RideRequester,
    pub ride_count: i64,
}

#[derive(Debug)]
pub struct DashboardSummary {
    pub today_rides: i64,
    pub week_rides: i64,
    pub month_rides: i64,
    pub total_rides: i64,
    pub pending_rides: i64,
    pub approved_rides: i64,
}

#[derive(Debug)]
pub struct Dashboard {
    pub summary: DashboardSummary,
    pub recent_rides: Vec<Ride>,
    pub recent_actions: Vec<AdminActionRecord>,
}

/// 希望時刻の列をローカル日付ごとに数え上げる。
/// 1 件以上ある日付だけをバケットにし、日付の降順で返す（疎なヒストグラム）。
pub fn daily_histogram(scheduled_times: &[DateTime<Local>]) -> Vec<DailyRideCount> {
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for scheduled_time in scheduled_times {
        *buckets.entry(scheduled_time.date_naive()).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .rev()
        .map(|(date, count)| DailyRideCount { date, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    fn at(date: (i32, u32, u32), hour: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap());
        Local.from_local_datetime(&naive).unwrap()
    }

    #[test]
    fn histogram_is_sparse_and_descending() {
        let times = vec![
            at((2024, 3, 1), 9),
            at((2024, 3, 1), 18),
            // 3/2 は 0 件
            at((2024, 3, 3), 7),
            at((2024, 3, 10), 12),
        ];

        let histogram = daily_histogram(&times);

        assert_eq!(
            histogram,
            vec![
                DailyRideCount {
                    date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                    count: 1,
                },
                DailyRideCount {
                    date: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
                    count: 1,
                },
                DailyRideCount {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    count: 2,
                },
            ]
        );
    }

    #[test]
    fn bucket_counts_sum_to_the_input_size() {
        let times: Vec<_> = (0..7u32)
            .map(|i| at((2024, 5, 1 + (i % 3)), 8 + i))
            .collect();

        let histogram = daily_histogram(&times);

        let total: i64 = histogram.iter().map(|b| b.count).sum();
        assert_eq!(total, times.len() as i64);
        // ゼロ件のバケットは存在しない
        assert!(histogram.iter().all(|b| b.count > 0));
    }

    #[test]
    fn same_day_boundaries_bucket_together() {
        // 同じローカル日の 00 時と 23 時は 1 バケットにまとまる
        let times = vec![at((2024, 4, 2), 0), at((2024, 4, 2), 23)];
        let histogram = daily_histogram(&times);

        assert_eq!(histogram.len(), 1);
        assert_eq!(histogram[0].count, 2);
    }

    #[test]
    fn empty_input_yields_an_empty_histogram() {
        assert!(daily_histogram(&[]).is_empty());
    }
}
