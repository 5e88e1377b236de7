//! Dashboard aggregation.
//!
//! The shaping rules live here as pure functions over rows the dashboard
//! handler has already fetched; the handler contributes only SQL.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;

/// Organization-wide counts for a single day.
///
/// `absent` is a derived complement, not a count of explicit Absent rows:
/// employees with no record for the day and explicit Leave records both
/// fold into it, so `present + late + absent == total_employees` always
/// holds.
#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailySummary {
    #[schema(example = 12)]
    pub present: i64,
    #[schema(example = 3)]
    pub late: i64,
    #[schema(example = 5)]
    pub absent: i64,
}

pub fn daily_summary(statuses: &[AttendanceStatus], total_employees: i64) -> DailySummary {
    let present = statuses
        .iter()
        .filter(|s| **s == AttendanceStatus::Present)
        .count() as i64;
    let late = statuses
        .iter()
        .filter(|s| **s == AttendanceStatus::Late)
        .count() as i64;

    DailySummary {
        present,
        late,
        absent: total_employees - (present + late),
    }
}

/// One point of the attendance trend chart.
#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrendPoint {
    #[schema(example = "2024-05-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = 15)]
    pub attendance: i64,
}

/// Expands sparse per-date counts over `[start, end]` inclusive, in
/// ascending date order. Dates the query returned no row for are
/// synthesized with a zero count, never skipped.
pub fn fill_trend(counts: &[(NaiveDate, i64)], start: NaiveDate, end: NaiveDate) -> Vec<TrendPoint> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| TrendPoint {
            date,
            attendance: counts
                .iter()
                .find(|(d, _)| *d == date)
                .map_or(0, |(_, c)| *c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn summary_counts_present_and_late_separately() {
        use AttendanceStatus::*;
        let statuses = [Present, Present, Late, Leave, Absent];
        let summary = daily_summary(&statuses, 10);
        assert_eq!(
            summary,
            DailySummary {
                present: 2,
                late: 1,
                absent: 7
            }
        );
    }

    // Leave rows carry no weight of their own; they land in the absent
    // bucket through the subtraction, and the identity still holds.
    #[test]
    fn summary_identity_holds_with_leave_rows() {
        use AttendanceStatus::*;
        let statuses = [Present, Late, Leave, Leave];
        let total = 6;
        let summary = daily_summary(&statuses, total);
        assert_eq!(summary.present + summary.late + summary.absent, total);
        assert_eq!(summary.absent, 4);
    }

    #[test]
    fn summary_of_empty_population_is_all_zero() {
        let summary = daily_summary(&[], 0);
        assert_eq!(
            summary,
            DailySummary {
                present: 0,
                late: 0,
                absent: 0
            }
        );
    }

    #[test]
    fn trend_zero_fills_missing_dates() {
        let counts = vec![(day(2), 4), (day(5), 1)];
        let trend = fill_trend(&counts, day(1), day(7));

        assert_eq!(trend.len(), 7);
        let attendance: Vec<i64> = trend.iter().map(|p| p.attendance).collect();
        assert_eq!(attendance, [0, 4, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn trend_is_ascending_and_inclusive_of_both_ends() {
        let trend = fill_trend(&[], day(1), day(7));
        assert_eq!(trend.first().unwrap().date, day(1));
        assert_eq!(trend.last().unwrap().date, day(7));
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn single_day_window_has_one_entry() {
        let trend = fill_trend(&[(day(3), 9)], day(3), day(3));
        assert_eq!(
            trend,
            vec![TrendPoint {
                date: day(3),
                attendance: 9
            }]
        );
    }
}
