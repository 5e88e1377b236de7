//! Attendance status derivation.
//!
//! The handler in `api::attendance` owns every storage round trip and feeds
//! the current record state into these functions, so classification stays a
//! pure computation over (time of day, policy thresholds).

use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime};

use crate::error::ApiError;
use crate::model::attendance::AttendanceStatus;

pub const OFFICIAL_CHECK_IN_KEY: &str = "officialCheckIn";
pub const OFFICIAL_CHECK_OUT_KEY: &str = "officialCheckOut";

const TIME_FORMAT: &str = "%H:%M:%S";

/// Thresholds in effect for a single event. Built fresh from the settings
/// map before each recording call; callers own the refresh cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub official_check_in: NaiveTime,
    pub official_check_out: NaiveTime,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            official_check_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            official_check_out: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }
    }
}

impl Policy {
    /// Missing or unparseable keys fall back to 09:00:00 / 17:00:00.
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        Self {
            official_check_in: threshold(
                settings,
                OFFICIAL_CHECK_IN_KEY,
                defaults.official_check_in,
            ),
            official_check_out: threshold(
                settings,
                OFFICIAL_CHECK_OUT_KEY,
                defaults.official_check_out,
            ),
        }
    }
}

fn threshold(settings: &HashMap<String, String>, key: &str, default: NaiveTime) -> NaiveTime {
    match settings.get(key) {
        None => default,
        Some(raw) => NaiveTime::parse_from_str(raw, TIME_FORMAT).unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unparseable policy threshold, using default");
            default
        }),
    }
}

/// Accepts `2024-05-01T09:15:00` or the space-separated variant.
pub fn parse_event_timestamp(raw: &str) -> Result<NaiveDateTime, ApiError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| ApiError::Validation(format!("Invalid timestamp `{raw}`")))
}

/// Classification made at CHECK_IN time. Strictly after the official
/// check-in is Late; exactly on time (or before) is Present and still
/// labelled "Early" in the remarks.
pub fn check_in_outcome(time: NaiveTime, policy: &Policy) -> (AttendanceStatus, String) {
    let stamp = time.format(TIME_FORMAT);
    if time > policy.official_check_in {
        (AttendanceStatus::Late, format!("Late (Checked in at {stamp})"))
    } else {
        (AttendanceStatus::Present, format!("Early (Checked in at {stamp})"))
    }
}

/// Remark clause for a CHECK_OUT. Before the official check-out is
/// "Left Early"; at or after it is "Overtime".
pub fn check_out_remark(time: NaiveTime, policy: &Policy) -> String {
    let stamp = time.format(TIME_FORMAT);
    if time < policy.official_check_out {
        format!("Left Early (Checked out at {stamp})")
    } else {
        format!("Overtime (Checked out at {stamp})")
    }
}

/// Appends a narrative clause, joining with `"; "` when the record already
/// carries remarks.
pub fn append_remark(existing: Option<&str>, clause: &str) -> String {
    match existing {
        Some(prev) if !prev.is_empty() => format!("{prev}; {clause}"),
        _ => clause.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn check_in_boundary_is_exclusive_on_the_late_side() {
        let policy = Policy::default();

        let (status, _) = check_in_outcome(hms(9, 0, 1), &policy);
        assert_eq!(status, AttendanceStatus::Late);

        let (status, _) = check_in_outcome(hms(8, 59, 59), &policy);
        assert_eq!(status, AttendanceStatus::Present);

        // Exactly on time is still Present.
        let (status, remarks) = check_in_outcome(hms(9, 0, 0), &policy);
        assert_eq!(status, AttendanceStatus::Present);
        assert_eq!(remarks, "Early (Checked in at 09:00:00)");
    }

    #[test]
    fn late_check_in_remark() {
        let (status, remarks) = check_in_outcome(hms(9, 15, 0), &Policy::default());
        assert_eq!(status, AttendanceStatus::Late);
        assert_eq!(remarks, "Late (Checked in at 09:15:00)");
    }

    #[test]
    fn check_out_boundary_is_inclusive_on_the_overtime_side() {
        let policy = Policy::default();
        assert_eq!(
            check_out_remark(hms(16, 59, 59), &policy),
            "Left Early (Checked out at 16:59:59)"
        );
        assert_eq!(
            check_out_remark(hms(17, 0, 0), &policy),
            "Overtime (Checked out at 17:00:00)"
        );
    }

    #[test]
    fn remarks_join_with_semicolon() {
        assert_eq!(append_remark(None, "a"), "a");
        assert_eq!(append_remark(Some(""), "a"), "a");
        assert_eq!(append_remark(Some("a"), "b"), "a; b");
    }

    #[test]
    fn double_check_out_produces_two_clauses() {
        let policy = Policy::default();
        let first = append_remark(
            Some("Early (Checked in at 08:30:00)"),
            &check_out_remark(hms(16, 0, 0), &policy),
        );
        let second = append_remark(Some(&first), &check_out_remark(hms(18, 0, 0), &policy));
        assert_eq!(
            second,
            "Early (Checked in at 08:30:00); Left Early (Checked out at 16:00:00); \
             Overtime (Checked out at 18:00:00)"
        );
    }

    #[test]
    fn policy_falls_back_to_defaults() {
        let empty = HashMap::new();
        assert_eq!(Policy::from_settings(&empty), Policy::default());

        let garbage = HashMap::from([
            (OFFICIAL_CHECK_IN_KEY.to_string(), "not a time".to_string()),
            (OFFICIAL_CHECK_OUT_KEY.to_string(), "25:99".to_string()),
        ]);
        assert_eq!(Policy::from_settings(&garbage), Policy::default());
    }

    #[test]
    fn policy_reads_configured_thresholds() {
        let settings = HashMap::from([
            (OFFICIAL_CHECK_IN_KEY.to_string(), "08:30:00".to_string()),
            (OFFICIAL_CHECK_OUT_KEY.to_string(), "18:00:00".to_string()),
        ]);
        let policy = Policy::from_settings(&settings);
        assert_eq!(policy.official_check_in, hms(8, 30, 0));
        assert_eq!(policy.official_check_out, hms(18, 0, 0));
    }

    #[test]
    fn timestamp_parsing_accepts_both_separators() {
        assert!(parse_event_timestamp("2024-05-01T09:15:00").is_ok());
        assert!(parse_event_timestamp("2024-05-01 09:15:00").is_ok());
        assert!(matches!(
            parse_event_timestamp("yesterday"),
            Err(ApiError::Validation(_))
        ));
    }

    // The worked example from the product side: E101 checks in late at
    // 09:15, leaves early at 16:30.
    #[test]
    fn late_arrival_then_early_departure() {
        let policy = Policy::default();

        let (status, remarks) = check_in_outcome(hms(9, 15, 0), &policy);
        assert_eq!(status, AttendanceStatus::Late);
        assert_eq!(remarks, "Late (Checked in at 09:15:00)");

        let remarks = append_remark(Some(&remarks), &check_out_remark(hms(16, 30, 0), &policy));
        assert_eq!(
            remarks,
            "Late (Checked in at 09:15:00); Left Early (Checked out at 16:30:00)"
        );
    }
}
