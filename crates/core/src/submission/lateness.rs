//! Late-submission detection.
//!
//! A cash-up for calendar day D is on time until D at the daily cutoff
//! plus a grace period; strictly after that it is late. The flag is
//! computed exactly once per submit action and frozen - editing the
//! submission date afterwards never recomputes it.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Cutoff-plus-grace policy for late detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatenessPolicy {
    /// Daily cutoff hour (24h clock, 0-23).
    pub cutoff_hour: u32,
    /// Grace period after the cutoff, in minutes.
    pub grace_minutes: i64,
}

impl Default for LatenessPolicy {
    fn default() -> Self {
        Self {
            cutoff_hour: 20,
            grace_minutes: 30,
        }
    }
}

impl LatenessPolicy {
    /// Creates a policy, clamping the cutoff hour into the valid range.
    #[must_use]
    pub fn new(cutoff_hour: u32, grace_minutes: i64) -> Self {
        Self {
            cutoff_hour: cutoff_hour.min(23),
            grace_minutes,
        }
    }

    /// The last on-time instant for a submission covering `date`.
    #[must_use]
    pub fn deadline(&self, date: NaiveDate) -> NaiveDateTime {
        // The clamped hour makes this always Some; midnight is a safe fallback.
        let cutoff = date
            .and_hms_opt(self.cutoff_hour.min(23), 0, 0)
            .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN));
        cutoff + Duration::minutes(self.grace_minutes)
    }

    /// True when `now` is strictly after the deadline.
    #[must_use]
    pub fn is_late(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        now > self.deadline(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_deadline_is_cutoff_plus_grace() {
        let policy = LatenessPolicy::default();
        assert_eq!(
            policy.deadline(day()),
            day().and_hms_opt(20, 30, 0).unwrap()
        );
    }

    #[rstest::rstest]
    #[case::morning_of((0, 9, 0, 0), false)]
    #[case::at_cutoff((0, 20, 0, 0), false)]
    #[case::within_grace((0, 20, 29, 59), false)]
    #[case::at_deadline((0, 20, 30, 0), false)]
    #[case::one_second_over((0, 20, 30, 1), true)]
    #[case::next_morning((1, 8, 0, 0), true)]
    fn test_default_policy_boundary(#[case] at: (i64, u32, u32, u32), #[case] late: bool) {
        let (days_after, h, m, s) = at;
        let now = (day() + Duration::days(days_after))
            .and_hms_opt(h, m, s)
            .unwrap();
        assert_eq!(LatenessPolicy::default().is_late(day(), now), late);
    }

    #[test]
    fn test_custom_policy() {
        let policy = LatenessPolicy::new(17, 0);
        assert!(policy.is_late(day(), day().and_hms_opt(17, 0, 1).unwrap()));
        assert!(!policy.is_late(day(), day().and_hms_opt(17, 0, 0).unwrap()));
    }

    #[test]
    fn test_out_of_range_cutoff_clamped() {
        let policy = LatenessPolicy::new(99, 0);
        assert_eq!(policy.cutoff_hour, 23);
    }
}
