use chrono::{DateTime, Utc};
use std::fmt;

/// Days below which an expiring certificate is critical
pub const CRITICAL_DAYS: i64 = 7;

/// Days below which an expiring certificate deserves a warning
pub const WARNING_DAYS: i64 = 30;

/// Renewal urgency, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Expired,
    Critical,
    Warning,
    Ok,
}

impl Tier {
    /// Tier for a number of remaining days
    #[must_use]
    pub const fn from_days(remaining_days: i64) -> Self {
        if remaining_days < 0 {
            Self::Expired
        } else if remaining_days < CRITICAL_DAYS {
            Self::Critical
        } else if remaining_days < WARNING_DAYS {
            Self::Warning
        } else {
            Self::Ok
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Ok => "ok",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified remaining lifetime of a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Whole days left, negative once expired
    pub remaining_days: i64,
    pub tier: Tier,
}

/// Whole calendar days (UTC) from `now` until `valid_to`
///
/// Time of day is ignored on both sides, so a certificate expiring later today has 0 days left.
#[must_use]
pub fn remaining_days(valid_to: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (valid_to.date_naive() - now.date_naive()).num_days()
}

/// Classify a certificate's not-after timestamp relative to `now`
#[must_use]
pub fn classify(valid_to: DateTime<Utc>, now: DateTime<Utc>) -> Expiry {
    let remaining_days = remaining_days(valid_to, now);
    Expiry {
        remaining_days,
        tier: Tier::from_days(remaining_days),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_days(-1), Tier::Expired);
        assert_eq!(Tier::from_days(0), Tier::Critical);
        assert_eq!(Tier::from_days(6), Tier::Critical);
        assert_eq!(Tier::from_days(7), Tier::Warning);
        assert_eq!(Tier::from_days(29), Tier::Warning);
        assert_eq!(Tier::from_days(30), Tier::Ok);
        assert_eq!(Tier::from_days(i64::MIN), Tier::Expired);
        assert_eq!(Tier::from_days(i64::MAX), Tier::Ok);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Expired < Tier::Critical);
        assert!(Tier::Critical < Tier::Warning);
        assert!(Tier::Warning < Tier::Ok);
    }

    #[test]
    fn test_remaining_days_ignores_time_of_day() {
        // expires earlier today, before `now`
        let valid_to = Utc.with_ymd_and_hms(2026, 10, 19, 1, 0, 0).unwrap();
        assert_eq!(remaining_days(valid_to, now()), 0);

        // just after midnight tomorrow
        let valid_to = Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 1).unwrap();
        assert_eq!(remaining_days(valid_to, now()), 1);

        // late yesterday
        let valid_to = Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap();
        assert_eq!(remaining_days(valid_to, now()), -1);
    }

    #[test]
    fn test_classify() {
        let expiry = classify(now() + Duration::days(45), now());
        assert_eq!(expiry.remaining_days, 45);
        assert_eq!(expiry.tier, Tier::Ok);

        let expiry = classify(now() - Duration::days(3), now());
        assert_eq!(expiry.remaining_days, -3);
        assert_eq!(expiry.tier, Tier::Expired);

        let expiry = classify(now() + Duration::days(5), now());
        assert_eq!(expiry.remaining_days, 5);
        assert_eq!(expiry.tier, Tier::Critical);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut previous: Option<Expiry> = None;
        for hours in (-24 * 60..24 * 60).step_by(7) {
            let expiry = classify(now() + Duration::hours(hours), now());
            if let Some(prev) = previous {
                assert!(prev.remaining_days <= expiry.remaining_days);
                assert!(prev.tier <= expiry.tier);
            }
            previous = Some(expiry);
        }
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::Expired.to_string(), "expired");
        assert_eq!(Tier::Ok.to_string(), "ok");
    }
}
