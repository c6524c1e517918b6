//! Market-hours predicate.
//!
//! A tick is eligible Monday to Friday while the local wall clock is strictly
//! between 09:30:00 and 16:00:00. Holidays are not taken into account.

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

const OPEN: (u32, u32) = (9, 30);
const CLOSE: (u32, u32) = (16, 0);

/// Whether `local` falls inside the trading window. Both bounds are exclusive.
pub fn is_trading_hours(local: NaiveDateTime) -> bool {
    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }

    let (Some(open), Some(close)) = (
        NaiveTime::from_hms_opt(OPEN.0, OPEN.1, 0),
        NaiveTime::from_hms_opt(CLOSE.0, CLOSE.1, 0),
    ) else {
        return false;
    };

    let time = local.time();
    time > open && time < close
}

/// Source of the local wall-clock time used by the predicate.
pub trait Clock: Send + Sync {
    fn now_local(&self) -> NaiveDateTime;
}

/// Process local time.
pub struct LocalClock;

impl Clock for LocalClock {
    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Wall-clock time in a fixed IANA zone.
pub struct TzClock(pub Tz);

impl Clock for TzClock {
    fn now_local(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.0).naive_local()
    }
}
