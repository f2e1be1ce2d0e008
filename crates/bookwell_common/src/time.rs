// --- File: crates/bookwell_common/src/time.rs ---
//! Clock injection and the minute-span arithmetic underneath slot generation.
//!
//! All availability math happens in the practitioner's timezone, one calendar
//! date at a time, as half-open spans of minutes since local midnight. UTC
//! instants (busy intervals, "now") are projected into that frame before any
//! comparison, so the slot generator itself never touches a timezone.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// A source of the current instant. Injected everywhere time is read so tests
/// can freeze it.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }
}

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Half-open `[start, end)` span of minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteSpan {
    pub start: i64,
    pub end: i64,
}

impl MinuteSpan {
    /// Returns None for empty or inverted spans.
    pub fn new(start: i64, end: i64) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        Self::new(minute_of_day(start), minute_of_day(end))
    }

    pub fn overlaps(&self, other: &MinuteSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &MinuteSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Grow the span by `by` minutes on both sides, clipped to the day
    /// boundary (no cross-midnight blocking).
    pub fn expand_clipped(&self, by: i64) -> MinuteSpan {
        MinuteSpan {
            start: (self.start - by).max(0),
            end: (self.end + by).min(MINUTES_PER_DAY),
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end - self.start
    }
}

pub fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

/// Inverse of [`minute_of_day`]. None for minutes outside [0, 1440).
pub fn time_of_minute(minute: i64) -> Option<NaiveTime> {
    if !(0..MINUTES_PER_DAY).contains(&minute) {
        return None;
    }
    NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0)
}

/// Sort and coalesce overlapping or touching spans.
pub fn merge_spans(spans: &[MinuteSpan]) -> Vec<MinuteSpan> {
    if spans.is_empty() {
        return vec![];
    }
    let mut sorted = spans.to_vec();
    sorted.sort_by_key(|s| s.start);
    let mut merged = vec![sorted[0]];
    for &span in &sorted[1..] {
        let last = merged.last_mut().unwrap();
        if span.start <= last.end {
            last.end = last.end.max(span.end);
        } else {
            merged.push(span);
        }
    }
    merged
}

/// Free sub-spans of `window` once `occupied` is removed.
///
/// `occupied` must be sorted and non-overlapping ([`merge_spans`] output).
pub fn subtract_spans(window: MinuteSpan, occupied: &[MinuteSpan]) -> Vec<MinuteSpan> {
    let mut free = Vec::new();
    let mut cursor = window.start;
    for occ in occupied {
        if occ.end <= cursor {
            continue;
        }
        if occ.start >= window.end {
            break;
        }
        if occ.start > cursor {
            free.push(MinuteSpan {
                start: cursor,
                end: occ.start,
            });
        }
        cursor = cursor.max(occ.end);
        if cursor >= window.end {
            break;
        }
    }
    if cursor < window.end {
        free.push(MinuteSpan {
            start: cursor,
            end: window.end,
        });
    }
    free
}

/// Resolve a (date, minute-of-day) pair in `tz`. Minutes >= 1440 roll into
/// the next date, so a span ending at midnight stays representable. DST gaps
/// resolve to the earliest valid instant.
pub fn local_datetime(tz: Tz, date: NaiveDate, minute: i64) -> Option<DateTime<Tz>> {
    let (date, minute) = if minute >= MINUTES_PER_DAY {
        (date.succ_opt()?, minute - MINUTES_PER_DAY)
    } else {
        (date, minute)
    };
    let time = time_of_minute(minute)?;
    tz.from_local_datetime(&date.and_time(time)).earliest()
}

/// Project a UTC interval onto one local calendar date, clipped to that
/// date's bounds. The start is floored and the end rounded up to the minute,
/// so a partially covered minute still blocks.
pub fn project_onto_local_date(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
    date: NaiveDate,
) -> Option<MinuteSpan> {
    if end <= start {
        return None;
    }
    let day_start = local_datetime(tz, date, 0)?.with_timezone(&Utc);
    let day_end = local_datetime(tz, date, MINUTES_PER_DAY)?.with_timezone(&Utc);
    let clipped_start = start.max(day_start);
    let clipped_end = end.min(day_end);
    if clipped_end <= clipped_start {
        return None;
    }
    let start_min = (clipped_start - day_start).num_seconds() / 60;
    let end_min = ((clipped_end - day_start).num_seconds() + 59) / 60;
    MinuteSpan::new(start_min.max(0), end_min.min(MINUTES_PER_DAY))
}

/// Signed hours between two instants, fractional.
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

/// chrono weekday as the 0 = Monday .. 6 = Sunday index used by WeeklyRule.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}
