//! Calendar-aware time deltas for update propagation.
//!
//! A shift authored against one occurrence propagates to later occurrences
//! as a calendar-component distance (months, days, seconds), not a flat
//! millisecond count. A "+1 month" shift therefore lands on the same
//! day-of-month for every occurrence it touches, across unequal month
//! lengths.

use chrono::{DateTime, Datelike, Days, Duration, Months, Utc};

/// Component-wise calendar distance between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDelta {
    months: u32,
    days: u64,
    /// Remainder below one day.
    seconds: i64,
}

impl CalendarDelta {
    /// Absolute calendar distance between `a` and `b` (order-insensitive).
    pub fn between(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        let (from, to) = if a <= b { (a, b) } else { (b, a) };

        let months = whole_months_between(from, to);
        let after_months = from
            .checked_add_months(Months::new(months))
            .unwrap_or(from);
        let rest = to - after_months;
        let days = rest.num_days();
        let seconds = (rest - Duration::days(days)).num_seconds();

        CalendarDelta {
            months,
            days: days.unsigned_abs(),
            seconds,
        }
    }

    /// Shift `t` by this delta, forward or backward.
    pub fn apply(&self, t: DateTime<Utc>, forward: bool) -> DateTime<Utc> {
        let shifted = if forward {
            t.checked_add_months(Months::new(self.months))
                .and_then(|t| t.checked_add_days(Days::new(self.days)))
                .map(|t| t + Duration::seconds(self.seconds))
        } else {
            t.checked_sub_months(Months::new(self.months))
                .and_then(|t| t.checked_sub_days(Days::new(self.days)))
                .map(|t| t - Duration::seconds(self.seconds))
        };
        // Checked ops only fail at the edge of chrono's representable range
        shifted.unwrap_or(t)
    }
}

/// Move `current` by the calendar distance from `baseline` to `target`, in
/// the same direction.
pub fn propagate(
    baseline: DateTime<Utc>,
    target: DateTime<Utc>,
    current: DateTime<Utc>,
) -> DateTime<Utc> {
    CalendarDelta::between(baseline, target).apply(current, target >= baseline)
}

/// Largest month count such that `from + months <= to`.
fn whole_months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let signed =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    let mut months = signed.max(0) as u32;
    // Month-end clamping can overshoot; back off until we are at or before `to`
    while months > 0 {
        match from.checked_add_months(Months::new(months)) {
            Some(stepped) if stepped <= to => break,
            _ => months -= 1,
        }
    }
    months
}
