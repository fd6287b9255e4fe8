//! Raw occurrence slot arithmetic.
//!
//! A raw slot is the unpatched (start, end) of an occurrence: the series
//! times stepped forward by `index × step_days`. Steps are calendar days
//! (`chrono::Days`), not fixed 24-hour multiples, so the step tolerates
//! daylight-savings-style shifts should a zoned frontend feed this engine.

use chrono::{DateTime, Days, Utc};

use crate::error::{CadenzaError, CadenzaResult};
use crate::series::Series;

/// Raw (unpatched) start and end of the occurrence at `index`.
///
/// Index 0 returns the series times unchanged. For a non-recurring series,
/// any index above 0 is `InvalidRecurrence`.
pub fn raw_slot(series: &Series, index: u32) -> CadenzaResult<(DateTime<Utc>, DateTime<Utc>)> {
    if index == 0 {
        return Ok((series.start_time, series.end_time));
    }

    let step = series.recurrence.step_days().ok_or_else(|| {
        CadenzaError::InvalidRecurrence(format!(
            "series {} does not recur; occurrence {} does not exist",
            series.id, index
        ))
    })?;

    let days = Days::new(step * u64::from(index));
    let start = series.start_time.checked_add_days(days);
    let end = series.end_time.checked_add_days(days);
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(CadenzaError::Validation(format!(
            "occurrence {index} is beyond the representable date range"
        ))),
    }
}
