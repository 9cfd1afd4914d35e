use chrono::{DateTime, FixedOffset, TimeZone as _, Utc};

/// The first instant of the calendar day after `now`, as seen in `offset`.
///
/// Votes are accepted strictly before this instant.
#[must_use]
pub fn end_of_day(now: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let tomorrow = now.with_timezone(&offset).date_naive().succ_opt()?;
    let midnight = tomorrow.and_hms_opt(0, 0, 0)?;
    offset
        .from_local_datetime(&midnight)
        .single()
        .map(|cutoff| cutoff.with_timezone(&Utc))
}
