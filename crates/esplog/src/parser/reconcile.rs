//! Reconciliation of instrument-local clocks against the ESP log clock.
//!
//! Ancillary sub-entries carry only an HH:MM:SS from the instrument's own
//! clock, assumed to share the ESP's civil date and timezone. Instruments
//! sample shortly before the ESP writes the log line, so a slightly-behind
//! instrument clock is the trusted, expected case. Anything else is drift or
//! a day rollover and falls back to the ESP clock.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use tracing::trace;

use super::{DAY_ROLLOVER_THRESHOLD_SECS, MAX_INSTRUMENT_LAG_SECS};

/// Pick the authoritative timestamp for one ancillary sub-entry.
///
/// `log_utc` is the ESP log clock for the surrounding line; `zone` is the
/// ESP's resolved civil timezone; `hour`/`minute`/`second` are the
/// instrument's embedded wall clock.
pub fn reconcile_instrument_clock(
    log_utc: DateTime<Utc>,
    zone: FixedOffset,
    hour: u32,
    minute: u32,
    second: u32,
) -> DateTime<Utc> {
    let log_local = log_utc.with_timezone(&zone);

    // Candidate: the log's civil date with the instrument's time of day.
    let Some(naive) = log_local.date_naive().and_hms_opt(hour, minute, second) else {
        return log_utc;
    };
    let Some(candidate) = zone.from_local_datetime(&naive).single() else {
        return log_utc;
    };
    let candidate = candidate.with_timezone(&Utc);

    let diff_seconds = (candidate - log_utc).num_seconds();
    trace!(diff_seconds, "instrument clock vs ESP clock");

    if diff_seconds < 0 {
        if diff_seconds.abs() > MAX_INSTRUMENT_LAG_SECS {
            trace!("instrument clock too far behind, using ESP clock");
            log_utc
        } else {
            candidate
        }
    } else if diff_seconds > 0 {
        if diff_seconds > DAY_ROLLOVER_THRESHOLD_SECS {
            // Likely sampled just before midnight, logged just after.
            let adjusted = candidate - Duration::days(1);
            let rechecked = (adjusted - log_utc).num_seconds();
            if rechecked > 0 || rechecked < -MAX_INSTRUMENT_LAG_SECS {
                trace!("still out of range after day adjustment, using ESP clock");
                log_utc
            } else {
                adjusted
            }
        } else {
            // Instrument clocks must never run ahead; this is forward drift.
            trace!("instrument clock ahead of ESP clock, using ESP clock");
            log_utc
        }
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pdt() -> FixedOffset {
        FixedOffset::east_opt(-7 * 3600).unwrap()
    }

    /// 2016-04-07 12:00:00 PDT == 19:00:00 UTC.
    fn log_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 4, 7, 19, 0, 0).unwrap()
    }

    #[test]
    fn test_slightly_behind_is_accepted() {
        // Instrument says 11:58:00 local, 2 minutes behind.
        let ts = reconcile_instrument_clock(log_utc(), pdt(), 11, 58, 0);
        assert_eq!(ts, log_utc() - Duration::minutes(2));
    }

    #[test]
    fn test_far_behind_falls_back_to_log_clock() {
        // 20 minutes behind exceeds the 10-minute drift window.
        let ts = reconcile_instrument_clock(log_utc(), pdt(), 11, 40, 0);
        assert_eq!(ts, log_utc());
    }

    #[test]
    fn test_slightly_ahead_falls_back_to_log_clock() {
        let ts = reconcile_instrument_clock(log_utc(), pdt(), 12, 5, 0);
        assert_eq!(ts, log_utc());
    }

    #[test]
    fn test_day_rollover_is_corrected() {
        // Log clock just after local midnight; instrument sampled at 23:59:30
        // the previous evening, which naively lands almost a day ahead.
        let log = Utc.with_ymd_and_hms(2016, 4, 8, 7, 0, 30).unwrap(); // 00:00:30 PDT
        let ts = reconcile_instrument_clock(log, pdt(), 23, 59, 30);
        assert_eq!(ts, log - Duration::seconds(60));
    }

    #[test]
    fn test_rollover_still_out_of_range_uses_log_clock() {
        // After subtracting a day the candidate is hours behind: reject.
        let log = Utc.with_ymd_and_hms(2016, 4, 8, 7, 0, 30).unwrap(); // 00:00:30 PDT
        let ts = reconcile_instrument_clock(log, pdt(), 20, 0, 0);
        assert_eq!(ts, log);
    }

    #[test]
    fn test_exact_match_keeps_candidate() {
        let ts = reconcile_instrument_clock(log_utc(), pdt(), 12, 0, 0);
        assert_eq!(ts, log_utc());
    }

    #[test]
    fn test_invalid_time_of_day_uses_log_clock() {
        let ts = reconcile_instrument_clock(log_utc(), pdt(), 99, 0, 0);
        assert_eq!(ts, log_utc());
    }
}
