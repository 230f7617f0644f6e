//! Timestamp reconstruction for the log's two time markers.
//!
//! `@` lines carry an absolute epoch-like float plus a timezone abbreviation
//! (in either order); they reset the clock. `+` lines advance it by a tick
//! count. Everything else inherits the last resolved timestamp.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{trace, warn};

use crate::conf::lookup::TimezoneTable;

// Absolute markers come in two layouts: `@PDT1459999999.0` and
// `@1459999999.0PDT`.
static ABSOLUTE_ZONE_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(\D+)(\d+\.\d+)").expect("hardcoded regex"));
static ABSOLUTE_ZONE_LAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(\d+\.\d+)(\D+)").expect("hardcoded regex"));

/// Mutable clock state for one parse pass.
#[derive(Debug)]
pub struct LogClock {
    last: Option<DateTime<Utc>>,
    zone: Option<FixedOffset>,
    ticks_per_second: u32,
}

impl LogClock {
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            last: None,
            zone: None,
            ticks_per_second: ticks_per_second.max(1),
        }
    }

    /// The most recently resolved timestamp, if any line has carried one yet.
    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.last
    }

    /// The offset of the ESP's civil timezone, once an absolute marker has
    /// declared it.
    pub fn zone(&self) -> Option<FixedOffset> {
        self.zone
    }

    /// Resolve an absolute `@` marker. The epoch-like float is civil time in
    /// the ESP's own zone; the abbreviation pins that zone via the lookup
    /// table. Returns the new UTC timestamp, or `None` when the line does not
    /// parse or the abbreviation is unknown.
    pub fn apply_absolute(
        &mut self,
        line: &str,
        timezones: &TimezoneTable,
    ) -> Option<DateTime<Utc>> {
        let (abbreviation, epoch) = if let Some(caps) = ABSOLUTE_ZONE_FIRST.captures(line) {
            (caps[1].to_string(), caps[2].to_string())
        } else if let Some(caps) = ABSOLUTE_ZONE_LAST.captures(line) {
            (caps[2].to_string(), caps[1].to_string())
        } else {
            return None;
        };

        let Some(entry) = timezones.lookup(&abbreviation) else {
            warn!(%abbreviation, "no timezone in the lookup table for marker");
            return None;
        };
        let offset = entry.fixed_offset()?;
        self.zone = Some(offset);

        let seconds: f64 = epoch.parse().ok()?;
        let civil = DateTime::from_timestamp(
            seconds.trunc() as i64,
            (seconds.fract() * 1_000_000_000.0) as u32,
        )?
        .naive_utc();

        // The float is the instrument's civil clock, so interpreting it in
        // the declared offset yields the real instant.
        let utc = offset
            .from_local_datetime(&civil)
            .single()?
            .with_timezone(&Utc);
        trace!(timestamp = %utc, zone = %offset, "absolute timestamp");
        self.last = Some(utc);
        Some(utc)
    }

    /// Advance the clock by a `+` tick marker. A bare `+` counts as one tick.
    /// Seconds and milliseconds are both truncated, never rounded.
    pub fn apply_tick(&mut self, line: &[u8]) -> Option<DateTime<Utc>> {
        let ticks = leading_integer(&line[1..]).unwrap_or(1);

        let Some(last) = self.last else {
            warn!("tick marker before any absolute timestamp, ignoring");
            return None;
        };

        let tps = self.ticks_per_second as i64;
        let seconds = ticks / tps;
        let millis = (ticks % tps) * 1000 / tps;
        let advanced = last + Duration::seconds(seconds) + Duration::milliseconds(millis);
        trace!(ticks, seconds, millis, timestamp = %advanced, "tick advance");
        self.last = Some(advanced);
        Some(advanced)
    }
}

/// Parse the leading ASCII digits of `bytes`, ignoring any trailing junk.
fn leading_integer(bytes: &[u8]) -> Option<i64> {
    let end = bytes.iter().position(|b| !b.is_ascii_digit()).unwrap_or(bytes.len());
    if end == 0 {
        return None;
    }
    std::str::from_utf8(&bytes[..end]).ok()?.parse().ok()
}
