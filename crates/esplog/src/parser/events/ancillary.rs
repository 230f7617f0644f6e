use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::model::{AncillaryEntry, LogEvent, RawReading};

// An ancillary block always opens with the Can's own readings. Sub-entries
// for other instruments follow, separated by embedded backslashes:
// `Can@10:02:15,24.2C,1.2% humidity\CTD@10:02:14,12.1C,35.3psu`.
static BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Can@.*").expect("hardcoded regex"));

// `SOURCE@HH:MM:SS,value+unit,value+unit,...`
static SUB_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+)@(\d{2}):(\d{2}):(\d{2}),(.*)$").expect("hardcoded regex")
});

// Numeric prefix, unit suffix: `24.2C`, `-1.5m`, `1013decibars`.
static READING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-*\d+\.*\d*)(.*)$").expect("hardcoded regex"));

pub(super) fn extract(body: &str) -> Option<LogEvent> {
    if !BLOCK.is_match(body) {
        return None;
    }

    let mut entries = Vec::new();
    for chunk in body.split('\\') {
        let Some(caps) = SUB_ENTRY.captures(chunk) else {
            continue;
        };

        // \d{2} captures always parse.
        let hour = caps[2].parse().ok()?;
        let minute = caps[3].parse().ok()?;
        let second = caps[4].parse().ok()?;

        let readings = caps[5]
            .split(',')
            .filter_map(|raw| {
                let caps = READING.captures(raw.trim())?;
                Some(RawReading {
                    value: caps[1].trim().to_string(),
                    units: caps[2].trim().to_string(),
                })
            })
            .collect();

        entries.push(AncillaryEntry {
            source: caps[1].to_string(),
            hour,
            minute,
            second,
            readings,
        });
    }

    Some(LogEvent::Ancillary(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_source_block() {
        let body = "Can@10:02:15,24.2C,1.2% humidity,11.9V";
        let Some(LogEvent::Ancillary(entries)) = extract(body) else {
            panic!("expected ancillary event");
        };
        assert_eq!(entries.len(), 1);
        let can = &entries[0];
        assert_eq!(can.source, "Can");
        assert_eq!((can.hour, can.minute, can.second), (10, 2, 15));
        assert_eq!(can.readings.len(), 3);
        assert_eq!(can.readings[0].value, "24.2");
        assert_eq!(can.readings[0].units, "C");
        assert_eq!(can.readings[1].units, "% humidity");
        assert_eq!(can.readings[2].value, "11.9");
    }

    #[test]
    fn test_multi_instrument_block_splits_on_backslash() {
        let body = r"Can@10:02:15,24.2C\CTD@10:02:14,12.1C,35.3psu";
        let Some(LogEvent::Ancillary(entries)) = extract(body) else {
            panic!("expected ancillary event");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, "Can");
        assert_eq!(entries[1].source, "CTD");
        assert_eq!((entries[1].hour, entries[1].minute, entries[1].second), (10, 2, 14));
        assert_eq!(entries[1].readings[1].units, "psu");
    }

    #[test]
    fn test_negative_values() {
        let body = "Can@00:00:01,-1.5C";
        let Some(LogEvent::Ancillary(entries)) = extract(body) else {
            panic!("expected ancillary event");
        };
        assert_eq!(entries[0].readings[0].value, "-1.5");
    }

    #[test]
    fn test_non_numeric_reading_is_dropped() {
        let body = "Can@00:00:01,n/aC,24.2C";
        let Some(LogEvent::Ancillary(entries)) = extract(body) else {
            panic!("expected ancillary event");
        };
        assert_eq!(entries[0].readings.len(), 1);
        assert_eq!(entries[0].readings[0].value, "24.2");
    }

    #[test]
    fn test_requires_can_prefix() {
        assert!(extract("CTD@10:02:14,12.1C").is_none());
    }
}
