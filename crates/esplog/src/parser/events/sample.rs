use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::model::LogEvent;

// DWSM (deep-water sample module) bags log their own start/end lines.
static DWSM_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Sample Bag inhaling\s+(\d+\.*\d*)ml.*$").expect("hardcoded regex")
});

static DWSM_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Waiting up to (\d+)s for Sample Bag to stabilize.*$").expect("hardcoded regex")
});

static START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Sampling\s+(\d+\.*\d*)ml.*$").expect("hardcoded regex"));

static END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Sampled\s+(\d+\.*\d*)ml.*$").expect("hardcoded regex"));

pub(super) fn extract_dwsm_start(body: &str) -> Option<LogEvent> {
    let caps = DWSM_START.captures(body)?;
    Some(LogEvent::DwsmSampleStart {
        target_volume: caps[1].to_string(),
    })
}

pub(super) fn extract_dwsm_end(body: &str) -> Option<LogEvent> {
    DWSM_END.is_match(body).then_some(LogEvent::DwsmSampleEnd)
}

pub(super) fn extract_start(body: &str) -> Option<LogEvent> {
    let caps = START.captures(body)?;
    Some(LogEvent::SampleStart {
        target_volume: caps[1].to_string(),
    })
}

pub(super) fn extract_end(body: &str) -> Option<LogEvent> {
    let caps = END.captures(body)?;
    Some(LogEvent::SampleEnd {
        actual_volume: caps[1].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dwsm_start() {
        let event = extract_dwsm_start("Sample Bag inhaling 950.5ml").unwrap();
        assert_eq!(
            event,
            LogEvent::DwsmSampleStart {
                target_volume: "950.5".to_string(),
            }
        );
    }

    #[test]
    fn test_dwsm_end() {
        let event =
            extract_dwsm_end("Waiting up to 120s for Sample Bag to stabilize").unwrap();
        assert_eq!(event, LogEvent::DwsmSampleEnd);
    }

    #[test]
    fn test_sample_start() {
        let event = extract_start("Sampling 1000ml").unwrap();
        assert_eq!(
            event,
            LogEvent::SampleStart {
                target_volume: "1000".to_string(),
            }
        );
    }

    #[test]
    fn test_sample_end_with_trailing_text() {
        let event = extract_end("Sampled  47.5ml in 123 seconds").unwrap();
        assert_eq!(
            event,
            LogEvent::SampleEnd {
                actual_volume: "47.5".to_string(),
            }
        );
    }

    #[test]
    fn test_start_requires_leading_anchor() {
        assert!(extract_start("Now Sampling 1000ml").is_none());
    }
}
