//! The body-line event grammar: a fixed, ordered list of regex rules, each
//! producing one [`LogEvent`] variant. The rules are mutually exclusive in
//! the firmware's grammar, so the ordering only matters for pathological
//! input, but it is kept fixed anyway.

mod ancillary;
mod error;
mod image;
mod protocol;
mod sample;

use super::model::LogEvent;

/// Run a body line through every grammar rule in priority order.
/// Returns `None` when nothing matches; non-matching lines are not errors.
pub fn extract_event(body: &str) -> Option<LogEvent> {
    error::extract(body)
        .or_else(|| ancillary::extract(body))
        .or_else(|| image::extract(body))
        .or_else(|| protocol::extract(body))
        .or_else(|| sample::extract_dwsm_start(body))
        .or_else(|| sample::extract_dwsm_end(body))
        .or_else(|| sample::extract_start(body))
        .or_else(|| sample::extract_end(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_is_none() {
        assert_eq!(extract_event("Powering down for 60 seconds"), None);
        assert_eq!(extract_event(""), None);
    }

    #[test]
    fn test_sample_start_is_not_a_protocol_run() {
        // "Sampling Nml ..." must hit the sample grammar, never the
        // protocol-run grammar.
        let event = extract_event("Sampling 50ml at most").unwrap();
        assert!(matches!(event, LogEvent::SampleStart { .. }));
    }
}
