use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::model::LogEvent;

// BadNews emails are how the firmware reports faults:
// `BadNews.email "message",:Subject=>"subject"`.
static ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"BadNews.\S+\s+"(.*)",:Subject=>"(.*)""#).expect("hardcoded regex")
});

pub(super) fn extract(body: &str) -> Option<LogEvent> {
    let caps = ERROR.captures(body)?;
    Some(LogEvent::Error {
        message: caps[1].to_string(),
        subject: caps[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error() {
        let body = r#"Email.BadNews.email "Can't find savedGap.rb",:Subject=>"I'm confused""#;
        let event = extract(body).unwrap();
        assert_eq!(
            event,
            LogEvent::Error {
                message: "Can't find savedGap.rb".to_string(),
                subject: "I'm confused".to_string(),
            }
        );
    }

    #[test]
    fn test_no_match_without_subject() {
        assert!(extract(r#"BadNews.email "oops""#).is_none());
    }
}
