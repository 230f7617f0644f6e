use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::model::{ArchiveSpec, LogEvent};

// `<name> sampling at most <N>ml[, wcr at most <M>ml]`
static PROTOCOL_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^([^"]+) sampling at most (\d+\.*\d*)ml(.*)"#).expect("hardcoded regex")
});

// Optional trailing whole-cell-archive clause.
static ARCHIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r", wcr at most (\d+\.*\d*)ml").expect("hardcoded regex"));

pub(super) fn extract(body: &str) -> Option<LogEvent> {
    let caps = PROTOCOL_RUN.captures(body)?;

    let archive = ARCHIVE.captures(&caps[3]).map(|archive_caps| ArchiveSpec {
        name: "wcr".to_string(),
        target_vol: archive_caps[1].to_string(),
    });

    Some(LogEvent::ProtocolRun {
        name: caps[1].to_string(),
        target_vol: caps[2].to_string(),
        archive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_protocol_run() {
        let event = extract("lrauv sampling at most 1000ml").unwrap();
        assert_eq!(
            event,
            LogEvent::ProtocolRun {
                name: "lrauv".to_string(),
                target_vol: "1000".to_string(),
                archive: None,
            }
        );
    }

    #[test]
    fn test_extract_with_archive_clause() {
        let event = extract("dwsm sampling at most 500.5ml, wcr at most 100ml").unwrap();
        let LogEvent::ProtocolRun { name, target_vol, archive } = event else {
            panic!("expected protocol run");
        };
        assert_eq!(name, "dwsm");
        assert_eq!(target_vol, "500.5");
        let archive = archive.unwrap();
        assert_eq!(archive.name, "wcr");
        assert_eq!(archive.target_vol, "100");
    }

    #[test]
    fn test_quoted_prefix_never_matches() {
        // Quoted actor prefixes are stripped before extraction; a stray
        // quote means this is not a protocol-run line.
        assert!(extract(r#""Alice" sampling at most 50ml"#).is_none());
    }
}
