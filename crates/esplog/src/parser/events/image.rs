use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::model::LogEvent;

// Camera exposure lines span physical lines in the raw log, so the literal
// backslash before the path is part of the grammar:
// `Exposing 1392x1040 pixel 8-bit image for 0.25 seconds\/var/.../image.tif`.
static IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Exposing\s+(\d+)x(\d+)\s+pixel\s+(\d+)-bit\s+image\s+for\s+(\d+\.*\d+)\s+seconds\\(.*/)([a-zA-Z0-9]+\.tif)",
    )
    .expect("hardcoded regex")
});

pub(super) fn extract(body: &str) -> Option<LogEvent> {
    let caps = IMAGE.captures(body)?;
    Some(LogEvent::Image {
        x_pixels: caps[1].parse().ok()?,
        y_pixels: caps[2].parse().ok()?,
        bits: caps[3].parse().ok()?,
        exposure: caps[4].parse().ok()?,
        path_prefix: caps[5].to_string(),
        filename: caps[6].to_string(),
    })
}
