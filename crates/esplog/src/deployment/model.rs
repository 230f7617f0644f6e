use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Accumulated state for one deployment. Event maps are keyed by the event's
/// millisecond epoch rendered as a decimal string, so "most recent" lookups
/// are string-ordered lookups over the map keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deployment {
    pub esp: Esp,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, ErrorRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, ImageRecord>,
    #[serde(rename = "processRuns", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub process_runs: BTreeMap<String, ProcessRunRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub samples: BTreeMap<String, SampleRecord>,
    /// source name -> raw logged unit -> variable record.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ancillary_data: BTreeMap<String, BTreeMap<String, AncillaryVariableRecord>>,
    /// Number of log-file lines consumed by the last parse pass. A re-parse
    /// of the same (grown) file skips this many lines before extracting.
    #[serde(rename = "last_line_parse_from_log_file", default)]
    pub last_line_parsed: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Esp {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "xPixels")]
    pub x_pixels: u32,
    #[serde(rename = "yPixels")]
    pub y_pixels: u32,
    pub bits: u32,
    pub exposure: f64,
    #[serde(rename = "imageFilename")]
    pub image_filename: String,
    #[serde(rename = "fullImagePath")]
    pub full_image_path: String,
    pub downloaded: bool,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRunRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub name: String,
    #[serde(rename = "targetVol")]
    pub target_vol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub name: String,
    #[serde(rename = "targetVol")]
    pub target_vol: String,
}

/// Volumes stay as the strings the firmware logged; downstream consumers
/// decide how to parse them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dwsm: bool,
    #[serde(rename = "targetVolume")]
    pub target_volume: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endts: Option<i64>,
    #[serde(rename = "actualVolume", skip_serializing_if = "Option::is_none")]
    pub actual_volume: Option<String>,
}

/// One (source, raw unit) catalog entry plus its running point count. The
/// `source_id` is assigned by the persistence layer on first bulk insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AncillaryVariableRecord {
    pub var_name: String,
    pub var_long_name: String,
    pub units: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
    #[serde(rename = "numPoints")]
    pub num_points: u64,
}
