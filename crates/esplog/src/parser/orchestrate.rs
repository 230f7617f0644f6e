//! The single streaming pass over one log file: physical lines are joined
//! into logical lines, classified, and applied to the deployment record in
//! strict file order.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::conf::ParserConfig;
use crate::deployment::{ArchiveRecord, Deployment, ErrorRecord, ImageRecord, ProcessRunRecord};
use crate::store::DeploymentFs;

use super::classify::{classify, split_body, LineKind};
use super::clock::LogClock;
use super::events::extract_event;
use super::legend::ActorLegend;
use super::model::{AncillaryPoint, LogEvent, ParseError};
use super::reconcile::reconcile_instrument_clock;
use super::CONTINUATION_MARKER;

/// Everything one parse pass produces: the enriched deployment record and
/// the flat list of ancillary points for bulk insertion.
#[derive(Debug)]
pub struct ParseOutcome {
    pub deployment: Deployment,
    pub ancillary_points: Vec<AncillaryPoint>,
}

/// Stream `path` line-by-line and fold it into `deployment`.
///
/// Lines at or below the deployment's resume watermark are still fed to the
/// clock and legend (their state is line-order dependent) but are not
/// re-applied as events.
pub async fn parse_log_file(
    config: &ParserConfig,
    deployment: Deployment,
    path: &Path,
) -> Result<ParseOutcome, ParseError> {
    let file = File::open(path).await?;
    let mut reader = BufReader::new(file);

    let mut pass = Pass {
        config,
        fs: DeploymentFs::new(&config.data_dir),
        clock: LogClock::new(config.ticks_per_second),
        legend: ActorLegend::new(),
        watermark: deployment.last_line_parsed,
        deployment,
        points: Vec::new(),
    };

    let mut line_index: u64 = 0;
    let mut pending: Vec<u8> = Vec::new();
    let mut raw: Vec<u8> = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            break;
        }
        line_index += 1;

        while matches!(raw.last(), Some(b'\n') | Some(b'\r')) {
            raw.pop();
        }
        pending.extend_from_slice(&raw);

        // A trailing backslash joins this line with the next one. The byte
        // stays in the buffer: embedded backslashes are separators in the
        // ancillary and image grammars.
        if pending.last() == Some(&CONTINUATION_MARKER) {
            continue;
        }

        let line = std::mem::take(&mut pending);
        pass.apply_line(&line, line_index).await;
    }

    if !pending.is_empty() {
        debug!(line_index, "dropping dangling continuation at end of file");
    }

    Ok(ParseOutcome {
        deployment: pass.deployment,
        ancillary_points: pass.points,
    })
}

/// Mutable state of one pass. One instance per file; nothing is shared
/// across concurrent parses.
struct Pass<'a> {
    config: &'a ParserConfig,
    fs: DeploymentFs,
    clock: LogClock,
    legend: ActorLegend,
    deployment: Deployment,
    points: Vec<AncillaryPoint>,
    /// `last_line_parsed` as of submission; lines at or below it are
    /// clock/legend-only.
    watermark: u64,
}

impl Pass<'_> {
    async fn apply_line(&mut self, line: &[u8], line_index: u64) {
        match classify(line) {
            LineKind::Timestamp => {
                let text = String::from_utf8_lossy(line);
                let previous = self.clock.last();
                if let Some(ts) = self.clock.apply_absolute(&text, &self.config.timezones) {
                    if let Some(previous) = previous {
                        if ts < previous {
                            warn!(line_index, %previous, new = %ts, "log time went backwards");
                        }
                    }
                }
            }
            LineKind::Tick => {
                self.clock.apply_tick(line);
            }
            LineKind::Legend => {
                self.legend.apply(line);
            }
            LineKind::Body => {
                if line_index <= self.watermark {
                    return;
                }
                self.deployment.last_line_parsed =
                    self.deployment.last_line_parsed.max(line_index);
                self.apply_body(line, line_index).await;
            }
        }
    }

    async fn apply_body(&mut self, line: &[u8], line_index: u64) {
        let Some(ts) = self.clock.last() else {
            debug!(line_index, "body line before any timestamp, skipping");
            return;
        };

        let (actor, body) = split_body(line, &self.legend);
        let body = String::from_utf8_lossy(body);
        let Some(event) = extract_event(&body) else {
            return;
        };

        match event {
            LogEvent::Error { subject, message } => {
                self.deployment.record_error(ts, ErrorRecord { actor, subject, message });
            }
            LogEvent::Ancillary(entries) => {
                for entry in entries {
                    self.apply_ancillary_entry(ts, entry);
                }
            }
            LogEvent::Image { x_pixels, y_pixels, bits, exposure, path_prefix, filename } => {
                let esp = self.deployment.esp.name.clone();
                let name = self.deployment.name.clone();
                let downloaded = self.fs.image_downloaded(&esp, &name, &filename).await;
                let image_url = DeploymentFs::processed_image_url(&esp, &name, &filename);
                self.deployment.record_image(
                    ts,
                    ImageRecord {
                        x_pixels,
                        y_pixels,
                        bits,
                        exposure,
                        full_image_path: format!("{path_prefix}{filename}"),
                        image_filename: filename,
                        downloaded,
                        image_url,
                    },
                );
            }
            LogEvent::ProtocolRun { name, target_vol, archive } => {
                self.deployment.record_process_run(
                    ts,
                    ProcessRunRecord {
                        actor,
                        name,
                        target_vol,
                        archive: archive.map(|a| ArchiveRecord {
                            name: a.name,
                            target_vol: a.target_vol,
                        }),
                    },
                );
            }
            LogEvent::DwsmSampleStart { target_volume } => {
                self.deployment.record_sample_start(ts, actor, &target_volume, true);
            }
            LogEvent::DwsmSampleEnd => {
                self.deployment.close_dwsm_sample(ts);
            }
            LogEvent::SampleStart { target_volume } => {
                self.deployment.record_sample_start(ts, actor, &target_volume, false);
            }
            LogEvent::SampleEnd { actual_volume } => {
                self.deployment.close_sample(ts, &actual_volume);
            }
        }
    }

    fn apply_ancillary_entry(
        &mut self,
        log_ts: chrono::DateTime<chrono::Utc>,
        entry: super::model::AncillaryEntry,
    ) {
        // The reconciled instrument clock applies to every reading of the
        // sub-entry; without a resolved timezone there is nothing to
        // reconcile against.
        let ts = if self.config.use_ancillary_timestamps {
            match self.clock.zone() {
                Some(zone) => reconcile_instrument_clock(
                    log_ts,
                    zone,
                    entry.hour,
                    entry.minute,
                    entry.second,
                ),
                None => log_ts,
            }
        } else {
            log_ts
        };

        for reading in entry.readings {
            let Some(def) = self.config.ancillary_variables.lookup(&entry.source, &reading.units)
            else {
                debug!(source = %entry.source, units = %reading.units, "unknown ancillary variable, skipping");
                continue;
            };

            self.deployment
                .register_ancillary_variable(&entry.source, &reading.units, def);
            self.points.push(AncillaryPoint {
                source: entry.source.clone(),
                var_name: def.var_name.clone(),
                var_long_name: def.var_long_name.clone(),
                units: def.units.clone(),
                units_as_logged: reading.units.clone(),
                timestamp: ts,
                value: reading.value,
            });
            self.deployment.bump_ancillary(&entry.source, &reading.units);
        }
    }
}
