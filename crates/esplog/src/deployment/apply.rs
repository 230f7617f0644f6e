use chrono::{DateTime, Utc};
use tracing::debug;

use crate::conf::lookup::VariableDef;

use super::model::{
    AncillaryVariableRecord, Deployment, ErrorRecord, ImageRecord, ProcessRunRecord, SampleRecord,
};

fn ts_key(ts: DateTime<Utc>) -> String {
    ts.timestamp_millis().to_string()
}

impl Deployment {
    pub fn new(esp_name: &str, deployment_name: &str) -> Self {
        Self {
            esp: super::Esp { name: esp_name.to_string() },
            name: deployment_name.to_string(),
            ..Self::default()
        }
    }

    /// Record a fault. The first event at a given millisecond wins; a
    /// re-parse over already-seen lines never rewrites history.
    pub fn record_error(&mut self, ts: DateTime<Utc>, record: ErrorRecord) {
        self.errors.entry(ts_key(ts)).or_insert(record);
    }

    pub fn record_image(&mut self, ts: DateTime<Utc>, record: ImageRecord) {
        self.images.entry(ts_key(ts)).or_insert(record);
    }

    pub fn record_process_run(&mut self, ts: DateTime<Utc>, record: ProcessRunRecord) {
        self.process_runs.entry(ts_key(ts)).or_insert(record);
    }

    pub fn record_sample_start(
        &mut self,
        ts: DateTime<Utc>,
        actor: Option<String>,
        target_volume: &str,
        dwsm: bool,
    ) {
        self.samples.entry(ts_key(ts)).or_insert(SampleRecord {
            actor,
            dwsm,
            target_volume: target_volume.to_string(),
            endts: None,
            actual_volume: None,
        });
    }

    /// Close the most recent open DWSM sample. Bag samples report no actual
    /// volume, so only the end timestamp is filled in.
    pub fn close_dwsm_sample(&mut self, ts: DateTime<Utc>) {
        let open = self
            .samples
            .iter_mut()
            .rev()
            .find(|(_, sample)| sample.dwsm && sample.endts.is_none());
        match open {
            Some((_, sample)) => sample.endts = Some(ts.timestamp_millis()),
            None => debug!("bag stabilize line with no open bag sample"),
        }
    }

    /// Close the most recent sample that has neither an end timestamp nor an
    /// actual volume, recording both.
    pub fn close_sample(&mut self, ts: DateTime<Utc>, actual_volume: &str) {
        let open = self
            .samples
            .iter_mut()
            .rev()
            .find(|(_, sample)| sample.endts.is_none() && sample.actual_volume.is_none());
        match open {
            Some((_, sample)) => {
                sample.endts = Some(ts.timestamp_millis());
                sample.actual_volume = Some(actual_volume.to_string());
            }
            None => debug!("sampled line with no open sample"),
        }
    }

    /// Register a (source, raw unit) pair in the catalog from its lookup
    /// definition, seeding the point count at zero. Existing entries keep
    /// their counts and any assigned source id.
    pub fn register_ancillary_variable(&mut self, source: &str, raw_unit: &str, def: &VariableDef) {
        self.ancillary_data
            .entry(source.to_string())
            .or_default()
            .entry(raw_unit.to_string())
            .or_insert_with(|| AncillaryVariableRecord {
                var_name: def.var_name.clone(),
                var_long_name: def.var_long_name.clone(),
                units: def.units.clone(),
                source_id: None,
                num_points: 0,
            });
    }

    pub fn bump_ancillary(&mut self, source: &str, raw_unit: &str) {
        if let Some(record) = self
            .ancillary_data
            .get_mut(source)
            .and_then(|units| units.get_mut(raw_unit))
        {
            record.num_points += 1;
        }
    }
}
