//! Read-only lookup tables: timezone abbreviations and the ancillary
//! variable catalog. Both can be overridden from the config file; the
//! compiled-in defaults match the legacy deployment configuration.

use std::collections::HashMap;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// UTC offset for one timezone abbreviation as it appears in `@` markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezoneEntry {
    /// Offset in `+HHMM`/`-HHMM` string form, e.g. `-0700`.
    pub string_rep: String,
    /// Whole hours east of UTC, e.g. `-7`.
    pub hour_offset: i32,
}

impl TimezoneEntry {
    pub fn fixed_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.hour_offset * 3600)
    }
}

/// Timezone abbreviation -> UTC offset table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimezoneTable(HashMap<String, TimezoneEntry>);

impl TimezoneTable {
    pub fn lookup(&self, abbreviation: &str) -> Option<&TimezoneEntry> {
        self.0.get(abbreviation)
    }
}

impl Default for TimezoneTable {
    fn default() -> Self {
        let mut table = HashMap::new();
        for (abbr, string_rep, hour_offset) in [
            ("UTC", "0000", 0),
            ("GMT", "0000", 0),
            ("EDT", "-0400", -4),
            ("PDT", "-0700", -7),
            ("PST", "-0800", -8),
        ] {
            table.insert(
                abbr.to_string(),
                TimezoneEntry {
                    string_rep: string_rep.to_string(),
                    hour_offset,
                },
            );
        }
        Self(table)
    }
}

/// Canonical identity of one ancillary variable, keyed in the catalog by
/// (instrument source, unit string as logged).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    pub var_name: String,
    pub var_long_name: String,
    pub units: String,
}

/// (source, raw unit) -> canonical variable catalog. Readings whose
/// combination is missing here are silently dropped by the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AncillaryCatalog(HashMap<String, HashMap<String, VariableDef>>);

impl AncillaryCatalog {
    pub fn lookup(&self, source: &str, raw_units: &str) -> Option<&VariableDef> {
        self.0.get(source)?.get(raw_units)
    }
}

fn def(var_name: &str, var_long_name: &str, units: &str) -> VariableDef {
    VariableDef {
        var_name: var_name.to_string(),
        var_long_name: var_long_name.to_string(),
        units: units.to_string(),
    }
}

impl Default for AncillaryCatalog {
    fn default() -> Self {
        let mut catalog = HashMap::new();

        let mut ctd = HashMap::new();
        ctd.insert("C".to_string(), def("Temp", "Temperature", "Degrees C"));
        ctd.insert("m".to_string(), def("Depth", "Depth", "meters"));
        ctd.insert("psu".to_string(), def("Sal", "Salinity", "psu"));
        ctd.insert("mg/m^3".to_string(), def("Chl", "Chlorophyll", "mg/m^3"));
        ctd.insert("%".to_string(), def("Light Tx", "Light Transmission", "%"));
        ctd.insert(
            "ml/L".to_string(),
            def("Diss O2", "Computed Dissolved Oxygen", "ml/L"),
        );
        ctd.insert("decibars".to_string(), def("Press", "Pressure", "decibars"));
        ctd.insert("S/m".to_string(), def("Cond", "Conductivity", "S/m"));
        catalog.insert("CTD".to_string(), ctd);

        let mut can = HashMap::new();
        can.insert("C".to_string(), def("Temp", "Temperature", "Degrees C"));
        can.insert(
            "% humidity".to_string(),
            def("% Humidity", "Percent Humidity", "%"),
        );
        can.insert("psia".to_string(), def("Press", "Pressure", "psia"));
        can.insert("V".to_string(), def("Volt", "Battery Voltage", "V"));
        can.insert("A".to_string(), def("Inst Curr", "Instantaneous Current", "A"));
        can.insert("A avg".to_string(), def("Avg Curr", "Average Current", "A"));
        can.insert("W".to_string(), def("Power", "Power", "W"));
        catalog.insert("Can".to_string(), can);

        let mut isus = HashMap::new();
        isus.insert("uM/L no^3".to_string(), def("Nitrate", "Nitrate", "uM/L no^3"));
        isus.insert("uM/L hs".to_string(), def("Nitrate 2", "Nitrate 2", "uM/L hs"));
        isus.insert("psu".to_string(), def("PSU", "PSU", "psu"));
        catalog.insert("ISUS".to_string(), isus);

        let mut satlantic = HashMap::new();
        satlantic.insert("uM/L".to_string(), def("Nitrate", "Nitrate", "uM/L"));
        satlantic.insert("psu".to_string(), def("PSU", "PSU", "psu"));
        catalog.insert("SatlanticISUS".to_string(), satlantic);

        Self(catalog)
    }
}
