//! Source registry.
//!
//! Every supported device export is a [`SourceKind`] variant with one static
//! [`SourceSpec`]. Adding a device means adding a variant, a spec and an
//! entry in [`SourceKind::ALL`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported device exports, in processing priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Bike computer stream export. Provides the time axis.
    Wahoo,
    /// Muscle oxygen sensor sampled at 10 Hz.
    TrainRed,
    /// Breathing sensor export with a metadata preamble.
    Tymewear,
    /// Watch stream export, distinguished from the bike computer by its HRV column.
    Garmin,
}

impl SourceKind {
    /// All kinds ordered by ascending priority.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Wahoo,
        SourceKind::TrainRed,
        SourceKind::Tymewear,
        SourceKind::Garmin,
    ];

    /// Static descriptor for this kind.
    pub fn spec(self) -> &'static SourceSpec {
        match self {
            SourceKind::Wahoo => &WAHOO,
            SourceKind::TrainRed => &TRAINRED,
            SourceKind::Tymewear => &TYMEWEAR,
            SourceKind::Garmin => &GARMIN,
        }
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Parse a kind from its name (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
    }

    /// True for the kind whose rows define the output grid.
    pub fn is_base(self) -> bool {
        self.spec().is_base
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Int,
    Float,
    Text,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }

    pub fn label(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        }
    }
}

/// One column a source contributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    /// Column name in the raw export.
    pub source: &'static str,
    /// Alternative raw names accepted when `source` is absent.
    pub aliases: &'static [&'static str],
    /// Column name in the clean table.
    pub output: &'static str,
    pub kind: ColumnType,
    /// Value used when the column is absent and filling is enabled.
    pub fallback: Option<f64>,
}

impl ColumnSpec {
    const fn new(source: &'static str, output: &'static str, kind: ColumnType) -> Self {
        Self {
            source,
            aliases: &[],
            output,
            kind,
            fallback: None,
        }
    }

    const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn with_fallback(mut self, value: f64) -> Self {
        self.fallback = Some(value);
        self
    }

    /// Raw names this column may appear under, preferred name first.
    pub fn source_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.source).chain(self.aliases.iter().copied())
    }
}

/// How a file is recognised as belonging to a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStrategy {
    /// The header row (within the scan window) contains every keyword.
    HeaderKeywords { keywords: &'static [&'static str] },
    /// File name suffix plus a discriminating keyword in the first line.
    FileName {
        suffix: &'static str,
        discriminator: &'static str,
        /// Whether the discriminator must be present (true) or absent (false).
        discriminator_present: bool,
        /// At least one of these must appear in the first line (empty = no constraint).
        any_of: &'static [&'static str],
    },
}

/// Static descriptor of a source kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSpec {
    pub kind: SourceKind,
    pub name: &'static str,
    /// Lower runs first.
    pub priority: u32,
    pub detection: DetectionStrategy,
    pub input_hz: f64,
    pub output_hz: f64,
    pub required: &'static [ColumnSpec],
    pub optional: &'static [ColumnSpec],
    pub is_base: bool,
    /// Name of the time column in the raw export, if the export has one.
    pub time_column: Option<&'static str>,
}

impl SourceSpec {
    /// Required then optional columns.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.required.iter().chain(self.optional.iter())
    }

    /// Whether processing reduces the sampling rate.
    pub fn needs_resampling(&self) -> bool {
        self.input_hz > self.output_hz
    }

    /// Output names of every column the clean table may contain.
    pub fn output_columns(&self) -> Vec<&'static str> {
        self.columns().map(|column| column.output).collect()
    }
}

static WAHOO: SourceSpec = SourceSpec {
    kind: SourceKind::Wahoo,
    name: "Wahoo",
    priority: 1,
    detection: DetectionStrategy::FileName {
        suffix: "streams.csv",
        discriminator: "hrv",
        discriminator_present: false,
        any_of: &["secs", "watts"],
    },
    input_hz: 1.0,
    output_hz: 1.0,
    required: &[ColumnSpec::new("secs", "secs", ColumnType::Int)],
    optional: &[
        ColumnSpec::new("watts", "watts", ColumnType::Float),
        ColumnSpec::new("cadence", "cadence", ColumnType::Float),
        ColumnSpec::new("heartrate", "heartrate", ColumnType::Float),
        ColumnSpec::new("distance", "distance", ColumnType::Float),
        ColumnSpec::new("speed", "speed", ColumnType::Float),
        ColumnSpec::new("altitude", "altitude", ColumnType::Float),
    ],
    is_base: true,
    time_column: Some("secs"),
};

static TRAINRED: SourceSpec = SourceSpec {
    kind: SourceKind::TrainRed,
    name: "TrainRed",
    priority: 10,
    detection: DetectionStrategy::HeaderKeywords {
        keywords: &["SmO2", "THb"],
    },
    input_hz: 10.0,
    output_hz: 1.0,
    required: &[
        ColumnSpec::new("SmO2", "smo2", ColumnType::Float).with_fallback(0.0),
        ColumnSpec::new("THb unfiltered", "THb", ColumnType::Float)
            .with_aliases(&["THb"])
            .with_fallback(0.0),
    ],
    optional: &[ColumnSpec::new("Device", "Device", ColumnType::Text)],
    is_base: false,
    time_column: Some("Timestamp (seconds passed)"),
};

static TYMEWEAR: SourceSpec = SourceSpec {
    kind: SourceKind::Tymewear,
    name: "Tymewear",
    priority: 20,
    detection: DetectionStrategy::HeaderKeywords {
        keywords: &["BR", "VT", "VE"],
    },
    input_hz: 1.0,
    output_hz: 1.0,
    required: &[
        ColumnSpec::new("BR", "TymeBreathRate", ColumnType::Float),
        ColumnSpec::new("VT", "tidal_volume", ColumnType::Float),
        ColumnSpec::new("VE", "TymeVentilation", ColumnType::Float),
    ],
    optional: &[],
    is_base: false,
    time_column: None,
};

static GARMIN: SourceSpec = SourceSpec {
    kind: SourceKind::Garmin,
    name: "Garmin",
    priority: 30,
    detection: DetectionStrategy::FileName {
        suffix: "streams.csv",
        discriminator: "hrv",
        discriminator_present: true,
        any_of: &[],
    },
    input_hz: 1.0,
    output_hz: 1.0,
    required: &[],
    optional: &[
        ColumnSpec::new("skin_temperature", "skin_temperature", ColumnType::Float),
        ColumnSpec::new("HeatStrainIndex", "HeatStrainIndex", ColumnType::Float),
        ColumnSpec::new("core_temperature", "core_temperature", ColumnType::Float),
        ColumnSpec::new("hrv", "hrv", ColumnType::Float),
    ],
    is_base: false,
    time_column: None,
};
