pub mod errors;

pub use errors::{
    EmitResult, FATAL_EXIT_CODE, IngestResult, RaaError, RaaErrorCategory, RaaResult,
};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorTag {
    Jewel,
    Pyquen,
}

impl GeneratorTag {
    pub const ALL: [GeneratorTag; 2] = [Self::Jewel, Self::Pyquen];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jewel => "Jewel",
            Self::Pyquen => "Pyquen",
        }
    }
}

impl Display for GeneratorTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for GeneratorTag {
    type Err = RaaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == value)
            .ok_or_else(|| {
                RaaError::configuration(
                    "CONFIG.UNKNOWN_TAG",
                    format!("Type should be \"Jewel\" or \"Pyquen\", got \"{}\"", value),
                )
            })
    }
}

/// Heavy-ion category: indices into the resolved type, centrality and
/// subsample tables of an `AnalysisConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryKey {
    pub subsample: usize,
    pub event_type: usize,
    pub centrality: usize,
}

impl CategoryKey {
    pub const fn new(subsample: usize, event_type: usize, centrality: usize) -> Self {
        Self {
            subsample,
            event_type,
            centrality,
        }
    }
}

/// What a single input file feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InputCategory {
    Reference { subsample: usize },
    HeavyIon(CategoryKey),
}

impl InputCategory {
    pub const fn subsample(self) -> usize {
        match self {
            Self::Reference { subsample } => subsample,
            Self::HeavyIon(key) => key.subsample,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpectrumKey {
    pub input: InputCategory,
    pub radius: usize,
}

impl SpectrumKey {
    pub const fn new(input: InputCategory, radius: usize) -> Self {
        Self { input, radius }
    }

    pub const fn reference(subsample: usize, radius: usize) -> Self {
        Self::new(InputCategory::Reference { subsample }, radius)
    }

    pub const fn heavy_ion(category: CategoryKey, radius: usize) -> Self {
        Self::new(InputCategory::HeavyIon(category), radius)
    }
}

/// Subsample axis of a ratio: one concrete subsample, or the per-bin merge
/// of all subsamples under the configured selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubsampleSlot {
    Sample(usize),
    Merged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatioKind {
    Raa,
    Rraa,
}

impl RatioKind {
    pub const ALL: [RatioKind; 2] = [Self::Raa, Self::Rraa];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raa => "RAA",
            Self::Rraa => "RRAA",
        }
    }

    /// Fixed display range of the review plots.
    pub const fn y_range(self) -> (f64, f64) {
        match self {
            Self::Raa => (0.0, 1.5),
            Self::Rraa => (0.0, 2.5),
        }
    }
}

impl Display for RatioKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RatioKey {
    pub kind: RatioKind,
    pub slot: SubsampleSlot,
    pub event_type: usize,
    pub centrality: usize,
    pub radius: usize,
}
