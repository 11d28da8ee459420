//! Generator-tag category tables.
//!
//! Both generators share one pipeline; everything that differs between them
//! (event types, centrality classes, statistics subsamples, the R03 weight
//! correction) lives in the `AnalysisConfig` resolved here.

use super::constants::{HIGH_STATISTICS_MIN_PT, JET_RADII, R03_LABEL};
use crate::domain::{
    CategoryKey, GeneratorTag, InputCategory, RaaError, RaaResult, SubsampleSlot,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentralityClass {
    /// Form used in input file names, e.g. `0-10`.
    pub file_label: String,
    /// Form used in counter and output names, e.g. `0to10`.
    pub tag_label: String,
}

impl CentralityClass {
    fn new(file_label: &str, tag_label: &str) -> Self {
        Self {
            file_label: file_label.to_string(),
            tag_label: tag_label.to_string(),
        }
    }
}

/// How the subsamples are merged into one ratio per bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SubsampleRule {
    Single,
    /// Bins whose lower edge is at or above `min_pt` take the last subsample,
    /// all other bins the first.
    HighStatisticsAbove { min_pt: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionTarget {
    Reference,
    HeavyIon {
        event_type: String,
        centrality: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub tag: GeneratorTag,
    pub radii: Vec<String>,
    pub event_types: Vec<String>,
    pub centralities: Vec<CentralityClass>,
    pub subsamples: Vec<String>,
    pub subsample_rule: SubsampleRule,
    pub r03_corrections: Vec<CorrectionTarget>,
}

impl AnalysisConfig {
    pub fn resolve(tag: &str) -> RaaResult<Self> {
        let tag = tag.parse::<GeneratorTag>()?;
        Ok(Self::for_tag(tag))
    }

    pub fn for_tag(tag: GeneratorTag) -> Self {
        let radii = JET_RADII.iter().map(|radius| radius.to_string()).collect();
        match tag {
            GeneratorTag::Jewel => Self {
                tag,
                radii,
                event_types: vec!["PbPbNoRecoil".to_string(), "PbPb".to_string()],
                centralities: vec![
                    CentralityClass::new("0-10", "0to10"),
                    CentralityClass::new("10-30", "10to30"),
                    CentralityClass::new("30-50", "30to50"),
                    CentralityClass::new("50-90", "50to90"),
                ],
                subsamples: vec![String::new()],
                subsample_rule: SubsampleRule::Single,
                r03_corrections: vec![
                    CorrectionTarget::Reference,
                    CorrectionTarget::HeavyIon {
                        event_type: "PbPb".to_string(),
                        centrality: "0-10".to_string(),
                    },
                    CorrectionTarget::HeavyIon {
                        event_type: "PbPb".to_string(),
                        centrality: "10-30".to_string(),
                    },
                ],
            },
            GeneratorTag::Pyquen => Self {
                tag,
                radii,
                event_types: vec!["PbPbWide".to_string(), "PbPb".to_string()],
                centralities: vec![CentralityClass::new("0-10", "0to10")],
                subsamples: vec!["LowPtHat".to_string(), "HighPtHat".to_string()],
                subsample_rule: SubsampleRule::HighStatisticsAbove {
                    min_pt: HIGH_STATISTICS_MIN_PT,
                },
                r03_corrections: Vec::new(),
            },
        }
    }

    /// One reference file plus one file per (type, centrality), per subsample.
    pub fn expected_input_count(&self) -> usize {
        self.subsamples.len() * (self.event_types.len() * self.centralities.len() + 1)
    }

    pub fn validate_input_count(&self, supplied: usize) -> RaaResult<()> {
        let expected = self.expected_input_count();
        if supplied == expected {
            return Ok(());
        }
        Err(RaaError::cardinality(
            "INPUT.FILE_COUNT",
            format!(
                "Please input {} files for {} ({} supplied): {}",
                expected,
                self.tag,
                supplied,
                self.expected_inputs_summary()
            ),
        ))
    }

    fn expected_inputs_summary(&self) -> String {
        let centralities = self
            .centralities
            .iter()
            .map(|centrality| format!("{}%", centrality.file_label))
            .collect::<Vec<_>>()
            .join(", ");
        let subsamples = if self.subsamples.len() > 1 {
            format!(" in each subsample ({})", self.subsamples.join(", "))
        } else {
            String::new()
        };
        format!(
            "PP and {} for centrality {}{}",
            self.event_types.join(", "),
            centralities,
            subsamples
        )
    }

    pub fn categories(&self) -> impl Iterator<Item = CategoryKey> + '_ {
        (0..self.subsamples.len()).flat_map(move |subsample| {
            (0..self.event_types.len()).flat_map(move |event_type| {
                (0..self.centralities.len())
                    .map(move |centrality| CategoryKey::new(subsample, event_type, centrality))
            })
        })
    }

    /// Every input the run needs, references first within each subsample.
    pub fn input_categories(&self) -> Vec<InputCategory> {
        let mut inputs = Vec::with_capacity(self.expected_input_count());
        for subsample in 0..self.subsamples.len() {
            inputs.push(InputCategory::Reference { subsample });
            inputs.extend(
                self.categories()
                    .filter(|key| key.subsample == subsample)
                    .map(InputCategory::HeavyIon),
            );
        }
        inputs
    }

    pub fn slots(&self) -> Vec<SubsampleSlot> {
        let mut slots = (0..self.subsamples.len())
            .map(SubsampleSlot::Sample)
            .collect::<Vec<_>>();
        if self.subsamples.len() > 1 {
            slots.push(SubsampleSlot::Merged);
        }
        slots
    }

    pub fn slot_label(&self, slot: SubsampleSlot) -> &str {
        match slot {
            SubsampleSlot::Sample(index) => &self.subsamples[index],
            SubsampleSlot::Merged => "Merged",
        }
    }

    /// Subsample whose spectra feed the merged ratio of a bin starting at
    /// `low_edge`.
    pub fn subsample_for_bin(&self, low_edge: f64) -> usize {
        match self.subsample_rule {
            SubsampleRule::Single => 0,
            SubsampleRule::HighStatisticsAbove { min_pt } => {
                if low_edge >= min_pt {
                    self.subsamples.len() - 1
                } else {
                    0
                }
            }
        }
    }

    /// Index of the numerically smallest radius.
    pub fn reference_radius(&self) -> usize {
        (0..self.radii.len())
            .min_by(|a, b| {
                radius_value(&self.radii[*a]).total_cmp(&radius_value(&self.radii[*b]))
            })
            .unwrap_or(0)
    }

    pub fn radius_index(&self, label: &str) -> Option<usize> {
        self.radii.iter().position(|radius| radius == label)
    }

    pub fn jet_branch_name(&self, radius: usize) -> String {
        format!("SignalJet{}{}Pt", self.radii[radius], self.tag)
    }

    pub fn needs_r03_correction(&self, input: InputCategory) -> bool {
        self.r03_corrections.iter().any(|target| match (target, input) {
            (CorrectionTarget::Reference, InputCategory::Reference { .. }) => true,
            (
                CorrectionTarget::HeavyIon {
                    event_type,
                    centrality,
                },
                InputCategory::HeavyIon(key),
            ) => {
                self.event_types[key.event_type] == *event_type
                    && self.centralities[key.centrality].file_label == *centrality
            }
            _ => false,
        })
    }

    pub fn r03_radius(&self) -> Option<usize> {
        self.radius_index(R03_LABEL)
    }

    pub fn input_label(&self, input: InputCategory) -> String {
        match input {
            InputCategory::Reference { subsample } => format!("PP{}", self.subsamples[subsample]),
            InputCategory::HeavyIon(key) => format!(
                "{}{} {}%",
                self.event_types[key.event_type],
                self.subsamples[key.subsample],
                self.centralities[key.centrality].file_label
            ),
        }
    }
}

/// `"02"` → 0.2.
pub fn radius_value(label: &str) -> f64 {
    label.parse::<f64>().map(|value| value / 10.0).unwrap_or(f64::INFINITY)
}
