mod reader;
mod root;

pub use reader::{EventStoreReader, InMemoryEventStore, JetTree};
pub use root::RootEventStore;

use super::classify::ClassifiedInput;
use super::spectra::SpectrumSet;
use crate::common::config::AnalysisConfig;
use crate::common::constants::{EVENT_WEIGHT_BRANCH, EVENT_WEIGHT_R03_BRANCH, JET_TREE_NAME};
use crate::domain::{IngestResult, RaaError, SpectrumKey};
use std::path::Path;
use tracing::{info, warn};

/// Streams the jets of one classified file into its spectrum counters and
/// normalizes them to a per-event yield.
pub struct SpectrumFiller<'a> {
    config: &'a AnalysisConfig,
    reader: &'a dyn EventStoreReader,
}

impl<'a> SpectrumFiller<'a> {
    pub fn new(config: &'a AnalysisConfig, reader: &'a dyn EventStoreReader) -> Self {
        Self { config, reader }
    }

    /// Returns the number of events consumed.
    pub fn fill(&self, input: &ClassifiedInput, spectra: &mut SpectrumSet) -> IngestResult<usize> {
        let path = input.path.as_path();
        let mut branches = (0..self.config.radii.len())
            .map(|radius| self.config.jet_branch_name(radius))
            .collect::<Vec<_>>();
        branches.push(EVENT_WEIGHT_BRANCH.to_string());
        if input.r03_correction {
            branches.push(EVENT_WEIGHT_R03_BRANCH.to_string());
        }

        let tree = self.reader.read_tree(path, JET_TREE_NAME, &branches)?;
        let entries = tree.entries();
        let weights = weight_column(&tree, path, EVENT_WEIGHT_BRANCH)?;
        let r03_weights = if input.r03_correction {
            Some(weight_column(&tree, path, EVENT_WEIGHT_R03_BRANCH)?)
        } else {
            None
        };
        let r03_radius = self.config.r03_radius();

        for radius in 0..self.config.radii.len() {
            let branch = &branches[radius];
            let jets = tree
                .column(branch)
                .filter(|column| column.len() >= entries)
                .ok_or_else(|| {
                    RaaError::structural(
                        "INPUT.MISSING_BRANCH",
                        format!(
                            "Null branch '{}' in file {} for radius {}",
                            branch,
                            path.display(),
                            self.config.radii[radius]
                        ),
                    )
                })?;

            let (weight_branch, weight_values) = match r03_weights {
                Some(column) if Some(radius) == r03_radius => (EVENT_WEIGHT_R03_BRANCH, column),
                _ => (EVENT_WEIGHT_BRANCH, weights),
            };

            let histogram = spectra.require_mut(SpectrumKey::new(input.category, radius))?;
            for (event, event_jets) in jets.iter().take(entries).enumerate() {
                if event_jets.is_empty() {
                    continue;
                }
                let weight = event_weight(path, weight_branch, weight_values, event)?;
                for pt in event_jets {
                    histogram.fill(*pt, weight);
                }
            }

            if entries > 0 {
                histogram.scale(1.0 / entries as f64);
            }
        }

        if entries == 0 {
            warn!(file = %path.display(), "tree has no events; spectra left unscaled");
        }
        info!(
            file = %path.display(),
            category = %self.config.input_label(input.category),
            events = entries,
            r03_correction = input.r03_correction,
            "filled spectra"
        );
        Ok(entries)
    }
}

/// The weight branch must cover every event, whether or not it has jets.
fn weight_column<'t>(tree: &'t JetTree, path: &Path, branch: &str) -> IngestResult<&'t [Vec<f64>]> {
    let column = tree
        .column(branch)
        .ok_or_else(|| missing_weight(path, branch, "branch is absent"))?;
    if column.len() < tree.entries() {
        return Err(missing_weight(
            path,
            branch,
            &format!("{} values for {} events", column.len(), tree.entries()),
        ));
    }
    Ok(column)
}

fn event_weight(path: &Path, branch: &str, column: &[Vec<f64>], event: usize) -> IngestResult<f64> {
    column
        .get(event)
        .and_then(|values| values.first())
        .copied()
        .ok_or_else(|| missing_weight(path, branch, &format!("no value for event {}", event)))
}

fn missing_weight(path: &Path, branch: &str, detail: &str) -> RaaError {
    RaaError::structural(
        "INPUT.MISSING_WEIGHT",
        format!(
            "event weight '{}' in file {}: {}",
            branch,
            path.display(),
            detail
        ),
    )
}
