//! ROOT copy of every counter: one tree per counter, named after it, with
//! one entry per bin.

use crate::domain::{EmitResult, RaaError};
use crate::modules::histogram::{Histogram, RatioHistogram};
use crate::modules::ratio::RatioSet;
use crate::modules::spectra::SpectrumSet;
use oxyroot::{RootFile, WriterTree};
use std::path::Path;

pub const LOW_EDGE_BRANCH: &str = "LowEdge";
pub const HIGH_EDGE_BRANCH: &str = "HighEdge";
pub const CONTENT_BRANCH: &str = "Content";
pub const ERROR_BRANCH: &str = "Error";

struct BinColumns {
    name: String,
    low: Vec<f64>,
    high: Vec<f64>,
    content: Vec<f64>,
    error: Vec<f64>,
}

impl BinColumns {
    fn from_histogram(histogram: &Histogram) -> Self {
        let edges = histogram.edges();
        let bins = 0..histogram.bin_count();
        Self {
            name: histogram.name.clone(),
            low: bins.clone().map(|bin| edges.low_edge(bin)).collect(),
            high: bins.clone().map(|bin| edges.high_edge(bin)).collect(),
            content: bins.clone().map(|bin| histogram.bin_content(bin)).collect(),
            error: bins.map(|bin| histogram.bin_error(bin)).collect(),
        }
    }

    fn from_ratio(ratio: &RatioHistogram) -> Self {
        let edges = ratio.edges();
        let bins = 0..ratio.bin_count();
        Self {
            name: ratio.name.clone(),
            low: bins.clone().map(|bin| edges.low_edge(bin)).collect(),
            high: bins.clone().map(|bin| edges.high_edge(bin)).collect(),
            content: bins.clone().map(|bin| ratio.value(bin)).collect(),
            error: bins.map(|bin| ratio.error(bin)).collect(),
        }
    }
}

fn write_error(path: &Path, detail: String) -> RaaError {
    RaaError::io_system(
        "IO.ROOT_WRITE",
        format!("failed to write '{}': {}", path.display(), detail),
    )
}

/// Returns the number of trees written.
pub fn write_root_file(
    spectra: &SpectrumSet,
    rebinned: &SpectrumSet,
    ratios: &RatioSet,
    path: &Path,
) -> EmitResult<usize> {
    let columns = spectra
        .iter()
        .chain(rebinned.iter())
        .map(|(_, histogram)| BinColumns::from_histogram(histogram))
        .chain(ratios.iter().map(|(_, ratio)| BinColumns::from_ratio(ratio)))
        .collect::<Vec<_>>();

    let mut file =
        RootFile::create(path).map_err(|source| write_error(path, source.to_string()))?;
    let count = columns.len();
    for counter in columns {
        let mut tree = WriterTree::new(counter.name.as_str());
        tree.new_branch(LOW_EDGE_BRANCH, counter.low.into_iter());
        tree.new_branch(HIGH_EDGE_BRANCH, counter.high.into_iter());
        tree.new_branch(CONTENT_BRANCH, counter.content.into_iter());
        tree.new_branch(ERROR_BRANCH, counter.error.into_iter());
        tree.write(&mut file)
            .map_err(|source| write_error(path, source.to_string()))?;
    }
    file.close()
        .map_err(|source| write_error(path, source.to_string()))?;
    Ok(count)
}
