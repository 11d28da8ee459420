//! Weighted spectrum counters and the ratio counters derived from them.

use crate::common::binning::{BinEdges, BinLocation};
use crate::common::constants::EDGE_TOLERANCE;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Weighted 1D histogram with per-bin sum of squared weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub name: String,
    pub title: String,
    edges: BinEdges,
    contents: Vec<f64>,
    sumw2: Vec<f64>,
    underflow: f64,
    overflow: f64,
    underflow_sumw2: f64,
    overflow_sumw2: f64,
    entries: u64,
}

impl Histogram {
    pub fn new(name: impl Into<String>, title: impl Into<String>, edges: BinEdges) -> Self {
        let bin_count = edges.bin_count();
        Self {
            name: name.into(),
            title: title.into(),
            edges,
            contents: vec![0.0; bin_count],
            sumw2: vec![0.0; bin_count],
            underflow: 0.0,
            overflow: 0.0,
            underflow_sumw2: 0.0,
            overflow_sumw2: 0.0,
            entries: 0,
        }
    }

    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    pub fn bin_count(&self) -> usize {
        self.contents.len()
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    pub fn bin_content(&self, bin: usize) -> f64 {
        self.contents[bin]
    }

    pub fn bin_sumw2(&self, bin: usize) -> f64 {
        self.sumw2[bin]
    }

    pub fn bin_error(&self, bin: usize) -> f64 {
        self.sumw2[bin].sqrt()
    }

    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    pub fn fill(&mut self, value: f64, weight: f64) {
        let weight_squared = weight * weight;
        self.entries += 1;
        match self.edges.locate(value) {
            BinLocation::Underflow => {
                self.underflow += weight;
                self.underflow_sumw2 += weight_squared;
            }
            BinLocation::Overflow => {
                self.overflow += weight;
                self.overflow_sumw2 += weight_squared;
            }
            BinLocation::Bin(bin) => {
                self.contents[bin] += weight;
                self.sumw2[bin] += weight_squared;
            }
        }
    }

    /// Multiplies contents by `factor` and squared weights by `factor²`.
    pub fn scale(&mut self, factor: f64) {
        let factor_squared = factor * factor;
        for content in &mut self.contents {
            *content *= factor;
        }
        for sumw2 in &mut self.sumw2 {
            *sumw2 *= factor_squared;
        }
        self.underflow *= factor;
        self.overflow *= factor;
        self.underflow_sumw2 *= factor_squared;
        self.overflow_sumw2 *= factor_squared;
    }

    /// Sum of in-range bins.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Sum of in-range bins plus underflow and overflow.
    pub fn total_with_flows(&self) -> f64 {
        self.integral() + self.underflow + self.overflow
    }

    pub fn total_sumw2_with_flows(&self) -> f64 {
        self.sumw2.iter().sum::<f64>() + self.underflow_sumw2 + self.overflow_sumw2
    }

    /// Projects onto `edges`, assigning every fine bin by its centre. Fine
    /// bins outside the new range land in the new underflow/overflow.
    pub fn rebin(&self, name: impl Into<String>, edges: &BinEdges) -> Histogram {
        let name = name.into();
        let misaligned = edges
            .as_slice()
            .iter()
            .filter(|edge| {
                **edge > self.edges.first()
                    && **edge < self.edges.last()
                    && !self.edges.contains_edge(**edge, EDGE_TOLERANCE)
            })
            .copied()
            .collect::<Vec<_>>();
        if !misaligned.is_empty() {
            warn!(
                histogram = %name,
                edges = ?misaligned,
                "rebin edges do not match any fine bin edge; result can be inconsistent"
            );
        }

        let mut rebinned = Histogram::new(name, self.title.clone(), edges.clone());
        rebinned.entries = self.entries;
        rebinned.underflow = self.underflow;
        rebinned.underflow_sumw2 = self.underflow_sumw2;
        rebinned.overflow = self.overflow;
        rebinned.overflow_sumw2 = self.overflow_sumw2;

        for bin in 0..self.bin_count() {
            let content = self.contents[bin];
            let sumw2 = self.sumw2[bin];
            match edges.locate(self.edges.center(bin)) {
                BinLocation::Underflow => {
                    rebinned.underflow += content;
                    rebinned.underflow_sumw2 += sumw2;
                }
                BinLocation::Overflow => {
                    rebinned.overflow += content;
                    rebinned.overflow_sumw2 += sumw2;
                }
                BinLocation::Bin(target) => {
                    rebinned.contents[target] += content;
                    rebinned.sumw2[target] += sumw2;
                }
            }
        }

        rebinned
    }
}

/// Per-bin value with a symmetric error, computed once from two counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioHistogram {
    pub name: String,
    pub title: String,
    edges: BinEdges,
    values: Vec<f64>,
    errors: Vec<f64>,
    y_range: (f64, f64),
}

impl RatioHistogram {
    pub fn from_bins(
        name: impl Into<String>,
        title: impl Into<String>,
        edges: BinEdges,
        bins: Vec<(f64, f64)>,
        y_range: (f64, f64),
    ) -> Self {
        let (values, errors) = bins.into_iter().unzip();
        Self {
            name: name.into(),
            title: title.into(),
            edges,
            values,
            errors,
            y_range,
        }
    }

    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    pub fn bin_count(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, bin: usize) -> f64 {
        self.values[bin]
    }

    pub fn error(&self, bin: usize) -> f64 {
        self.errors[bin]
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.y_range
    }
}
