//! Bin edge sets for fine spectra and caller-supplied coarse binnings.

use crate::domain::{RaaError, RaaResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinLocation {
    Underflow,
    Bin(usize),
    Overflow,
}

/// Strictly increasing edges, at least two of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    pub fn new(edges: Vec<f64>) -> RaaResult<Self> {
        if edges.len() < 2 {
            return Err(RaaError::configuration(
                "CONFIG.BIN_EDGES",
                format!("expected at least two bin edges, got {}", edges.len()),
            ));
        }

        if let Some(value) = edges.iter().find(|value| !value.is_finite()) {
            return Err(RaaError::configuration(
                "CONFIG.BIN_EDGES",
                format!("bin edge '{}' is not a finite number", value),
            ));
        }

        if let Some(pair) = edges.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(RaaError::configuration(
                "CONFIG.BIN_EDGES",
                format!(
                    "bin edges must be strictly increasing ({} is followed by {})",
                    pair[0], pair[1]
                ),
            ));
        }

        Ok(Self { edges })
    }

    /// Parses a comma-separated edge list such as `200,250,300`.
    pub fn parse_csv(source: &str) -> RaaResult<Self> {
        let mut edges = Vec::new();
        for token in source.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let value = token.parse::<f64>().map_err(|_| {
                RaaError::configuration(
                    "CONFIG.BIN_EDGES",
                    format!("invalid bin edge '{}' in '{}'", token, source),
                )
            })?;
            edges.push(value);
        }
        Self::new(edges)
    }

    pub fn uniform(bin_count: usize, low: f64, high: f64) -> RaaResult<Self> {
        if bin_count == 0 {
            return Err(RaaError::configuration(
                "CONFIG.BIN_EDGES",
                "uniform binning requires at least one bin",
            ));
        }
        let width = (high - low) / bin_count as f64;
        let edges = (0..=bin_count)
            .map(|index| {
                if index == bin_count {
                    high
                } else {
                    low + width * index as f64
                }
            })
            .collect();
        Self::new(edges)
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    pub fn low_edge(&self, bin: usize) -> f64 {
        self.edges[bin]
    }

    pub fn high_edge(&self, bin: usize) -> f64 {
        self.edges[bin + 1]
    }

    pub fn center(&self, bin: usize) -> f64 {
        0.5 * (self.edges[bin] + self.edges[bin + 1])
    }

    pub fn first(&self) -> f64 {
        self.edges[0]
    }

    pub fn last(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Lower edges are inclusive, upper edges exclusive; the last edge
    /// belongs to the overflow.
    pub fn locate(&self, value: f64) -> BinLocation {
        if value < self.first() {
            return BinLocation::Underflow;
        }
        if value >= self.last() {
            return BinLocation::Overflow;
        }
        let upper = self.edges.partition_point(|edge| *edge <= value);
        BinLocation::Bin(upper - 1)
    }

    pub fn contains_edge(&self, value: f64, tolerance: f64) -> bool {
        self.edges
            .iter()
            .any(|edge| (edge - value).abs() <= tolerance)
    }

    pub fn csv(&self) -> String {
        self.edges
            .iter()
            .map(|edge| edge.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::{BinEdges, BinLocation};
    use crate::domain::RaaErrorCategory;

    #[test]
    fn parses_default_csv_edges() {
        let edges = BinEdges::parse_csv("200,250,300,400,500,1000").expect("edges should parse");
        assert_eq!(edges.bin_count(), 5);
        assert_eq!(edges.low_edge(2), 300.0);
        assert_eq!(edges.high_edge(4), 1000.0);
        assert_eq!(edges.csv(), "200,250,300,400,500,1000");
    }

    #[test]
    fn rejects_unsorted_short_and_malformed_edges() {
        for source in ["200", "200,200,300", "300,200", "200,abc,300", ""] {
            let error = BinEdges::parse_csv(source).expect_err("edges should be rejected");
            assert_eq!(error.category(), RaaErrorCategory::Configuration);
            assert_eq!(error.placeholder(), "CONFIG.BIN_EDGES");
        }
    }

    #[test]
    fn locate_treats_lower_edges_as_inclusive() {
        let edges = BinEdges::parse_csv("200,250,300").expect("edges should parse");
        assert_eq!(edges.locate(199.9), BinLocation::Underflow);
        assert_eq!(edges.locate(200.0), BinLocation::Bin(0));
        assert_eq!(edges.locate(250.0), BinLocation::Bin(1));
        assert_eq!(edges.locate(299.999), BinLocation::Bin(1));
        assert_eq!(edges.locate(300.0), BinLocation::Overflow);
    }

    #[test]
    fn uniform_binning_hits_both_ends_exactly() {
        let edges = BinEdges::uniform(160, 200.0, 1000.0).expect("uniform binning");
        assert_eq!(edges.bin_count(), 160);
        assert_eq!(edges.first(), 200.0);
        assert_eq!(edges.last(), 1000.0);
        assert_eq!(edges.low_edge(10), 250.0);
        assert!(edges.contains_edge(300.0, 1e-9));
    }
}
