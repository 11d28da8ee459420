//! Binary analysis store: every counter of a run, keyed by its name.

use crate::common::binning::BinEdges;
use crate::common::config::AnalysisConfig;
use crate::domain::{EmitResult, RaaError};
use crate::modules::histogram::{Histogram, RatioHistogram};
use crate::modules::ratio::RatioSet;
use crate::modules::spectra::SpectrumSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramStore {
    pub config: AnalysisConfig,
    pub bin_edges: BinEdges,
    pub spectra: BTreeMap<String, Histogram>,
    pub rebinned: BTreeMap<String, Histogram>,
    pub ratios: BTreeMap<String, RatioHistogram>,
}

impl HistogramStore {
    pub fn collect(
        config: &AnalysisConfig,
        bin_edges: &BinEdges,
        spectra: &SpectrumSet,
        rebinned: &SpectrumSet,
        ratios: &RatioSet,
    ) -> Self {
        let by_name = |set: &SpectrumSet| {
            set.iter()
                .map(|(_, histogram)| (histogram.name.clone(), histogram.clone()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            config: config.clone(),
            bin_edges: bin_edges.clone(),
            spectra: by_name(spectra),
            rebinned: by_name(rebinned),
            ratios: ratios
                .iter()
                .map(|(_, ratio)| (ratio.name.clone(), ratio.clone()))
                .collect(),
        }
    }

    pub fn object_count(&self) -> usize {
        self.spectra.len() + self.rebinned.len() + self.ratios.len()
    }

    pub fn to_bytes(&self) -> EmitResult<Vec<u8>> {
        bincode::serialize(self).map_err(|source| {
            RaaError::internal(
                "INTERNAL.STORE_SERIALIZE",
                format!("failed to serialize histogram store: {}", source),
            )
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> EmitResult<Self> {
        bincode::deserialize(bytes).map_err(|source| {
            RaaError::io_system(
                "IO.STORE_DECODE",
                format!("failed to decode histogram store: {}", source),
            )
        })
    }

    pub fn write(&self, path: &Path) -> EmitResult<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|source| {
            RaaError::io_system(
                "IO.STORE_WRITE",
                format!("failed to write '{}': {}", path.display(), source),
            )
        })
    }

    pub fn read(path: &Path) -> EmitResult<Self> {
        let bytes = fs::read(path).map_err(|source| {
            RaaError::io_system(
                "IO.STORE_READ",
                format!("failed to read '{}': {}", path.display(), source),
            )
        })?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::HistogramStore;
    use crate::common::binning::BinEdges;
    use crate::common::config::AnalysisConfig;
    use crate::domain::GeneratorTag;
    use crate::modules::ratio::RatioSet;
    use crate::modules::spectra::SpectrumSet;
    use tempfile::TempDir;

    #[test]
    fn store_is_keyed_by_counter_name_and_reads_back() {
        let config = AnalysisConfig::for_tag(GeneratorTag::Jewel);
        let edges = BinEdges::parse_csv("200,300,1000").expect("edges");
        let spectra = SpectrumSet::allocate(&config).expect("allocation");
        let rebinned = spectra.rebin(&edges);
        let store =
            HistogramStore::collect(&config, &edges, &spectra, &rebinned, &RatioSet::default());

        assert_eq!(store.object_count(), 2 * 9 * 6);
        assert!(store.spectra.contains_key("PP_R03_JetPT"));
        assert!(store.rebinned.contains_key("PbPb_R03_C10to30_JetPT_Rebin"));

        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("run.bin");
        store.write(&path).expect("store should be written");
        let restored = HistogramStore::read(&path).expect("store should read back");
        assert_eq!(restored, store);
    }

    #[test]
    fn corrupt_store_is_reported_as_io_error() {
        let error = HistogramStore::from_bytes(&[1, 2, 3]).expect_err("garbage should not decode");
        assert_eq!(error.placeholder(), "IO.STORE_DECODE");
    }
}
