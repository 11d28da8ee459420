//! Allocation, naming and rebinning of the per-category spectrum counters.

use super::histogram::Histogram;
use crate::common::binning::BinEdges;
use crate::common::config::AnalysisConfig;
use crate::common::constants::{FINE_BIN_COUNT, FINE_PT_MAX, FINE_PT_MIN};
use crate::domain::{InputCategory, RaaError, RaaResult, SpectrumKey};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectrumSet {
    spectra: BTreeMap<SpectrumKey, Histogram>,
}

impl SpectrumSet {
    /// Empty fine-binned counters for every input category and radius.
    pub fn allocate(config: &AnalysisConfig) -> RaaResult<Self> {
        let fine = BinEdges::uniform(FINE_BIN_COUNT, FINE_PT_MIN, FINE_PT_MAX)?;
        let mut spectra = BTreeMap::new();
        for input in config.input_categories() {
            for radius in 0..config.radii.len() {
                let key = SpectrumKey::new(input, radius);
                let histogram = Histogram::new(
                    spectrum_name(config, key),
                    spectrum_title(config, key),
                    fine.clone(),
                );
                spectra.insert(key, histogram);
            }
        }
        debug!(count = spectra.len(), "allocated spectrum counters");
        Ok(Self { spectra })
    }

    pub(crate) fn len(&self) -> usize {
        self.spectra.len()
    }

    pub fn require(&self, key: SpectrumKey) -> RaaResult<&Histogram> {
        self.spectra.get(&key).ok_or_else(|| missing_spectrum(key))
    }

    pub fn require_mut(&mut self, key: SpectrumKey) -> RaaResult<&mut Histogram> {
        self.spectra.get_mut(&key).ok_or_else(|| missing_spectrum(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SpectrumKey, &Histogram)> {
        self.spectra.iter()
    }

    /// New set projected onto `edges`; `self` is left untouched.
    pub fn rebin(&self, edges: &BinEdges) -> SpectrumSet {
        let spectra = self
            .spectra
            .iter()
            .map(|(key, histogram)| {
                let name = format!("{}_Rebin", histogram.name);
                (*key, histogram.rebin(name, edges))
            })
            .collect();
        SpectrumSet { spectra }
    }
}

fn missing_spectrum(key: SpectrumKey) -> RaaError {
    RaaError::internal(
        "INTERNAL.SPECTRUM_LOOKUP",
        format!("no spectrum counter allocated for {:?}", key),
    )
}

pub fn spectrum_name(config: &AnalysisConfig, key: SpectrumKey) -> String {
    let radius = &config.radii[key.radius];
    match key.input {
        InputCategory::Reference { subsample } => {
            format!("PP{}_R{}_JetPT", config.subsamples[subsample], radius)
        }
        InputCategory::HeavyIon(category) => format!(
            "{}{}_R{}_C{}_JetPT",
            config.event_types[category.event_type],
            config.subsamples[category.subsample],
            radius,
            config.centralities[category.centrality].tag_label
        ),
    }
}

pub fn spectrum_title(config: &AnalysisConfig, key: SpectrumKey) -> String {
    format!(
        "{} R = {} Weighted & Scaled Jet PT",
        config.input_label(key.input),
        config.radii[key.radius]
    )
}

#[cfg(test)]
mod tests {
    use super::{SpectrumSet, spectrum_name};
    use crate::common::binning::BinEdges;
    use crate::common::config::AnalysisConfig;
    use crate::domain::{CategoryKey, GeneratorTag, SpectrumKey};

    #[test]
    fn allocates_one_counter_per_input_and_radius() {
        let jewel = AnalysisConfig::for_tag(GeneratorTag::Jewel);
        let spectra = SpectrumSet::allocate(&jewel).expect("allocation");
        assert_eq!(spectra.len(), 9 * 6);

        let pyquen = AnalysisConfig::for_tag(GeneratorTag::Pyquen);
        let spectra = SpectrumSet::allocate(&pyquen).expect("allocation");
        assert_eq!(spectra.len(), 6 * 6);
        let histogram = spectra
            .require(SpectrumKey::reference(1, 0))
            .expect("reference counter");
        assert_eq!(histogram.bin_count(), 160);
        assert_eq!(histogram.name, "PPHighPtHat_R02_JetPT");
    }

    #[test]
    fn counter_names_are_built_from_category_labels() {
        let config = AnalysisConfig::for_tag(GeneratorTag::Jewel);
        assert_eq!(
            spectrum_name(&config, SpectrumKey::reference(0, 2)),
            "PP_R04_JetPT"
        );
        assert_eq!(
            spectrum_name(&config, SpectrumKey::heavy_ion(CategoryKey::new(0, 0, 3), 5)),
            "PbPbNoRecoil_R10_C50to90_JetPT"
        );
    }

    #[test]
    fn rebinned_set_keeps_keys_and_suffixes_names() {
        let config = AnalysisConfig::for_tag(GeneratorTag::Jewel);
        let mut spectra = SpectrumSet::allocate(&config).expect("allocation");
        let key = SpectrumKey::heavy_ion(CategoryKey::new(0, 1, 0), 0);
        spectra
            .require_mut(key)
            .expect("counter")
            .fill(320.0, 2.0);

        let coarse = BinEdges::parse_csv("200,250,300,400,500,1000").expect("edges");
        let rebinned = spectra.rebin(&coarse);

        let histogram = rebinned.require(key).expect("rebinned counter");
        assert_eq!(histogram.name, "PbPb_R02_C0to10_JetPT_Rebin");
        assert_eq!(histogram.bin_content(2), 2.0);
        assert_eq!(rebinned.len(), spectra.len());
    }
}
