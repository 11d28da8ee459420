//! RAA and RRAA with first-order quadrature of relative errors.
//!
//! Zero denominators are not guarded: the resulting infinities and NaNs are
//! carried into every output.

use super::histogram::{Histogram, RatioHistogram};
use super::spectra::SpectrumSet;
use crate::common::binning::BinEdges;
use crate::common::config::AnalysisConfig;
use crate::domain::{
    CategoryKey, RaaError, RaaResult, RatioKey, RatioKind, SpectrumKey, SubsampleSlot,
};
use std::collections::BTreeMap;

/// `(value, error)` of `numerator / denominator`.
pub fn divide_with_errors(numerator: (f64, f64), denominator: (f64, f64)) -> (f64, f64) {
    let (numerator_value, numerator_error) = numerator;
    let (denominator_value, denominator_error) = denominator;
    let value = numerator_value / denominator_value;
    let numerator_relative = numerator_error / numerator_value;
    let denominator_relative = denominator_error / denominator_value;
    let error = (numerator_relative.powi(2) + denominator_relative.powi(2)).sqrt() * value;
    (value, error)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RatioSet {
    ratios: BTreeMap<RatioKey, RatioHistogram>,
}

impl RatioSet {
    pub fn get(&self, key: RatioKey) -> Option<&RatioHistogram> {
        self.ratios.get(&key)
    }

    pub(crate) fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RatioKey, &RatioHistogram)> {
        self.ratios.iter()
    }
}

pub struct RatioEngine<'a> {
    config: &'a AnalysisConfig,
    edges: &'a BinEdges,
}

impl<'a> RatioEngine<'a> {
    pub fn new(config: &'a AnalysisConfig, edges: &'a BinEdges) -> Self {
        Self { config, edges }
    }

    /// RAA for every slot, then RRAA from those RAA values.
    pub fn compute(&self, rebinned: &SpectrumSet) -> RaaResult<RatioSet> {
        let mut ratios = BTreeMap::new();
        for slot in self.config.slots() {
            for event_type in 0..self.config.event_types.len() {
                for centrality in 0..self.config.centralities.len() {
                    for radius in 0..self.config.radii.len() {
                        let key = RatioKey {
                            kind: RatioKind::Raa,
                            slot,
                            event_type,
                            centrality,
                            radius,
                        };
                        let raa = self.raa(rebinned, key)?;
                        ratios.insert(key, raa);
                    }
                }
            }
        }

        let reference_radius = self.config.reference_radius();
        let raa_keys = ratios.keys().copied().collect::<Vec<_>>();
        for raa_key in raa_keys {
            let rraa_key = RatioKey {
                kind: RatioKind::Rraa,
                ..raa_key
            };
            let reference_key = RatioKey {
                radius: reference_radius,
                ..raa_key
            };
            let rraa = self.rraa(&ratios[&raa_key], &ratios[&reference_key], rraa_key);
            ratios.insert(rraa_key, rraa);
        }

        Ok(RatioSet { ratios })
    }

    fn raa(&self, rebinned: &SpectrumSet, key: RatioKey) -> RaaResult<RatioHistogram> {
        let mut bins = Vec::with_capacity(self.edges.bin_count());
        for bin in 0..self.edges.bin_count() {
            let subsample = match key.slot {
                SubsampleSlot::Sample(subsample) => subsample,
                SubsampleSlot::Merged => self.config.subsample_for_bin(self.edges.low_edge(bin)),
            };
            let category = CategoryKey::new(subsample, key.event_type, key.centrality);
            let heavy_ion = self.operand(rebinned, SpectrumKey::heavy_ion(category, key.radius))?;
            let reference = self.operand(rebinned, SpectrumKey::reference(subsample, key.radius))?;
            bins.push(divide_with_errors(
                (heavy_ion.bin_content(bin), heavy_ion.bin_error(bin)),
                (reference.bin_content(bin), reference.bin_error(bin)),
            ));
        }

        Ok(RatioHistogram::from_bins(
            ratio_name(self.config, key),
            ratio_title(self.config, key),
            self.edges.clone(),
            bins,
            key.kind.y_range(),
        ))
    }

    fn rraa(
        &self,
        raa: &RatioHistogram,
        reference: &RatioHistogram,
        key: RatioKey,
    ) -> RatioHistogram {
        let is_reference = key.radius == self.config.reference_radius();
        let bins = (0..self.edges.bin_count())
            .map(|bin| {
                if is_reference {
                    (1.0, 0.0)
                } else {
                    divide_with_errors(
                        (raa.value(bin), raa.error(bin)),
                        (reference.value(bin), reference.error(bin)),
                    )
                }
            })
            .collect();

        RatioHistogram::from_bins(
            ratio_name(self.config, key),
            ratio_title(self.config, key),
            self.edges.clone(),
            bins,
            key.kind.y_range(),
        )
    }

    fn operand<'s>(&self, rebinned: &'s SpectrumSet, key: SpectrumKey) -> RaaResult<&'s Histogram> {
        let histogram = rebinned.require(key)?;
        if histogram.edges() != self.edges {
            return Err(RaaError::internal(
                "INTERNAL.BIN_EDGES",
                format!(
                    "'{}' has edges {} but ratios use {}",
                    histogram.name,
                    histogram.edges().csv(),
                    self.edges.csv()
                ),
            ));
        }
        Ok(histogram)
    }
}

pub fn ratio_name(config: &AnalysisConfig, key: RatioKey) -> String {
    format!(
        "{}{}_R{}_C{}_Jet{}",
        config.event_types[key.event_type],
        config.slot_label(key.slot),
        config.radii[key.radius],
        config.centralities[key.centrality].tag_label,
        key.kind
    )
}

pub fn ratio_title(config: &AnalysisConfig, key: RatioKey) -> String {
    format!(
        "{}{} {}% R = {} Jet {}",
        config.event_types[key.event_type],
        config.slot_label(key.slot),
        config.centralities[key.centrality].file_label,
        config.radii[key.radius],
        key.kind
    )
}

#[cfg(test)]
mod tests {
    use super::{RatioEngine, divide_with_errors, ratio_name};
    use crate::common::binning::BinEdges;
    use crate::common::config::AnalysisConfig;
    use crate::domain::{
        GeneratorTag, InputCategory, RaaErrorCategory, RatioKey, RatioKind, SpectrumKey,
        SubsampleSlot,
    };
    use crate::modules::spectra::SpectrumSet;

    fn coarse() -> BinEdges {
        BinEdges::parse_csv("200,250,300,400,500,1000").expect("coarse edges")
    }

    fn key(kind: RatioKind, slot: SubsampleSlot, radius: usize) -> RatioKey {
        RatioKey {
            kind,
            slot,
            event_type: 0,
            centrality: 0,
            radius,
        }
    }

    /// Fills every spectrum with two jets in each coarse bin, weighted
    /// by `weight(input subsample, is_reference, radius)`.
    fn filled(config: &AnalysisConfig, weight: impl Fn(usize, bool, usize) -> f64) -> SpectrumSet {
        let mut spectra = SpectrumSet::allocate(config).expect("allocation");
        for input in config.input_categories() {
            for radius in 0..config.radii.len() {
                let histogram = spectra
                    .require_mut(SpectrumKey::new(input, radius))
                    .expect("counter");
                let is_reference =
                    matches!(input, InputCategory::Reference { .. });
                let w = weight(input.subsample(), is_reference, radius);
                for pt in [225.0, 275.0, 350.0, 450.0, 750.0] {
                    histogram.fill(pt, w);
                    histogram.fill(pt + 1.0, w);
                }
            }
        }
        spectra.rebin(&coarse())
    }

    #[test]
    fn divide_propagates_relative_errors_in_quadrature() {
        let (value, error) = divide_with_errors((6.0, 0.6), (3.0, 0.4));
        assert_eq!(value, 2.0);
        let expected = 2.0 * (0.1_f64.powi(2) + (0.4_f64 / 3.0).powi(2)).sqrt();
        assert!((error - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_denominator_passes_through_as_non_finite() {
        let (value, error) = divide_with_errors((1.0, 1.0), (0.0, 0.0));
        assert!(value.is_infinite());
        assert!(!error.is_finite());

        let (value, _) = divide_with_errors((0.0, 0.0), (0.0, 0.0));
        assert!(value.is_nan());
    }

    #[test]
    fn raa_error_is_invariant_under_common_scaling() {
        let config = AnalysisConfig::for_tag(GeneratorTag::Jewel);
        let edges = coarse();
        let base = filled(&config, |_, is_reference, _| if is_reference { 2.0 } else { 1.0 });
        let scaled = filled(&config, |_, is_reference, _| if is_reference { 14.0 } else { 7.0 });

        let engine = RatioEngine::new(&config, &edges);
        let base_ratios = engine.compute(&base).expect("base ratios");
        let scaled_ratios = engine.compute(&scaled).expect("scaled ratios");

        let raa_key = key(RatioKind::Raa, SubsampleSlot::Sample(0), 2);
        let base_raa = base_ratios.get(raa_key).expect("base RAA");
        let scaled_raa = scaled_ratios.get(raa_key).expect("scaled RAA");
        for bin in 0..edges.bin_count() {
            assert!((base_raa.value(bin) - 0.5).abs() < 1e-12);
            assert!((base_raa.value(bin) - scaled_raa.value(bin)).abs() < 1e-12);
            assert!((base_raa.error(bin) - scaled_raa.error(bin)).abs() < 1e-12);
        }
    }

    #[test]
    fn rraa_at_the_reference_radius_is_exactly_one() {
        for tag in [GeneratorTag::Jewel, GeneratorTag::Pyquen] {
            let config = AnalysisConfig::for_tag(tag);
            let edges = coarse();
            let spectra = filled(&config, |subsample, is_reference, radius| {
                (1 + subsample + radius) as f64 * if is_reference { 3.0 } else { 1.0 }
            });
            let ratios = RatioEngine::new(&config, &edges)
                .compute(&spectra)
                .expect("ratios");

            let reference_radius = config.reference_radius();
            let mut checked = 0;
            for (ratio_key, ratio) in ratios.iter() {
                if ratio_key.kind != RatioKind::Rraa || ratio_key.radius != reference_radius {
                    continue;
                }
                for bin in 0..ratio.bin_count() {
                    assert_eq!(ratio.value(bin), 1.0);
                    assert_eq!(ratio.error(bin), 0.0);
                }
                checked += 1;
            }
            let expected = config.slots().len()
                * config.event_types.len()
                * config.centralities.len();
            assert_eq!(checked, expected);
        }
    }

    #[test]
    fn rraa_divides_by_the_reference_radius_raa() {
        let config = AnalysisConfig::for_tag(GeneratorTag::Jewel);
        let edges = coarse();
        // HI weight grows with radius, reference weight constant: RAA(r) = 1 + r.
        let spectra = filled(&config, |_, is_reference, radius| {
            if is_reference { 1.0 } else { (1 + radius) as f64 }
        });
        let ratios = RatioEngine::new(&config, &edges)
            .compute(&spectra)
            .expect("ratios");

        let rraa = ratios
            .get(key(RatioKind::Rraa, SubsampleSlot::Sample(0), 3))
            .expect("RRAA R06");
        for bin in 0..edges.bin_count() {
            assert!((rraa.value(bin) - 4.0).abs() < 1e-12);
        }
        assert_eq!(rraa.name, "PbPbNoRecoil_R06_C0to10_JetRRAA");
        assert_eq!(rraa.y_range(), (0.0, 2.5));
    }

    #[test]
    fn merged_slot_switches_to_high_statistics_at_300_gev_inclusive() {
        let config = AnalysisConfig::for_tag(GeneratorTag::Pyquen);
        let edges = coarse();
        // Low-statistics RAA = 0.25, high-statistics RAA = 0.75.
        let spectra = filled(&config, |subsample, is_reference, _| {
            match (subsample, is_reference) {
                (_, true) => 4.0,
                (0, false) => 1.0,
                _ => 3.0,
            }
        });
        let ratios = RatioEngine::new(&config, &edges)
            .compute(&spectra)
            .expect("ratios");

        let merged = ratios
            .get(key(RatioKind::Raa, SubsampleSlot::Merged, 0))
            .expect("merged RAA");
        assert_eq!(merged.name, "PbPbWideMerged_R02_C0to10_JetRAA");
        // Bin 1 starts at 250, bin 2 at exactly 300.
        assert_eq!(edges.low_edge(1), 250.0);
        assert_eq!(edges.low_edge(2), 300.0);
        assert!((merged.value(0) - 0.25).abs() < 1e-12);
        assert!((merged.value(1) - 0.25).abs() < 1e-12);
        assert!((merged.value(2) - 0.75).abs() < 1e-12);
        assert!((merged.value(4) - 0.75).abs() < 1e-12);

        let low = ratios
            .get(key(RatioKind::Raa, SubsampleSlot::Sample(0), 0))
            .expect("low-statistics RAA");
        assert!((low.value(4) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn mismatched_operand_edges_are_rejected() {
        let config = AnalysisConfig::for_tag(GeneratorTag::Jewel);
        let spectra = SpectrumSet::allocate(&config).expect("allocation");
        let edges = coarse();

        let error = RatioEngine::new(&config, &edges)
            .compute(&spectra)
            .expect_err("fine spectra should not divide on coarse edges");
        assert_eq!(error.category(), RaaErrorCategory::Internal);
        assert_eq!(error.placeholder(), "INTERNAL.BIN_EDGES");
    }

    #[test]
    fn ratio_names_use_slot_labels() {
        let config = AnalysisConfig::for_tag(GeneratorTag::Pyquen);
        let ratio_key = RatioKey {
            kind: RatioKind::Raa,
            slot: SubsampleSlot::Sample(1),
            event_type: 1,
            centrality: 0,
            radius: 5,
        };
        assert_eq!(ratio_name(&config, ratio_key), "PbPbHighPtHat_R10_C0to10_JetRAA");
    }
}
