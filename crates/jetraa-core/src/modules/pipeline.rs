//! End-to-end run: resolve the tag, validate and classify the inputs, fill
//! and normalize the fine spectra, rebin, compute ratios, emit.

use super::classify::FileClassifier;
use super::emit::{self, EmittedOutputs};
use super::ingest::{EventStoreReader, SpectrumFiller};
use super::ratio::RatioEngine;
use super::spectra::SpectrumSet;
use crate::common::binning::BinEdges;
use crate::common::config::AnalysisConfig;
use crate::common::constants::DEFAULT_BIN_EDGES;
use crate::domain::{GeneratorTag, RaaError, RaaResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_paths: Vec<PathBuf>,
    /// Comma-separated coarse bin edges.
    pub bin_edges: String,
    pub output_base: PathBuf,
    pub tag: String,
    pub report_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(
        input_paths: Vec<PathBuf>,
        output_base: impl Into<PathBuf>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            input_paths,
            bin_edges: DEFAULT_BIN_EDGES.to_string(),
            output_base: output_base.into(),
            tag: tag.into(),
            report_path: None,
        }
    }

    pub fn with_bin_edges(mut self, bin_edges: impl Into<String>) -> Self {
        self.bin_edges = bin_edges.into();
        self
    }

    pub fn with_report(mut self, report_path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(report_path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSummary {
    pub path: PathBuf,
    pub category: String,
    pub events: usize,
    pub r03_correction: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub tag: GeneratorTag,
    pub bin_edges: Vec<f64>,
    pub inputs: Vec<InputSummary>,
    pub outputs: EmittedOutputs,
    pub ratio_count: usize,
}

pub fn run_analysis(config: &RunConfig, reader: &dyn EventStoreReader) -> RaaResult<RunReport> {
    let analysis = AnalysisConfig::resolve(&config.tag)?;
    let edges = BinEdges::parse_csv(&config.bin_edges)?;
    analysis.validate_input_count(config.input_paths.len())?;

    let classifier = FileClassifier::new(&analysis)?;
    let classified = classifier.classify_all(&config.input_paths)?;

    let mut spectra = SpectrumSet::allocate(&analysis)?;
    let filler = SpectrumFiller::new(&analysis, reader);
    let mut inputs = Vec::with_capacity(classified.len());
    for input in &classified {
        let events = filler.fill(input, &mut spectra)?;
        inputs.push(InputSummary {
            path: input.path.clone(),
            category: analysis.input_label(input.category),
            events,
            r03_correction: input.r03_correction,
        });
    }

    let rebinned = spectra.rebin(&edges);
    let ratios = RatioEngine::new(&analysis, &edges).compute(&rebinned)?;
    info!(
        tag = %analysis.tag,
        spectra = spectra.len(),
        ratios = ratios.len(),
        "computed ratios"
    );

    let outputs = emit::emit_all(
        &analysis,
        &edges,
        &spectra,
        &rebinned,
        &ratios,
        &config.output_base,
    )?;

    let report = RunReport {
        tag: analysis.tag,
        bin_edges: edges.as_slice().to_vec(),
        inputs,
        outputs,
        ratio_count: ratios.len(),
    };
    if let Some(path) = &config.report_path {
        write_report(&report, path)?;
    }
    Ok(report)
}

pub fn write_report(report: &RunReport, path: &Path) -> RaaResult<()> {
    let json = serde_json::to_string_pretty(report).map_err(|source| {
        RaaError::internal(
            "INTERNAL.REPORT_SERIALIZE",
            format!("failed to serialize run report: {}", source),
        )
    })?;
    fs::write(path, json).map_err(|source| {
        RaaError::io_system(
            "IO.REPORT_WRITE",
            format!("failed to write '{}': {}", path.display(), source),
        )
    })?;
    info!(path = %path.display(), "wrote run report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{RunConfig, run_analysis};
    use crate::common::constants::JET_TREE_NAME;
    use crate::domain::RaaErrorCategory;
    use crate::modules::emit::HistogramStore;
    use crate::modules::ingest::{InMemoryEventStore, JetTree};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn wrong_input_count_fails_before_any_output_is_written() {
        let temp = TempDir::new().expect("tempdir should be created");
        let config = RunConfig::new(
            paths(&["PP.root", "PbPb-0-10.root", "PbPbNoRecoil-0-10.root"]),
            temp.path().join("run"),
            "Jewel",
        );

        let error = run_analysis(&config, &InMemoryEventStore::new())
            .expect_err("three files are not enough for Jewel");
        assert_eq!(error.category(), RaaErrorCategory::Cardinality);
        assert!(error.message().starts_with("Please input 9 files"));
        assert_eq!(std::fs::read_dir(temp.path()).expect("tempdir").count(), 0);
    }

    #[test]
    fn unknown_tag_and_bad_bins_are_configuration_errors() {
        let config = RunConfig::new(Vec::new(), "run", "Foo");
        let error = run_analysis(&config, &InMemoryEventStore::new()).expect_err("unknown tag");
        assert_eq!(error.placeholder(), "CONFIG.UNKNOWN_TAG");

        let config = RunConfig::new(Vec::new(), "run", "Jewel").with_bin_edges("300,200");
        let error = run_analysis(&config, &InMemoryEventStore::new()).expect_err("bad bins");
        assert_eq!(error.category(), RaaErrorCategory::Configuration);
    }

    #[test]
    fn pyquen_run_writes_store_with_merged_ratios() {
        let files = [
            "PPLowPtHat.root",
            "PbPbWideLowPtHat-0-10.root",
            "PbPbLowPtHat-0-10.root",
            "PPHighPtHat.root",
            "PbPbWideHighPtHat-0-10.root",
            "PbPbHighPtHat-0-10.root",
        ];
        let mut store = InMemoryEventStore::new();
        for file in files {
            let mut tree = JetTree::new(1).with_column("EventWeight", vec![vec![1.0]]);
            for radius in ["02", "03", "04", "06", "08", "10"] {
                tree.insert_column(format!("SignalJet{}PyquenPt", radius), vec![vec![260.0, 450.0]]);
            }
            store.insert(file, JET_TREE_NAME, tree);
        }

        let temp = TempDir::new().expect("tempdir should be created");
        let report_path = temp.path().join("report.json");
        let config = RunConfig::new(paths(&files), temp.path().join("pyquen"), "Pyquen")
            .with_report(&report_path);
        let report = run_analysis(&config, &store).expect("run should succeed");

        assert_eq!(report.inputs.len(), 6);
        assert!(report.inputs.iter().all(|input| input.events == 1));
        // RAA and RRAA x {LowPtHat, HighPtHat, Merged} x 2 types x 6 radii.
        assert_eq!(report.ratio_count, 2 * 3 * 2 * 6);
        assert_eq!(report.outputs.tables.len(), 3 * 2 * 2);

        let restored = HistogramStore::read(&report.outputs.store).expect("store");
        let merged = &restored.ratios["PbPbWideMerged_R04_C0to10_JetRAA"];
        assert_eq!(merged.value(1), 1.0);
        assert!(report_path.is_file());
    }
}
