mod canvas;
pub mod review;
pub mod root_file;
pub mod store;
pub mod tables;

pub use store::HistogramStore;

use crate::common::binning::BinEdges;
use crate::common::config::AnalysisConfig;
use crate::domain::{EmitResult, RaaError};
use crate::modules::ratio::RatioSet;
use crate::modules::spectra::SpectrumSet;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// `base` with `suffix` appended to its final component; `run` + `.bin`
/// gives `run.bin`, `out/run` + `_PbPb_0to10_RAA.txt` stays inside `out/`.
pub fn output_path(base: &Path, suffix: &str) -> PathBuf {
    let mut joined = OsString::from(base.as_os_str());
    joined.push(suffix);
    PathBuf::from(joined)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedOutputs {
    pub store: PathBuf,
    pub root: PathBuf,
    pub review: PathBuf,
    pub tables: Vec<PathBuf>,
}

impl EmittedOutputs {
    pub fn all_paths(&self) -> Vec<&Path> {
        let mut paths = vec![
            self.store.as_path(),
            self.root.as_path(),
            self.review.as_path(),
        ];
        paths.extend(self.tables.iter().map(PathBuf::as_path));
        paths
    }
}

/// Writes the binary store, its ROOT copy, the PDF review document and every ratio table
/// next to `output_base`.
pub fn emit_all(
    config: &AnalysisConfig,
    edges: &BinEdges,
    spectra: &SpectrumSet,
    rebinned: &SpectrumSet,
    ratios: &RatioSet,
    output_base: &Path,
) -> EmitResult<EmittedOutputs> {
    if let Some(parent) = output_base.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| {
            RaaError::io_system(
                "IO.OUTPUT_DIRECTORY",
                format!("failed to create '{}': {}", parent.display(), source),
            )
        })?;
    }

    let store_path = output_path(output_base, ".bin");
    let store = HistogramStore::collect(config, edges, spectra, rebinned, ratios);
    store.write(&store_path)?;
    info!(path = %store_path.display(), objects = store.object_count(), "wrote histogram store");

    let root_path = output_path(output_base, ".root");
    let trees = root_file::write_root_file(spectra, rebinned, ratios, &root_path)?;
    info!(path = %root_path.display(), trees, "wrote ROOT counters");

    let review_path = output_path(output_base, ".pdf");
    let pages = review::write_review(config, edges, spectra, ratios, &review_path)?;
    info!(path = %review_path.display(), pages, "wrote review document");

    let tables = tables::write_tables(config, ratios, output_base)?;
    info!(count = tables.len(), "wrote ratio tables");

    Ok(EmittedOutputs {
        store: store_path,
        root: root_path,
        review: review_path,
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::{emit_all, output_path};
    use crate::common::binning::BinEdges;
    use crate::common::config::AnalysisConfig;
    use crate::domain::GeneratorTag;
    use crate::modules::ratio::RatioEngine;
    use crate::modules::spectra::SpectrumSet;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[test]
    fn suffix_is_appended_to_the_final_component() {
        assert_eq!(output_path(Path::new("run"), ".bin"), PathBuf::from("run.bin"));
        assert_eq!(
            output_path(Path::new("out/run.v1"), "_PbPb_0to10_RAA.txt"),
            PathBuf::from("out/run.v1_PbPb_0to10_RAA.txt")
        );
    }

    #[test]
    fn emits_store_review_and_one_table_per_category_and_kind() {
        let config = AnalysisConfig::for_tag(GeneratorTag::Jewel);
        let edges = BinEdges::parse_csv("200,300,1000").expect("edges");
        let spectra = SpectrumSet::allocate(&config).expect("allocation");
        let rebinned = spectra.rebin(&edges);
        let ratios = RatioEngine::new(&config, &edges)
            .compute(&rebinned)
            .expect("ratios");

        let temp = TempDir::new().expect("tempdir should be created");
        let base = temp.path().join("nested").join("run");
        let outputs =
            emit_all(&config, &edges, &spectra, &rebinned, &ratios, &base).expect("emission");

        assert!(outputs.store.is_file());
        assert_eq!(outputs.root, temp.path().join("nested").join("run.root"));
        assert!(outputs.root.is_file());
        assert_eq!(outputs.review, temp.path().join("nested").join("run.pdf"));
        let review = std::fs::read(&outputs.review).expect("review document");
        assert!(review.starts_with(b"%PDF-"));
        // Jewel: 2 types x 4 centralities x {RAA, RRAA}.
        assert_eq!(outputs.tables.len(), 16);
        assert!(
            temp.path()
                .join("nested")
                .join("run_PbPbNoRecoil_0to10_RRAA.txt")
                .is_file()
        );
        assert_eq!(outputs.all_paths().len(), 19);
    }
}
