//! `EventStoreReader` over ROOT files.

use super::reader::{EventStoreReader, JetTree};
use crate::domain::{IngestResult, RaaError};
use oxyroot::RootFile;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct RootEventStore;

impl EventStoreReader for RootEventStore {
    fn read_tree(&self, path: &Path, tree_name: &str, branches: &[String]) -> IngestResult<JetTree> {
        if !path.is_file() {
            return Err(RaaError::io_system(
                "IO.INPUT_OPEN",
                format!("input file '{}' does not exist", path.display()),
            ));
        }

        let mut file = RootFile::open(path).map_err(|source| {
            RaaError::io_system(
                "IO.INPUT_OPEN",
                format!("failed to open '{}': {}", path.display(), source),
            )
        })?;
        let tree = file.get_tree(tree_name).map_err(|source| {
            RaaError::structural(
                "INPUT.MISSING_TREE",
                format!("Null tree '{}' in file {}: {}", tree_name, path.display(), source),
            )
        })?;

        let entries = usize::try_from(tree.entries()).unwrap_or(0);
        let mut jet_tree = JetTree::new(entries);
        for name in branches {
            let Some(branch) = tree.branch(name) else {
                debug!(file = %path.display(), branch = %name, "branch not present");
                continue;
            };
            let values = branch
                .as_iter::<Vec<f64>>()
                .map_err(|source| {
                    RaaError::structural(
                        "INPUT.BRANCH_TYPE",
                        format!(
                            "branch '{}' in file {} is not a list of doubles: {}",
                            name,
                            path.display(),
                            source
                        ),
                    )
                })?
                .collect::<Vec<_>>();
            jet_tree.insert_column(name.clone(), values);
        }

        Ok(jet_tree)
    }
}
