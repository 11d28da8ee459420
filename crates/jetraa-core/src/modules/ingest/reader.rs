use crate::domain::{IngestResult, RaaError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Columns of a jet tree: one list of doubles per event and branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JetTree {
    entries: usize,
    columns: BTreeMap<String, Vec<Vec<f64>>>,
}

impl JetTree {
    pub fn new(entries: usize) -> Self {
        Self {
            entries,
            columns: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Vec<f64>>) -> Self {
        self.insert_column(name, values);
        self
    }

    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Vec<f64>>) {
        self.columns.insert(name.into(), values);
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn column(&self, name: &str) -> Option<&[Vec<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

pub trait EventStoreReader {
    /// Loads `branches` of `tree_name`. Branches absent from the file are
    /// left out of the returned tree; a missing tree is an error.
    fn read_tree(&self, path: &Path, tree_name: &str, branches: &[String]) -> IngestResult<JetTree>;
}

/// Trees keyed by path, for runs whose events are already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    trees: BTreeMap<PathBuf, BTreeMap<String, JetTree>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        tree_name: impl Into<String>,
        tree: JetTree,
    ) -> &mut Self {
        self.trees
            .entry(path.into())
            .or_default()
            .insert(tree_name.into(), tree);
        self
    }
}

impl EventStoreReader for InMemoryEventStore {
    fn read_tree(&self, path: &Path, tree_name: &str, branches: &[String]) -> IngestResult<JetTree> {
        let trees = self.trees.get(path).ok_or_else(|| {
            RaaError::io_system(
                "IO.INPUT_OPEN",
                format!("input file '{}' does not exist", path.display()),
            )
        })?;
        let tree = trees.get(tree_name).ok_or_else(|| {
            RaaError::structural(
                "INPUT.MISSING_TREE",
                format!("Null tree '{}' in file {}", tree_name, path.display()),
            )
        })?;

        let mut selected = JetTree::new(tree.entries());
        for name in branches {
            if let Some(values) = tree.column(name) {
                selected.insert_column(name.clone(), values.to_vec());
            }
        }
        Ok(selected)
    }
}
