//! Pairs input files with the category they feed.
//!
//! Every category of the resolved configuration gets one expected file-name
//! fragment; a file belongs to a category when its name contains that
//! fragment. Exactly one fragment must match, and no category may be claimed
//! twice.

use crate::common::config::AnalysisConfig;
use crate::domain::{InputCategory, RaaError, RaaResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectedInput {
    pub category: InputCategory,
    pub fragment: String,
    pub r03_correction: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedInput {
    pub path: PathBuf,
    pub category: InputCategory,
    pub r03_correction: bool,
}

pub struct FileClassifier {
    expected: Vec<ExpectedInput>,
    matchers: GlobSet,
}

impl FileClassifier {
    pub fn new(config: &AnalysisConfig) -> RaaResult<Self> {
        let expected = config
            .input_categories()
            .into_iter()
            .map(|category| ExpectedInput {
                category,
                fragment: expected_fragment(config, category),
                r03_correction: config.needs_r03_correction(category),
            })
            .collect::<Vec<_>>();

        let mut builder = GlobSetBuilder::new();
        for entry in &expected {
            let pattern = format!("*{}*", entry.fragment);
            let glob = Glob::new(&pattern).map_err(|source| {
                RaaError::internal(
                    "INTERNAL.CLASSIFY_PATTERN",
                    format!("invalid file pattern '{}': {}", pattern, source),
                )
            })?;
            builder.add(glob);
        }
        let matchers = builder.build().map_err(|source| {
            RaaError::internal(
                "INTERNAL.CLASSIFY_PATTERN",
                format!("failed to compile file patterns: {}", source),
            )
        })?;

        Ok(Self { expected, matchers })
    }

    pub fn expected_inputs(&self) -> &[ExpectedInput] {
        &self.expected
    }

    pub fn classify(&self, path: &Path) -> RaaResult<&ExpectedInput> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let matches = self.matchers.matches(Path::new(&file_name));

        match matches.as_slice() {
            [index] => Ok(&self.expected[*index]),
            [] => Err(RaaError::classification(
                "INPUT.CLASSIFY_NO_MATCH",
                format!(
                    "file '{}' matches no expected input (expected one of: {})",
                    path.display(),
                    self.expected
                        .iter()
                        .map(|entry| entry.fragment.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
            several => Err(RaaError::classification(
                "INPUT.CLASSIFY_AMBIGUOUS",
                format!(
                    "file '{}' matches several expected inputs: {}",
                    path.display(),
                    several
                        .iter()
                        .map(|index| self.expected[*index].fragment.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }

    /// Classifies every path, rejecting a category claimed by two files.
    pub fn classify_all(&self, paths: &[PathBuf]) -> RaaResult<Vec<ClassifiedInput>> {
        let mut claimed: BTreeMap<InputCategory, &Path> = BTreeMap::new();
        let mut classified = Vec::with_capacity(paths.len());

        for path in paths {
            let entry = self.classify(path)?;
            if let Some(previous) = claimed.insert(entry.category, path.as_path()) {
                return Err(RaaError::classification(
                    "INPUT.CLASSIFY_DUPLICATE",
                    format!(
                        "files '{}' and '{}' both match '{}'",
                        previous.display(),
                        path.display(),
                        entry.fragment
                    ),
                ));
            }
            classified.push(ClassifiedInput {
                path: path.clone(),
                category: entry.category,
                r03_correction: entry.r03_correction,
            });
        }

        Ok(classified)
    }
}

pub fn expected_fragment(config: &AnalysisConfig, category: InputCategory) -> String {
    match category {
        InputCategory::Reference { subsample } => {
            format!("PP{}.root", config.subsamples[subsample])
        }
        InputCategory::HeavyIon(key) => format!(
            "{}{}-{}.root",
            config.event_types[key.event_type],
            config.subsamples[key.subsample],
            config.centralities[key.centrality].file_label
        ),
    }
}
