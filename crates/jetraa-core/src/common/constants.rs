//! Fixed numbers shared by ingestion, rebinning and emission.

/// Fine spectrum binning: [200, 1000) GeV in 160 bins.
pub const FINE_BIN_COUNT: usize = 160;
pub const FINE_PT_MIN: f64 = 200.0;
pub const FINE_PT_MAX: f64 = 1000.0;

pub const DEFAULT_BIN_EDGES: &str = "200,250,300,400,500,1000";

pub const JET_TREE_NAME: &str = "JetTree";
pub const EVENT_WEIGHT_BRANCH: &str = "EventWeight";
pub const EVENT_WEIGHT_R03_BRANCH: &str = "EventWeightR03";

/// Radius whose weights were generated in a separate branch for some samples.
pub const R03_LABEL: &str = "03";

pub const JET_RADII: [&str; 6] = ["02", "03", "04", "06", "08", "10"];

/// Lower bin edge (GeV) from which the high-statistics subsample is used.
pub const HIGH_STATISTICS_MIN_PT: f64 = 300.0;

/// Edge comparisons during rebinning.
pub const EDGE_TOLERANCE: f64 = 1e-9;
