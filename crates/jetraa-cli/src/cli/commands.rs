use super::CliError;
use anyhow::Context;
use jetraa_core::common::constants::DEFAULT_BIN_EDGES;
use jetraa_core::modules::ingest::RootEventStore;
use jetraa_core::modules::pipeline::{RunConfig, run_analysis};
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub(super) struct AnalyzeArgs {
    /// Whitespace-separated list of input ROOT files
    #[arg(long, value_name = "FILES")]
    input: String,

    /// Comma-separated coarse pT bin edges in GeV
    #[arg(long, default_value = DEFAULT_BIN_EDGES)]
    bins: String,

    /// Output basename; `.bin`, `.root`, `.pdf` and table suffixes are appended
    #[arg(long, value_name = "BASENAME")]
    output: PathBuf,

    /// Generator tag (Jewel or Pyquen)
    #[arg(long)]
    tag: String,

    /// Optional JSON run report path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl AnalyzeArgs {
    fn into_run_config(self) -> RunConfig {
        let input_paths = self
            .input
            .split_whitespace()
            .map(PathBuf::from)
            .collect::<Vec<_>>();
        let config = RunConfig::new(input_paths, self.output, self.tag).with_bin_edges(self.bins);
        match self.report {
            Some(report) => config.with_report(report),
            None => config,
        }
    }
}

pub(super) fn run_analyze_command(args: AnalyzeArgs) -> Result<i32, CliError> {
    let config = args.into_run_config();
    println!(
        "Processing {} input file(s) for {} with bins {}",
        config.input_paths.len(),
        config.tag,
        config.bin_edges
    );

    let report = run_analysis(&config, &RootEventStore)?;
    for input in &report.inputs {
        println!(
            "  {} -> {} ({} events)",
            input.path.display(),
            input.category,
            input.events
        );
    }

    for path in report.outputs.all_paths() {
        println!("Wrote {}", path.display());
    }
    if let Some(report_path) = &config.report_path {
        let written = report_path
            .canonicalize()
            .with_context(|| format!("failed to resolve report path '{}'", report_path.display()))?;
        println!("Wrote {}", written.display());
    }
    Ok(0)
}
