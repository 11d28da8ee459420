//! Plain-text ratio tables, one per (slot, type, centrality) and ratio kind.
//!
//! Row layout: `low high` then, per radius in configured order,
//! `value value+error value-error`. Numbers are printed like `%g`.

use super::output_path;
use crate::common::config::AnalysisConfig;
use crate::domain::{EmitResult, RaaError, RatioKey, RatioKind};
use crate::modules::histogram::RatioHistogram;
use crate::modules::ratio::RatioSet;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};

const SIGNIFICANT_DIGITS: usize = 6;

/// `printf("%g")`: six significant digits, trailing zeros dropped,
/// exponent form outside `[1e-4, 1e6)`, `nan` and `inf` spelled lowercase.
fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent = exponent.parse::<i32>().unwrap_or(0);
    if (-4..SIGNIFICANT_DIGITS as i32).contains(&exponent) {
        let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exponent) as usize;
        trim_fraction(format!("{:.*}", decimals, value))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa.to_string()),
            sign,
            exponent.abs()
        )
    }
}

fn trim_fraction(mut text: String) -> String {
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    text
}

pub fn render_table(radii: &[&RatioHistogram]) -> String {
    let mut table = String::new();
    let Some(first) = radii.first() else {
        return table;
    };
    let edges = first.edges();
    for bin in 0..edges.bin_count() {
        let _ = write!(
            table,
            "{} {} ",
            format_general(edges.low_edge(bin)),
            format_general(edges.high_edge(bin))
        );
        for ratio in radii {
            let value = ratio.value(bin);
            let error = ratio.error(bin);
            let _ = write!(
                table,
                "{} {} {} ",
                format_general(value),
                format_general(value + error),
                format_general(value - error)
            );
        }
        table.push('\n');
    }
    table
}

pub fn write_tables(
    config: &AnalysisConfig,
    ratios: &RatioSet,
    output_base: &Path,
) -> EmitResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for slot in config.slots() {
        for event_type in 0..config.event_types.len() {
            for centrality in 0..config.centralities.len() {
                for kind in RatioKind::ALL {
                    let radii = (0..config.radii.len())
                        .map(|radius| {
                            let key = RatioKey {
                                kind,
                                slot,
                                event_type,
                                centrality,
                                radius,
                            };
                            ratios.get(key).ok_or_else(|| {
                                RaaError::internal(
                                    "INTERNAL.RATIO_LOOKUP",
                                    format!("no ratio computed for {:?}", key),
                                )
                            })
                        })
                        .collect::<EmitResult<Vec<_>>>()?;

                    let suffix = format!(
                        "_{}{}_{}_{}.txt",
                        config.event_types[event_type],
                        config.slot_label(slot),
                        config.centralities[centrality].tag_label,
                        kind
                    );
                    let path = output_path(output_base, &suffix);
                    fs::write(&path, render_table(&radii)).map_err(|source| {
                        RaaError::io_system(
                            "IO.TABLE_WRITE",
                            format!("failed to write '{}': {}", path.display(), source),
                        )
                    })?;
                    written.push(path);
                }
            }
        }
    }
    Ok(written)
}
