//! Multi-page PDF review document: a title page, every fine spectrum on a
//! logarithmic axis, then the RAA and RRAA pages on fixed linear axes.

use super::canvas::Canvas;
use crate::common::binning::BinEdges;
use crate::common::config::AnalysisConfig;
use crate::domain::{EmitResult, RaaError, RatioKey, RatioKind, SpectrumKey};
use crate::modules::histogram::{Histogram, RatioHistogram};
use crate::modules::ratio::RatioSet;
use crate::modules::spectra::SpectrumSet;
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, TextStr};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const PAGE_WIDTH: f64 = 800.0;
const PAGE_HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const Y_TICKS: usize = 5;
const MARKER_COLOR: &str = "#1f4e9c";

#[derive(Debug, Clone, Copy)]
enum YAxis {
    Linear { min: f64, max: f64 },
    Log { min_decade: i32, max_decade: i32 },
}

impl YAxis {
    fn log_for(values: impl Iterator<Item = f64>) -> Self {
        let (low, high) = values
            .filter(|value| value.is_finite() && *value > 0.0)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), value| {
                (low.min(value), high.max(value))
            });
        if !low.is_finite() {
            return YAxis::Log {
                min_decade: -1,
                max_decade: 0,
            };
        }
        let min_decade = low.log10().floor() as i32;
        let max_decade = (high.log10().ceil() as i32).max(min_decade + 1);
        YAxis::Log {
            min_decade,
            max_decade,
        }
    }

    /// Fraction of the plot height, 0 at the bottom; `None` when off-scale.
    fn fraction(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let fraction = match *self {
            YAxis::Linear { min, max } => (value - min) / (max - min),
            YAxis::Log {
                min_decade,
                max_decade,
            } => {
                if value <= 0.0 {
                    return None;
                }
                (value.log10() - min_decade as f64) / (max_decade - min_decade) as f64
            }
        };
        (0.0..=1.0).contains(&fraction).then_some(fraction)
    }

    fn ticks(&self) -> Vec<(f64, String)> {
        match *self {
            YAxis::Linear { min, max } => (0..=Y_TICKS)
                .map(|step| {
                    let value = min + (max - min) * step as f64 / Y_TICKS as f64;
                    (value, format!("{:.1}", value))
                })
                .collect(),
            YAxis::Log {
                min_decade,
                max_decade,
            } => (min_decade..=max_decade)
                .map(|decade| (10f64.powi(decade), format!("1e{}", decade)))
                .collect(),
        }
    }
}

/// One `(value, error)` per bin of `edges`.
struct Series<'a> {
    title: &'a str,
    edges: &'a BinEdges,
    bins: Vec<(f64, f64)>,
    y_label: &'a str,
}

impl<'a> Series<'a> {
    fn from_spectrum(histogram: &'a Histogram) -> Self {
        Self {
            title: &histogram.title,
            edges: histogram.edges(),
            bins: (0..histogram.bin_count())
                .map(|bin| (histogram.bin_content(bin), histogram.bin_error(bin)))
                .collect(),
            y_label: "1/N dN/dpT",
        }
    }

    fn from_ratio(ratio: &'a RatioHistogram, kind: RatioKind) -> Self {
        Self {
            title: &ratio.title,
            edges: ratio.edges(),
            bins: (0..ratio.bin_count())
                .map(|bin| (ratio.value(bin), ratio.error(bin)))
                .collect(),
            y_label: kind.as_str(),
        }
    }
}

fn plot_page(series: &Series<'_>, axis: YAxis) -> String {
    let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
    let plot_width = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = PAGE_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let bottom = MARGIN_TOP + plot_height;
    let x_min = series.edges.first();
    let x_max = series.edges.last();
    let x_of = |value: f64| MARGIN_LEFT + (value - x_min) / (x_max - x_min) * plot_width;
    let y_of = |fraction: f64| bottom - fraction * plot_height;

    canvas.text(PAGE_WIDTH / 2.0, MARGIN_TOP / 2.0, series.title, 16.0, "middle");
    canvas.frame(MARGIN_LEFT, MARGIN_TOP, plot_width, plot_height);

    for (value, label) in axis.ticks() {
        if let Some(fraction) = axis.fraction(value) {
            let y = y_of(fraction);
            canvas.line(MARGIN_LEFT - 5.0, y, MARGIN_LEFT, y, "#000000", 1.0);
            canvas.text(MARGIN_LEFT - 8.0, y + 4.0, &label, 11.0, "end");
        }
    }
    for edge in series.edges.as_slice() {
        let x = x_of(*edge);
        canvas.line(x, bottom, x, bottom + 5.0, "#000000", 1.0);
        canvas.text(x, bottom + 18.0, &format!("{}", edge), 11.0, "middle");
    }
    canvas.text(
        MARGIN_LEFT + plot_width / 2.0,
        PAGE_HEIGHT - 20.0,
        "jet pT (GeV)",
        13.0,
        "middle",
    );
    canvas.text_vertical(24.0, MARGIN_TOP + plot_height / 2.0, series.y_label, 13.0);

    for (bin, (value, error)) in series.bins.iter().copied().enumerate() {
        let Some(center) = axis.fraction(value) else {
            continue;
        };
        let x_low = x_of(series.edges.low_edge(bin));
        let x_high = x_of(series.edges.high_edge(bin));
        let x_mid = (x_low + x_high) / 2.0;
        let y = y_of(center);
        canvas.line(x_low, y, x_high, y, MARKER_COLOR, 1.0);
        if error.is_finite() && error > 0.0 {
            let upper = axis.fraction(value + error).unwrap_or(1.0);
            let lower = axis.fraction(value - error).unwrap_or(0.0);
            canvas.line(x_mid, y_of(lower), x_mid, y_of(upper), MARKER_COLOR, 1.0);
        }
        canvas.marker(x_mid, y, 3.0, MARKER_COLOR);
    }

    canvas.to_svg()
}

fn title_page(config: &AnalysisConfig, edges: &BinEdges) -> String {
    let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
    canvas.text(
        PAGE_WIDTH / 2.0,
        PAGE_HEIGHT / 2.0 - 20.0,
        &format!("{} Spectra & RAA", config.tag),
        32.0,
        "middle",
    );
    canvas.text(
        PAGE_WIDTH / 2.0,
        PAGE_HEIGHT / 2.0 + 20.0,
        &format!("Rebinned pT edges: {}", edges.csv()),
        14.0,
        "middle",
    );
    canvas.to_svg()
}

/// Pages in document order: title, spectra (per radius, reference first),
/// RAA, RRAA (per type, radius, centrality, slot).
pub fn render_pages(
    config: &AnalysisConfig,
    edges: &BinEdges,
    spectra: &SpectrumSet,
    ratios: &RatioSet,
) -> EmitResult<Vec<String>> {
    let mut pages = vec![title_page(config, edges)];

    for radius in 0..config.radii.len() {
        for input in config.input_categories() {
            let histogram = spectra.require(SpectrumKey::new(input, radius))?;
            let series = Series::from_spectrum(histogram);
            let axis = YAxis::log_for(series.bins.iter().map(|(value, _)| *value));
            pages.push(plot_page(&series, axis));
            debug!(counter = %histogram.name, "rendered spectrum page");
        }
    }

    for kind in RatioKind::ALL {
        let (min, max) = kind.y_range();
        for event_type in 0..config.event_types.len() {
            for radius in 0..config.radii.len() {
                for centrality in 0..config.centralities.len() {
                    for slot in config.slots() {
                        let key = RatioKey {
                            kind,
                            slot,
                            event_type,
                            centrality,
                            radius,
                        };
                        let ratio = ratios.get(key).ok_or_else(|| {
                            RaaError::internal(
                                "INTERNAL.RATIO_LOOKUP",
                                format!("no ratio computed for {:?}", key),
                            )
                        })?;
                        pages.push(plot_page(
                            &Series::from_ratio(ratio, kind),
                            YAxis::Linear { min, max },
                        ));
                    }
                }
            }
        }
    }

    Ok(pages)
}

fn render_error(detail: String) -> RaaError {
    RaaError::internal(
        "INTERNAL.REVIEW_RENDER",
        format!("failed to render review page: {}", detail),
    )
}

/// One PDF page per SVG page, each page drawn as a form XObject scaled to
/// the page box.
pub fn render_pdf(title: &str, pages: &[String]) -> EmitResult<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let info_id = alloc.bump();
    let page_name = Name(b"Page");
    let mut pdf = Pdf::new();
    let mut page_ids = Vec::with_capacity(pages.len());

    for svg in pages {
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|source| render_error(source.to_string()))?;
        let (chunk, root_id) = svg2pdf::to_chunk(&tree, svg2pdf::ConversionOptions::default())
            .map_err(|source| render_error(source.to_string()))?;
        let mut renumbered = HashMap::new();
        let chunk = chunk.renumber(|old| *renumbered.entry(old).or_insert_with(|| alloc.bump()));
        let root_id = renumbered
            .get(&root_id)
            .copied()
            .ok_or_else(|| render_error("converted page has no root object".to_string()))?;
        pdf.extend(&chunk);

        let page_id = alloc.bump();
        let content_id = alloc.bump();
        page_ids.push(page_id);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH as f32, PAGE_HEIGHT as f32));
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources().x_objects().pair(page_name, root_id);
        page.finish();

        let mut content = Content::new();
        content.transform([PAGE_WIDTH as f32, 0.0, 0.0, PAGE_HEIGHT as f32, 0.0, 0.0]);
        content.x_object(page_name);
        pdf.stream(content_id, &content.finish());
    }

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);
    pdf.document_info(info_id).title(TextStr(title));
    Ok(pdf.finish())
}

pub fn write_review(
    config: &AnalysisConfig,
    edges: &BinEdges,
    spectra: &SpectrumSet,
    ratios: &RatioSet,
    path: &Path,
) -> EmitResult<usize> {
    let pages = render_pages(config, edges, spectra, ratios)?;
    let document = render_pdf(&format!("{} Spectra & RAA", config.tag), &pages)?;
    fs::write(path, document).map_err(|source| {
        RaaError::io_system(
            "IO.REVIEW_WRITE",
            format!("failed to write '{}': {}", path.display(), source),
        )
    })?;
    Ok(pages.len())
}
