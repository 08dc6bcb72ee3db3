//! Run detail view
//!
//! One card per run: a metadata panel listing every non-profile entry of
//! `metadata_col`, and a metrics panel driven by the chart adapter.

use serde_json::Value;
use std::fmt::{self, Write};

use super::escape_html;
use crate::chart::{build_quality_chart, profiles_aligned, ChartOutput};
use crate::model::{Run, RunMetadata, Sample};
use crate::query::QueryState;

pub const LOADING_TEXT: &str = "Fetching run details...";
pub const ERROR_TEXT: &str = "Failed to load run details.";
pub const NO_CHART_TEXT: &str = "No chart data available";

/// One row of the metadata panel
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// Everything a run card shows
#[derive(Debug, Clone, PartialEq)]
pub struct RunCard {
    pub run_id: String,
    pub assay_type: String,
    pub metadata: Vec<MetadataEntry>,
    pub chart: ChartOutput,
    /// False when coverage and quality profiles differ in length
    pub profiles_aligned: bool,
}

impl RunCard {
    pub fn from_run(run: &Run) -> Self {
        let meta = &run.metadata_col;
        let coverage = meta.coverage_or_empty();
        let quality = meta.quality_or_empty();

        let aligned = coverage.is_empty() || profiles_aligned(coverage, quality);
        if !aligned {
            tracing::warn!(
                run_id = %run.run_id,
                coverage_len = coverage.len(),
                quality_len = quality.len(),
                "Coverage and quality profiles differ in length"
            );
        }

        Self {
            run_id: run.run_id.clone(),
            assay_type: run.assay_type.clone(),
            metadata: metadata_entries(meta),
            chart: build_quality_chart(coverage, quality),
            profiles_aligned: aligned,
        }
    }
}

/// Display entries of a run's metadata, in API order.
///
/// The profile arrays never appear here; they only feed the chart.
pub fn metadata_entries(meta: &RunMetadata) -> Vec<MetadataEntry> {
    meta.entries
        .iter()
        .map(|(key, value)| MetadataEntry {
            key: key.clone(),
            label: format_metadata_key(key),
            value: display_value(value),
        })
        .collect()
}

/// Replace the first underscore with a space; capitalization is left to CSS
pub fn format_metadata_key(key: &str) -> String {
    key.replacen('_', " ", 1)
}

/// Stringify a metadata value for display
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Render the detail view for one sample
pub fn render_run_detail(state: &QueryState<Sample>) -> Result<String, fmt::Error> {
    let mut out = String::new();

    let sample = match state {
        QueryState::Pending => {
            writeln!(out, "<div class=\"placeholder\">{}</div>", LOADING_TEXT)?;
            return Ok(out);
        }
        QueryState::Error(_) => {
            writeln!(out, "<div class=\"placeholder error\">{}</div>", ERROR_TEXT)?;
            return Ok(out);
        }
        QueryState::Success(sample) => sample,
    };

    writeln!(out, "<div class=\"detail-header\">")?;
    writeln!(out, "<a href=\"/samples\">&larr; Back to Samples</a>")?;
    writeln!(out, "<h2>Analysis: {}</h2>", escape_html(&sample.sample_id))?;
    writeln!(out, "</div>")?;

    for card in sample.runs.iter().map(RunCard::from_run) {
        run_card(&mut out, &card)?;
    }

    Ok(out)
}

fn run_card(out: &mut String, card: &RunCard) -> fmt::Result {
    writeln!(out, "<section class=\"card\" id=\"run-{}\">", escape_html(&card.run_id))?;
    writeln!(out, "<div class=\"card-header\">")?;
    writeln!(out, "<h3>Run: {}</h3>", escape_html(&card.run_id))?;
    writeln!(out, "<span class=\"badge assay\">{}</span>", escape_html(&card.assay_type))?;
    writeln!(out, "</div>")?;

    writeln!(out, "<div class=\"card-body\">")?;
    metadata_panel(out, &card.metadata)?;
    metrics_panel(out, card)?;
    writeln!(out, "</div>")?;

    writeln!(out, "</section>")
}

fn metadata_panel(out: &mut String, entries: &[MetadataEntry]) -> fmt::Result {
    writeln!(out, "<div class=\"metadata\">")?;
    writeln!(out, "<h4>Run Metadata</h4>")?;
    writeln!(out, "<dl>")?;
    for entry in entries {
        writeln!(
            out,
            "<div class=\"entry\"><dt>{}</dt><dd>{}</dd></div>",
            escape_html(&entry.label),
            escape_html(&entry.value)
        )?;
    }
    writeln!(out, "</dl>")?;
    writeln!(out, "</div>")
}

fn metrics_panel(out: &mut String, card: &RunCard) -> fmt::Result {
    writeln!(out, "<div class=\"metrics\">")?;
    writeln!(out, "<h4>Quality Metrics</h4>")?;

    match &card.chart {
        ChartOutput::NoData => {
            writeln!(out, "<div class=\"placeholder\">{}</div>", NO_CHART_TEXT)?;
        }
        ChartOutput::Chart(option) => {
            let json = serde_json::to_string(option).map_err(|_| fmt::Error)?;
            writeln!(
                out,
                "<div class=\"chart\" data-chart-option=\"{}\"></div>",
                escape_html(&json)
            )?;
            if !card.profiles_aligned {
                writeln!(
                    out,
                    "<p class=\"notice\">Coverage and quality profiles have different lengths; quality is shown against the coverage positions.</p>"
                )?;
            }
        }
    }

    writeln!(out, "</div>")
}
