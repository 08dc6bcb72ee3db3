//! Sample list view

use std::fmt::{self, Write};

use super::escape_html;
use crate::model::{ListSamplesParams, MetadataSearchParams, Sample};
use crate::query::QueryState;

pub const LOADING_TEXT: &str = "Loading pipeline data...";
pub const ERROR_TEXT: &str = "Failed to securely fetch data from API.";

/// Characters of the patient hash shown in the table
const HASH_PREVIEW_CHARS: usize = 12;

/// One table row
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub sample_id: String,
    pub hash_preview: String,
    pub assays: Vec<String>,
    pub href: String,
}

impl SampleRow {
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            sample_id: sample.sample_id.clone(),
            hash_preview: truncate_hash(&sample.patient_hash),
            assays: sample.runs.iter().map(|r| r.assay_type.clone()).collect(),
            href: sample_href(&sample.sample_id),
        }
    }
}

/// First 12 characters of the hash plus an ellipsis; cosmetic only
pub fn truncate_hash(hash: &str) -> String {
    let prefix: String = hash.chars().take(HASH_PREVIEW_CHARS).collect();
    format!("{}...", prefix)
}

/// Dashboard path of a sample's detail page
pub fn sample_href(sample_id: &str) -> String {
    format!("/samples/{}", urlencoding::encode(sample_id))
}

/// Render the list view for a sample listing
pub fn render_sample_list(
    state: &QueryState<Vec<Sample>>,
    params: &ListSamplesParams,
) -> Result<String, fmt::Error> {
    let mut out = String::new();

    filter_form(&mut out, params)?;

    match state {
        QueryState::Pending => placeholder(&mut out, LOADING_TEXT, false)?,
        QueryState::Error(_) => placeholder(&mut out, ERROR_TEXT, true)?,
        QueryState::Success(samples) => {
            sample_table(&mut out, samples)?;
            pager(&mut out, params, samples.len())?;
        }
    }

    Ok(out)
}

/// Render metadata search results with the same table
pub fn render_search_results(
    state: &QueryState<Vec<Sample>>,
    params: &MetadataSearchParams,
) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "<form class=\"search\" method=\"get\" action=\"/search\">")?;
    writeln!(
        out,
        "<input name=\"key\" placeholder=\"Metadata key\" value=\"{}\">",
        escape_html(&params.key)
    )?;
    writeln!(
        out,
        "<input name=\"value\" placeholder=\"Value\" value=\"{}\">",
        escape_html(&params.value)
    )?;
    writeln!(out, "<button type=\"submit\">Search</button>")?;
    writeln!(out, "<a href=\"/samples\">All samples</a>")?;
    writeln!(out, "</form>")?;

    match state {
        QueryState::Pending if !params.is_complete() => {
            placeholder(&mut out, "Enter a metadata key and value to search.", false)?
        }
        QueryState::Pending => placeholder(&mut out, LOADING_TEXT, false)?,
        QueryState::Error(_) => placeholder(&mut out, ERROR_TEXT, true)?,
        QueryState::Success(samples) => sample_table(&mut out, samples)?,
    }

    Ok(out)
}

fn placeholder(out: &mut String, text: &str, error: bool) -> fmt::Result {
    let class = if error { "placeholder error" } else { "placeholder" };
    writeln!(out, "<div class=\"{}\">{}</div>", class, text)
}

fn filter_form(out: &mut String, params: &ListSamplesParams) -> fmt::Result {
    writeln!(out, "<form class=\"filters\" method=\"get\" action=\"/samples\">")?;
    writeln!(
        out,
        "<input name=\"assay_type\" placeholder=\"Assay type (e.g. WGS)\" value=\"{}\">",
        escape_html(params.assay_type.as_deref().unwrap_or(""))
    )?;
    writeln!(out, "<input type=\"hidden\" name=\"limit\" value=\"{}\">", params.limit)?;
    writeln!(out, "<button type=\"submit\">Filter</button>")?;
    writeln!(out, "<a href=\"/search\">Search metadata</a>")?;
    writeln!(out, "</form>")
}

fn sample_table(out: &mut String, samples: &[Sample]) -> fmt::Result {
    writeln!(out, "<table class=\"samples\">")?;
    writeln!(out, "<thead><tr>")?;
    writeln!(out, "<th>Sample ID</th>")?;
    writeln!(out, "<th>Patient Hash (De-identified)</th>")?;
    writeln!(out, "<th>Runs</th>")?;
    writeln!(out, "<th><span class=\"sr-only\">View</span></th>")?;
    writeln!(out, "</tr></thead>")?;
    writeln!(out, "<tbody>")?;

    for row in samples.iter().map(SampleRow::from_sample) {
        sample_row(out, &row)?;
    }

    writeln!(out, "</tbody>")?;
    writeln!(out, "</table>")
}

fn sample_row(out: &mut String, row: &SampleRow) -> fmt::Result {
    writeln!(out, "<tr class=\"sample\">")?;
    writeln!(out, "<td>{}</td>", escape_html(&row.sample_id))?;
    writeln!(out, "<td class=\"mono\">{}</td>", escape_html(&row.hash_preview))?;
    write!(out, "<td>")?;
    for assay in &row.assays {
        write!(out, "<span class=\"badge\">{}</span>", escape_html(assay))?;
    }
    writeln!(out, "</td>")?;
    writeln!(
        out,
        "<td><a href=\"{}\">View Analysis<span class=\"sr-only\">, {}</span></a></td>",
        escape_html(&row.href),
        escape_html(&row.sample_id)
    )?;
    writeln!(out, "</tr>")
}

fn pager(out: &mut String, params: &ListSamplesParams, shown: usize) -> fmt::Result {
    let previous = params.previous_page();
    // A full page means there may be more
    let has_next = shown >= params.limit as usize && shown > 0;

    if previous.is_none() && !has_next {
        return Ok(());
    }

    writeln!(out, "<nav class=\"pager\">")?;
    if let Some(previous) = previous {
        writeln!(
            out,
            "<a rel=\"prev\" href=\"/samples?{}\">Previous</a>",
            escape_html(&previous.to_query_string())
        )?;
    }
    if has_next {
        writeln!(
            out,
            "<a rel=\"next\" href=\"/samples?{}\">Next</a>",
            escape_html(&params.next_page().to_query_string())
        )?;
    }
    writeln!(out, "</nav>")
}
