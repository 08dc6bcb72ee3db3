//! Dashboard Views
//!
//! Server-rendered HTML for the two dashboard pages.
//!
//! - `layout`: page shell (header, main container, chart bootstrap)
//! - `sample_list`: sample table, filter form, pagination
//! - `run_detail`: one card per run with metadata and quality chart
//!
//! Each view is a pure function of a [`QueryState`](crate::query::QueryState)
//! and renders one of three states: loading, error, or populated.

pub mod layout;
pub mod run_detail;
pub mod sample_list;

pub use layout::render_page;
pub use run_detail::{
    display_value, format_metadata_key, metadata_entries, render_run_detail, MetadataEntry,
    RunCard,
};
pub use sample_list::{
    render_sample_list, render_search_results, sample_href, truncate_hash, SampleRow,
};

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
