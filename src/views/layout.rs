//! Page shell shared by every dashboard route

use std::fmt::{self, Write};

use super::escape_html;

pub const APP_TITLE: &str = "NGS Variant Validator";

const ECHARTS_SRC: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

// Initialises every chart container rendered by the detail view
const CHART_BOOTSTRAP: &str = r#"document.querySelectorAll('[data-chart-option]').forEach(function (el) {
  var chart = echarts.init(el);
  chart.setOption(JSON.parse(el.dataset.chartOption));
  window.addEventListener('resize', function () { chart.resize(); });
});"#;

const STYLES: &str = r#"body { margin: 0; font-family: system-ui, sans-serif; background: #f9fafb; color: #0f172a; }
header { background: #fff; border-bottom: 1px solid #e5e7eb; padding: 1rem 1.5rem; }
header h1 { margin: 0; font-size: 1.25rem; color: #1e3a8a; }
main { max-width: 80rem; margin: 0 auto; padding: 2rem 1rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { text-align: left; padding: 0.75rem; border-bottom: 1px solid #e5e7eb; font-size: 0.875rem; }
.mono { font-family: ui-monospace, monospace; }
.badge { display: inline-block; border-radius: 0.375rem; padding: 0.125rem 0.5rem; margin-right: 0.5rem; font-size: 0.75rem; background: #eff6ff; color: #1d4ed8; }
.badge.assay { background: #f0fdf4; color: #15803d; }
.placeholder { padding: 1rem; color: #6b7280; }
.placeholder.error { color: #dc2626; }
.card { background: #fff; border-radius: 0.75rem; margin-bottom: 1.5rem; box-shadow: 0 1px 2px rgba(0,0,0,0.05); }
.card-header { display: flex; justify-content: space-between; align-items: center; padding: 1rem 1.5rem; border-bottom: 1px solid #e5e7eb; background: #f9fafb; }
.card-body { display: grid; grid-template-columns: 1fr 2fr; gap: 1.5rem; padding: 1.5rem; }
.metadata dt { font-size: 0.875rem; color: #6b7280; text-transform: capitalize; }
.metadata dd { margin: 0.25rem 0 1rem; font-size: 0.875rem; overflow-wrap: anywhere; }
.chart { height: 20rem; width: 100%; }
.notice { font-size: 0.75rem; color: #b45309; }
.pager { display: flex; gap: 1rem; margin-top: 1rem; }
"#;

/// Wrap a rendered view in the dashboard shell.
///
/// `refresh_secs` adds a meta refresh so polled data reaches the browser.
pub fn render_page(title: &str, body: &str, refresh_secs: Option<u64>) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    if let Some(secs) = refresh_secs {
        writeln!(out, "<meta http-equiv=\"refresh\" content=\"{}\">", secs)?;
    }
    writeln!(out, "<title>{} | {}</title>", escape_html(title), APP_TITLE)?;
    writeln!(out, "<style>{}</style>", STYLES)?;
    writeln!(out, "<script src=\"{}\"></script>", ECHARTS_SRC)?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<header><h1>{}</h1></header>", APP_TITLE)?;
    writeln!(out, "<main>")?;
    out.push_str(body);
    writeln!(out, "</main>")?;
    writeln!(out, "<script>{}</script>", CHART_BOOTSTRAP)?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;

    Ok(out)
}
