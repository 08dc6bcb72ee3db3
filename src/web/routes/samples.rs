//! Sample Routes
//!
//! - GET /samples - Sample list (query: skip, limit, assay_type)
//! - GET /search - Metadata search (query: key, value)
//! - GET /samples/:sample_id - Run detail for one sample

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Html,
};
use std::sync::Arc;

use crate::model::{ListSamplesParams, MetadataSearchParams};
use crate::views;
use crate::web::error::WebResult;
use crate::web::state::AppState;

/// GET /samples
///
/// Reloads itself every refetch interval so the polled snapshot reaches
/// the browser. Unreadable paging parameters fall back to the first page.
pub async fn list_samples(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListSamplesParams>, QueryRejection>,
) -> WebResult<Html<String>> {
    let params = match params {
        Ok(Query(params)) => params.normalized(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Ignoring malformed list parameters");
            ListSamplesParams::default()
        }
    };
    let result = state.queries.list_samples(Some(params.clone())).await;

    tracing::debug!(
        skip = params.skip,
        limit = params.limit,
        status = %result.status(),
        "Rendering sample list"
    );

    let body = views::render_sample_list(&result, &params)?;
    let page = views::render_page("Samples", &body, Some(state.list_refresh_secs()))?;
    Ok(Html(page))
}

/// GET /search
pub async fn search_samples(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MetadataSearchParams>, QueryRejection>,
) -> WebResult<Html<String>> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let result = state.queries.search_by_metadata(params.clone()).await;

    let body = views::render_search_results(&result, &params)?;
    let page = views::render_page("Metadata Search", &body, None)?;
    Ok(Html(page))
}

/// GET /samples/:sample_id
pub async fn sample_detail(
    State(state): State<Arc<AppState>>,
    Path(sample_id): Path<String>,
) -> WebResult<Html<String>> {
    let result = state.queries.get_sample_detail(Some(&sample_id)).await;

    tracing::debug!(sample_id = %sample_id, status = %result.status(), "Rendering sample detail");

    let body = views::render_run_detail(&result)?;
    let page = views::render_page(&format!("Analysis {}", sample_id), &body, None)?;
    Ok(Html(page))
}
