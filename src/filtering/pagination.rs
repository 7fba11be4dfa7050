use axum::http::{HeaderMap, HeaderValue, header::CONTENT_RANGE};

use crate::config::SearchConfig;
use crate::models::PageDescriptor;

/// Offset and limit for a requested page.
///
/// Page numbers are 1-based; the size falls back to the configured default and is
/// capped at the configured maximum.
#[must_use]
pub fn page_window(page: Option<&PageDescriptor>, config: &SearchConfig) -> (u64, u64) {
    let limit = config.page_size(page.and_then(|p| p.size));
    let number = page.and_then(|p| p.number).unwrap_or(1).max(1);
    let offset = number.saturating_sub(1).saturating_mul(limit);
    (offset.min(i64::MAX.unsigned_abs()), limit)
}

/// Build the `Content-Range` header for a page of results.
///
/// # Arguments
///
/// * `offset` - The starting point of the range.
/// * `limit` - The maximum number of items in the range.
/// * `total_count` - The total number of matching items.
/// * `resource_name` - The name of the resource being paginated.
#[must_use]
pub fn calculate_content_range(offset: u64, limit: u64, total_count: u64, resource_name: &str) -> HeaderMap {
    let last = offset
        .saturating_add(limit.max(1))
        .saturating_sub(1)
        .min(total_count.saturating_sub(1));
    let content_range = format!("{resource_name} {offset}-{last}/{total_count}");

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&content_range) {
        Ok(value) => {
            headers.insert(CONTENT_RANGE, value);
        }
        Err(err) => tracing::warn!(%content_range, error = %err, "could not encode Content-Range header"),
    }
    headers
}
