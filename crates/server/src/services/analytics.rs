//! Selection analytics: time-windowed top-N product queries.
//!
//! All caller input arrives as raw strings and is normalised here with
//! lenient fallbacks: an unparsable timestamp falls back to the window
//! default, a non-numeric `top` falls back to 5, an unknown mode falls back
//! to counting. An empty window is a successful, empty result.
//!
//! Grouping happens in SQL; ranking and truncation happen here so the
//! tie-break policy is explicit.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use crate::db::{ProductRepository, SelectionGroup, SelectionRepository};
use crate::error::AppError;
use crate::models::Product;

/// Fallback item count when `top` is absent or non-numeric.
const DEFAULT_TOP_N: i64 = 5;
/// Inclusive clamp range for `top`.
const MIN_TOP_N: i64 = 1;
const MAX_TOP_N: i64 = 50;
/// Window length when `start` is absent.
const DEFAULT_WINDOW_DAYS: i64 = 365;

/// Raw query parameters for the summary endpoint.
///
/// Everything is optional and stringly-typed; normalisation is lenient by
/// design (bad values fall back, they don't error).
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub mode: Option<String>,
    pub top: Option<String>,
    pub product_type: Option<String>,
}

/// Ranking mode for the top-N query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Rank by selection count, ties broken by recency.
    Count,
    /// Rank by recency, ties broken by selection count.
    Recent,
}

impl RankMode {
    /// Parse a mode parameter. Case-insensitive; anything other than
    /// `"recent"` means [`RankMode::Count`].
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("recent") => Self::Recent,
            _ => Self::Count,
        }
    }
}

/// Result of a top-N query.
#[derive(Debug, Serialize)]
pub struct TopProducts {
    /// Included events before truncation
    pub total_count: i64,
    /// Distinct products before truncation
    pub total_distinct_products: i64,
    pub items: Vec<TopProductItem>,
}

/// One ranked product with its window aggregates.
#[derive(Debug, Serialize)]
pub struct TopProductItem {
    pub product: Product,
    pub count: i64,
    pub last_time: DateTime<Utc>,
}

/// Run the top-N query over `[start, end]`.
///
/// Products deleted since their selections were recorded are silently
/// omitted from `items` (their events still count toward the totals).
///
/// # Errors
///
/// Returns `AppError::Database` if a query fails. An empty window is a
/// success, never an error.
#[instrument(skip(pool))]
pub async fn top_products(pool: &PgPool, params: &SummaryParams) -> Result<TopProducts, AppError> {
    let (start, end) = resolve_window(params.start.as_deref(), params.end.as_deref(), Utc::now());
    let mode = RankMode::parse(params.mode.as_deref());
    let top_n = clamp_top(params.top.as_deref());
    let type_filter = params
        .product_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut groups = SelectionRepository::new(pool)
        .aggregate_in_window(start, end, type_filter)
        .await?;

    let total_count: i64 = groups.iter().map(|g| g.count).sum();
    let total_distinct_products = i64::try_from(groups.len()).unwrap_or(i64::MAX);

    rank_groups(&mut groups, mode);
    groups.truncate(top_n);

    let products = ProductRepository::new(pool);
    let mut items = Vec::with_capacity(groups.len());
    for group in groups {
        if let Some(product) = products.get_by_id(group.product_id).await? {
            items.push(TopProductItem {
                product,
                count: group.count,
                last_time: group.last_time,
            });
        }
    }

    Ok(TopProducts {
        total_count,
        total_distinct_products,
        items,
    })
}

/// Sort groups in ranking order for the given mode.
pub fn rank_groups(groups: &mut [SelectionGroup], mode: RankMode) {
    match mode {
        RankMode::Count => groups.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.last_time.cmp(&a.last_time))
        }),
        RankMode::Recent => groups.sort_by(|a, b| {
            b.last_time
                .cmp(&a.last_time)
                .then_with(|| b.count.cmp(&a.count))
        }),
    }
}

/// Resolve the query window. `end` defaults to `now`; `start` defaults to
/// `end - 365 days`. Unparsable values count as absent.
fn resolve_window(
    start_raw: Option<&str>,
    end_raw: Option<&str>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = end_raw.and_then(parse_time).unwrap_or(now);
    let start = start_raw
        .and_then(parse_time)
        .unwrap_or_else(|| end - Duration::days(DEFAULT_WINDOW_DAYS));
    (start, end)
}

/// Parse a timestamp parameter.
///
/// Accepts RFC 3339, a naive datetime, or a bare calendar date; naive values
/// are interpreted in the deployment's local time zone, dates as that day's
/// midnight.
fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_to_utc(naive);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return local_to_utc(date.and_hms_opt(0, 0, 0)?);
    }

    None
}

/// Convert a local-naive datetime to UTC, picking the earlier instant across
/// DST transitions.
fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Clamp the `top` parameter to `[1, 50]`; non-numeric input falls back
/// to 5.
fn clamp_top(raw: Option<&str>) -> usize {
    let parsed = raw
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOP_N);
    usize::try_from(parsed.clamp(MIN_TOP_N, MAX_TOP_N)).unwrap_or(DEFAULT_TOP_N as usize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use deco_select_core::ProductId;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().unwrap()
    }

    fn group(product_id: i32, count: i64, last_time: DateTime<Utc>) -> SelectionGroup {
        SelectionGroup {
            product_id: ProductId::new(product_id),
            count,
            last_time,
        }
    }

    #[test]
    fn test_mode_parse_recent_case_insensitive() {
        assert_eq!(RankMode::parse(Some("recent")), RankMode::Recent);
        assert_eq!(RankMode::parse(Some("RECENT")), RankMode::Recent);
        assert_eq!(RankMode::parse(Some(" Recent ")), RankMode::Recent);
    }

    #[test]
    fn test_mode_parse_anything_else_is_count() {
        assert_eq!(RankMode::parse(Some("count")), RankMode::Count);
        assert_eq!(RankMode::parse(Some("bogus")), RankMode::Count);
        assert_eq!(RankMode::parse(None), RankMode::Count);
    }

    #[test]
    fn test_clamp_top_defaults_and_range() {
        assert_eq!(clamp_top(None), 5);
        assert_eq!(clamp_top(Some("abc")), 5);
        assert_eq!(clamp_top(Some("7")), 7);
        assert_eq!(clamp_top(Some("0")), 1);
        assert_eq!(clamp_top(Some("-3")), 1);
        assert_eq!(clamp_top(Some("1000")), 50);
    }

    #[test]
    fn test_parse_time_rfc3339() {
        let parsed = parse_time("2025-06-01T08:30:00Z").unwrap();
        assert_eq!(parsed, utc(2025, 6, 1, 8, 30, 0));
    }

    #[test]
    fn test_parse_time_bare_date_is_local_midnight() {
        let parsed = parse_time("2025-06-01").unwrap();
        let expected = Local
            .from_local_datetime(&NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_time_garbage_is_none() {
        assert_eq!(parse_time("not-a-date"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn test_resolve_window_defaults() {
        let now = utc(2025, 6, 1, 12, 0, 0);

        let (start, end) = resolve_window(None, None, now);
        assert_eq!(end, now);
        assert_eq!(start, now - Duration::days(365));

        // unparsable values fall back to the defaults, not an error
        let (start, end) = resolve_window(Some("garbage"), Some("garbage"), now);
        assert_eq!(end, now);
        assert_eq!(start, now - Duration::days(365));
    }

    #[test]
    fn test_resolve_window_start_follows_explicit_end() {
        let now = utc(2025, 6, 1, 12, 0, 0);
        let (start, end) = resolve_window(None, Some("2025-03-01T00:00:00Z"), now);
        assert_eq!(end, utc(2025, 3, 1, 0, 0, 0));
        assert_eq!(start, end - Duration::days(365));
    }

    #[test]
    fn test_count_mode_ranks_by_count_then_recency() {
        let t1 = utc(2025, 6, 1, 10, 0, 0);
        let t2 = utc(2025, 6, 1, 11, 0, 0);

        // A and B tie on count; B was selected more recently and wins the tie
        let mut groups = vec![group(1, 5, t1), group(2, 5, t2), group(3, 9, t1)];
        rank_groups(&mut groups, RankMode::Count);

        let ids: Vec<i32> = groups.iter().map(|g| g.product_id.as_i32()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_recent_mode_ranks_by_recency_then_count() {
        let t1 = utc(2025, 6, 1, 10, 0, 0);
        let t2 = utc(2025, 6, 1, 11, 0, 0);

        // B has the later last_time and wins outright despite the lower count
        let mut groups = vec![group(1, 9, t1), group(2, 5, t2), group(3, 7, t2)];
        rank_groups(&mut groups, RankMode::Recent);

        let ids: Vec<i32> = groups.iter().map(|g| g.product_id.as_i32()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_rank_empty_groups() {
        let mut groups: Vec<SelectionGroup> = vec![];
        rank_groups(&mut groups, RankMode::Count);
        assert!(groups.is_empty());
    }
}
