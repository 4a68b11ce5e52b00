//! Catalog pagination and aggregation.
//!
//! One paginator walks a single catalog strictly page by page (the next page
//! number comes from the `current_page` the API echoed back). The aggregator
//! fans paginators out across all configured catalogs and filters the combined
//! result down to active entries.

use crate::api::CourseApi;
use crate::models::CatalogEntry;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Typed terminal condition of one pagination step.
enum PageStep {
    Next(u64),
    Done,
}

/// Loads every page of one catalog, in strictly increasing page order.
///
/// A page failure after retry exhaustion truncates: whatever was accumulated
/// from earlier pages is returned and the run continues without this
/// catalog's tail.
#[tracing::instrument(level = "info", skip(api))]
pub async fn load_catalog(api: &dyn CourseApi, catalog_id: &str) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    let mut page = 1u64;
    info!(catalog_id, "retrieving catalog");
    loop {
        let step = match api.catalog_page(catalog_id, page).await {
            Ok(p) => {
                entries.extend(p.items);
                if !p.has_more_data {
                    PageStep::Done
                } else if p.current_page + 1 <= page {
                    // A cursor that does not advance would loop forever.
                    warn!(catalog_id, page, echoed = p.current_page, "page cursor did not advance; stopping");
                    PageStep::Done
                } else {
                    PageStep::Next(p.current_page + 1)
                }
            }
            Err(e) => {
                warn!(
                    catalog_id,
                    page,
                    error = %e,
                    "catalog page failed after retries; returning partial catalog"
                );
                PageStep::Done
            }
        };
        match step {
            PageStep::Next(next) => page = next,
            PageStep::Done => break,
        }
    }
    info!(catalog_id, records = entries.len(), "catalog retrieved");
    entries
}

/// Retains only entries with `access_status == 1`. Idempotent.
pub fn filter_active(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    entries.into_iter().filter(CatalogEntry::is_active).collect()
}

/// Runs one paginator per catalog id concurrently, flattens the results and
/// filters to active entries. Each paginator degrades to partial results
/// internally, so the join itself never propagates fetch failures.
///
/// An empty filtered set aborts the run: there is nothing to build.
#[tracing::instrument(level = "info", skip(api, catalog_ids), fields(catalogs = catalog_ids.len()))]
pub async fn load_catalogs(
    api: Arc<dyn CourseApi>,
    catalog_ids: &[String],
) -> Result<Vec<CatalogEntry>> {
    let mut tasks: JoinSet<Vec<CatalogEntry>> = JoinSet::new();
    for id in catalog_ids {
        let api = api.clone();
        let id = id.clone();
        tasks.spawn(async move { load_catalog(api.as_ref(), &id).await });
    }

    let mut combined = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let entries = joined.map_err(|e| Error::backend("join catalog task", e))?;
        combined.extend(entries);
    }

    let active = filter_active(combined);
    if active.is_empty() {
        return Err(Error::EmptyCatalog(catalog_ids.join(", ")));
    }
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{entry, page, FakeApi, PageScript};

    #[tokio::test]
    async fn walks_pages_in_strictly_increasing_order() {
        let api = FakeApi::new().with_catalog(
            "main",
            vec![
                PageScript::Page(page(vec![entry(1, 1)], 1, true)),
                PageScript::Page(page(vec![entry(2, 1)], 2, true)),
                PageScript::Page(page(vec![entry(3, 1)], 3, false)),
            ],
        );

        let entries = load_catalog(&api, "main").await;
        assert_eq!(
            entries.iter().map(|e| e.item_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            api.calls(),
            vec!["catalog:main:1", "catalog:main:2", "catalog:main:3"]
        );
    }

    #[tokio::test]
    async fn failure_at_page_k_truncates_to_earlier_pages() {
        let api = FakeApi::new().with_catalog(
            "main",
            vec![
                PageScript::Page(page(vec![entry(1, 1), entry(2, 1)], 1, true)),
                PageScript::Fail,
            ],
        );

        let entries = load_catalog(&api, "main").await;
        assert_eq!(
            entries.iter().map(|e| e.item_id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(api.calls(), vec!["catalog:main:1", "catalog:main:2"]);
    }

    #[tokio::test]
    async fn stuck_page_cursor_terminates() {
        let api = FakeApi::new().with_catalog(
            "main",
            vec![PageScript::Page(page(vec![entry(1, 1)], 0, true))],
        );

        let entries = load_catalog(&api, "main").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(api.calls(), vec!["catalog:main:1"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let entries = vec![entry(1, 1), entry(2, 0), entry(3, 1), entry(4, 2)];
        let once = filter_active(entries);
        let twice = filter_active(once.clone());
        assert_eq!(once, twice);
        assert_eq!(
            once.iter().map(|e| e.item_id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[tokio::test]
    async fn duplicates_across_catalogs_are_kept() {
        let api = Arc::new(
            FakeApi::new()
                .with_catalog(
                    "a",
                    vec![PageScript::Page(page(vec![entry(1, 1)], 1, false))],
                )
                .with_catalog(
                    "b",
                    vec![PageScript::Page(page(vec![entry(1, 1)], 1, false))],
                ),
        );

        let entries = load_catalogs(api, &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn all_inactive_entries_abort_the_run() {
        let api = Arc::new(FakeApi::new().with_catalog(
            "main",
            vec![PageScript::Page(page(
                vec![entry(1, 0), entry(2, 0)],
                1,
                false,
            ))],
        ));

        let err = load_catalogs(api, &["main".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCatalog(_)));
    }

    #[tokio::test]
    async fn no_catalog_ids_abort_the_run() {
        let api = Arc::new(FakeApi::new());
        let err = load_catalogs(api, &[]).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCatalog(_)));
    }
}
