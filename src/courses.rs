//! Course detail and related-course loaders.
//!
//! Both fan out one fetch per catalog entry, wait for every task to settle,
//! and partition successes from failures. One failing entry never aborts the
//! others; it is reported with its identifier and excluded downstream.

use crate::api::CourseApi;
use crate::models::{CatalogEntry, CourseDetail, RelatedCourse, RelatedCourseItem, RelatedCourseList};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Fetches the full detail record for every entry, concurrently. Only
/// successful results are collected; iteration order downstream is the order
/// results settled here.
#[tracing::instrument(level = "info", skip(api, entries), fields(entries = entries.len()))]
pub async fn load_details(
    api: Arc<dyn CourseApi>,
    entries: &[CatalogEntry],
) -> Vec<CourseDetail> {
    let mut tasks: JoinSet<(u64, Result<CourseDetail>)> = JoinSet::new();
    for entry in entries {
        let api = api.clone();
        let item_id = entry.item_id;
        tasks.spawn(async move { (item_id, api.course(item_id).await) });
    }

    let mut details = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(detail))) => details.push(detail),
            Ok((item_id, Err(e))) => {
                warn!(item_id, error = %e, "course detail fetch failed; excluding course");
            }
            Err(e) => warn!(error = %e, "course detail task failed; excluding course"),
        }
    }
    info!(loaded = details.len(), "course details loaded");
    details
}

/// id -> slug lookup over the fully populated detail set. Built once the
/// detail stage has settled; read-only afterwards.
pub fn slug_index(details: &[CourseDetail]) -> HashMap<u64, String> {
    details
        .iter()
        .map(|d| (d.id, d.slug_name.clone()))
        .collect()
}

/// Fetches the related-course list for every entry, concurrently, with the
/// same partial-failure policy as [`load_details`]. Each returned item is
/// joined against `slugs` to add its `slug`; items referencing a course with
/// no loaded detail are dropped.
#[tracing::instrument(level = "info", skip(api, entries, slugs), fields(entries = entries.len()))]
pub async fn load_related(
    api: Arc<dyn CourseApi>,
    entries: &[CatalogEntry],
    slugs: &HashMap<u64, String>,
    page_size: usize,
) -> Vec<RelatedCourseList> {
    let mut tasks: JoinSet<(u64, Result<Vec<RelatedCourseItem>>)> = JoinSet::new();
    for entry in entries {
        let api = api.clone();
        let item_id = entry.item_id;
        tasks.spawn(async move { (item_id, api.related(item_id, page_size).await) });
    }

    let mut lists = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((item_id, Ok(raw))) => {
                let mut items = Vec::with_capacity(raw.len());
                for item in raw {
                    match slugs.get(&item.id_course) {
                        Some(slug) => items.push(RelatedCourse {
                            slug: slug.clone(),
                            id_course: item.id_course,
                            extra: item.extra,
                        }),
                        None => {
                            debug!(
                                item_id,
                                id_course = item.id_course,
                                "related item has no loaded course detail; dropping"
                            );
                        }
                    }
                }
                lists.push(RelatedCourseList { id: item_id, items });
            }
            Ok((item_id, Err(e))) => {
                warn!(item_id, error = %e, "related-course fetch failed; excluding entry");
            }
            Err(e) => warn!(error = %e, "related-course task failed; excluding entry"),
        }
    }
    info!(loaded = lists.len(), "related-course lists loaded");
    lists
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{detail, entry, related_item, FakeApi};

    #[tokio::test]
    async fn one_failing_detail_does_not_abort_the_others() {
        let api = Arc::new(
            FakeApi::new()
                .with_course(detail(10, "intro"))
                .with_course(detail(12, "advanced"))
                .with_failing_course(11),
        );

        let details = load_details(api, &[entry(10, 1), entry(11, 1), entry(12, 1)]).await;
        let mut ids: Vec<u64> = details.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![10, 12]);
    }

    #[tokio::test]
    async fn related_items_without_a_detail_are_dropped() {
        let api = Arc::new(
            FakeApi::new().with_related(10, vec![related_item(10), related_item(99)]),
        );
        let slugs = slug_index(&[detail(10, "intro")]);

        let lists = load_related(api, &[entry(10, 1)], &slugs, 5).await;
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id, 10);
        assert_eq!(lists[0].items.len(), 1);
        assert_eq!(lists[0].items[0].slug, "intro");
        assert_eq!(lists[0].items[0].id_course, 10);
    }

    #[tokio::test]
    async fn one_failing_related_fetch_excludes_only_that_entry() {
        let api = Arc::new(
            FakeApi::new()
                .with_related(10, vec![related_item(10)])
                .with_failing_related(11),
        );
        let slugs = slug_index(&[detail(10, "intro"), detail(11, "other")]);

        let lists = load_related(api, &[entry(10, 1), entry(11, 1)], &slugs, 5).await;
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id, 10);
    }

    #[tokio::test]
    async fn related_fetch_is_bounded_by_page_size() {
        let api = Arc::new(FakeApi::new().with_related(
            10,
            vec![related_item(10), related_item(11), related_item(12)],
        ));
        let slugs = slug_index(&[detail(10, "a"), detail(11, "b"), detail(12, "c")]);

        let lists = load_related(api, &[entry(10, 1)], &slugs, 2).await;
        assert_eq!(lists[0].items.len(), 2);
    }
}
