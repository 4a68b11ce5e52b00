#![cfg(test)]

//! Scriptable in-memory `CourseApi` used across the crate's unit tests.

use crate::api::CourseApi;
use crate::models::{CatalogEntry, CatalogPage, CourseDetail, RelatedCourseItem};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Map;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub(crate) enum PageScript {
    Page(CatalogPage),
    Fail,
}

/// Fake upstream API. Responses are scripted at construction; every request
/// is appended to `calls` so tests can assert on request order.
#[derive(Default)]
pub(crate) struct FakeApi {
    catalogs: HashMap<String, Vec<PageScript>>,
    courses: HashMap<u64, CourseDetail>,
    failing_courses: HashSet<u64>,
    related: HashMap<u64, Vec<RelatedCourseItem>>,
    failing_related: HashSet<u64>,
    probe_fails: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_catalog(mut self, id: &str, pages: Vec<PageScript>) -> Self {
        self.catalogs.insert(id.to_string(), pages);
        self
    }

    pub(crate) fn with_course(mut self, detail: CourseDetail) -> Self {
        self.courses.insert(detail.id, detail);
        self
    }

    pub(crate) fn with_failing_course(mut self, item_id: u64) -> Self {
        self.failing_courses.insert(item_id);
        self
    }

    pub(crate) fn with_related(mut self, item_id: u64, items: Vec<RelatedCourseItem>) -> Self {
        self.related.insert(item_id, items);
        self
    }

    pub(crate) fn with_failing_related(mut self, item_id: u64) -> Self {
        self.failing_related.insert(item_id);
        self
    }

    pub(crate) fn with_probe_failure(mut self) -> Self {
        self.probe_fails = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CourseApi for FakeApi {
    async fn catalog_page(&self, catalog_id: &str, page: u64) -> Result<CatalogPage> {
        self.record(format!("catalog:{catalog_id}:{page}"));
        let pages = self
            .catalogs
            .get(catalog_id)
            .ok_or_else(|| Error::BackendMessage(format!("unknown catalog '{catalog_id}'")))?;
        match pages.get(page as usize - 1) {
            Some(PageScript::Page(p)) => Ok(p.clone()),
            Some(PageScript::Fail) | None => Err(Error::BackendMessage(format!(
                "catalog '{catalog_id}' page {page} unavailable"
            ))),
        }
    }

    async fn course(&self, item_id: u64) -> Result<CourseDetail> {
        self.record(format!("course:{item_id}"));
        if self.failing_courses.contains(&item_id) {
            return Err(Error::BackendMessage(format!("course {item_id} unavailable")));
        }
        self.courses
            .get(&item_id)
            .cloned()
            .ok_or_else(|| Error::BackendMessage(format!("unknown course {item_id}")))
    }

    async fn related(&self, item_id: u64, page_size: usize) -> Result<Vec<RelatedCourseItem>> {
        self.record(format!("related:{item_id}:{page_size}"));
        if self.failing_related.contains(&item_id) {
            return Err(Error::BackendMessage(format!(
                "related courses for {item_id} unavailable"
            )));
        }
        let mut items = self.related.get(&item_id).cloned().unwrap_or_default();
        items.truncate(page_size);
        Ok(items)
    }

    async fn probe(&self) -> Result<()> {
        self.record("probe".to_string());
        if self.probe_fails {
            return Err(Error::InvalidInput(
                "cannot access Docebo with the provided url".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn entry(item_id: u64, access_status: i64) -> CatalogEntry {
    CatalogEntry {
        item_id,
        access_status,
    }
}

pub(crate) fn page(items: Vec<CatalogEntry>, current_page: u64, has_more_data: bool) -> CatalogPage {
    CatalogPage {
        items,
        current_page,
        has_more_data,
    }
}

pub(crate) fn detail(id: u64, slug: &str) -> CourseDetail {
    CourseDetail {
        id,
        slug_name: slug.to_string(),
        thumbnail: None,
        uid_course: None,
        name: None,
        description: None,
        duration: None,
        credits: None,
        additional_fields: None,
        tree: None,
    }
}

pub(crate) fn related_item(id_course: u64) -> RelatedCourseItem {
    RelatedCourseItem {
        id_course,
        extra: Map::new(),
    }
}
