//! Upstream API seam.
//!
//! The engine and loaders only see `CourseApi`; `HttpCourseApi` is the
//! production implementation against the Docebo `learn/v1` endpoints.

use crate::config::SourceConfig;
use crate::fetch::Fetcher;
use crate::models::{CatalogPage, CourseDetail, Envelope, RelatedCourseItem, RelatedPage};
use crate::{Error, Result};
use async_trait::async_trait;

#[async_trait]
pub trait CourseApi: Send + Sync {
    /// One page of one catalog's listing.
    async fn catalog_page(&self, catalog_id: &str, page: u64) -> Result<CatalogPage>;

    /// Full detail record for one course.
    async fn course(&self, item_id: u64) -> Result<CourseDetail>;

    /// Related-course items for one course, bounded by `page_size`.
    async fn related(&self, item_id: u64, page_size: usize) -> Result<Vec<RelatedCourseItem>>;

    /// Reachability check for the configured base URL. A failure here is a
    /// configuration error, not a retryable fetch.
    async fn probe(&self) -> Result<()>;
}

pub struct HttpCourseApi {
    base_url: String,
    fetcher: Fetcher,
}

impl HttpCourseApi {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            fetcher: Fetcher::new(config.retry),
        }
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn catalog_page(&self, catalog_id: &str, page: u64) -> Result<CatalogPage> {
        let url = format!(
            "{}/learn/v1/catalog/{}?page={}",
            self.base_url, catalog_id, page
        );
        let envelope: Envelope<CatalogPage> = self.fetcher.get_json(&url).await?;
        Ok(envelope.data)
    }

    async fn course(&self, item_id: u64) -> Result<CourseDetail> {
        let url = format!("{}/learn/v1/courses/{}", self.base_url, item_id);
        let envelope: Envelope<CourseDetail> = self.fetcher.get_json(&url).await?;
        Ok(envelope.data)
    }

    async fn related(&self, item_id: u64, page_size: usize) -> Result<Vec<RelatedCourseItem>> {
        let url = format!(
            "{}/learn/v1/courses/{}/by_category?page_size={}",
            self.base_url, item_id, page_size
        );
        let envelope: Envelope<RelatedPage> = self.fetcher.get_json(&url).await?;
        Ok(envelope.data.items)
    }

    async fn probe(&self) -> Result<()> {
        let url = format!("{}/learn/v1/courses", self.base_url);
        self.fetcher.get_once(&url).await.map_err(|e| {
            Error::InvalidInput(format!(
                "cannot access Docebo with the provided url '{}': {e}",
                self.base_url
            ))
        })
    }
}
