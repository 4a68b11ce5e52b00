//! Docebo course-catalog ingestion.
//!
//! Pulls catalog pages, course detail records, and related-course lists from
//! a Docebo-style REST API, correlates the three data sets into one
//! denormalized record per course, and hands each record plus a content
//! fingerprint to a downstream [`sink::RecordSink`].
//!
//! The hosting framework's lifecycle, the concrete persistence sink, and
//! config loading stay outside this crate; they reach in through
//! [`api::CourseApi`], [`sink::RecordSink`], and [`config::SourceConfig`].

pub mod api;
pub mod catalog;
pub mod config;
pub mod courses;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod models;
pub mod sink;

mod test_support;

pub use api::{CourseApi, HttpCourseApi};
pub use config::{RetryPolicy, SourceConfig};
pub use engine::{RunStage, RunSummary, SourceEngine};
pub use error::{Error, Result};
pub use models::{
    CatalogEntry, CatalogPage, CourseDetail, CourseRecord, Envelope, RelatedCourse,
    RelatedCourseItem, RelatedCourseList, RelatedPage,
};
pub use sink::{MemorySink, RecordSink};
