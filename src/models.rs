//! Typed records at the API boundary and the denormalized output record.
//!
//! Optional wire fields are explicit `Option`s with `#[serde(default)]`; a
//! missing field becomes `None` instead of a decode failure.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Every Docebo endpoint wraps its payload in a `data` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Raw record returned by one catalog page. Unique per `item_id` within a
/// catalog; duplicates across catalogs are possible and not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item_id: u64,
    #[serde(default)]
    pub access_status: i64,
}

impl CatalogEntry {
    pub fn is_active(&self) -> bool {
        self.access_status == 1
    }
}

/// One page of a paginated catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub items: Vec<CatalogEntry>,
    pub current_page: u64,
    #[serde(default)]
    pub has_more_data: bool,
}

/// Full record for one course, fetched once per catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDetail {
    pub id: u64,
    pub slug_name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, rename = "uidCourse")]
    pub uid_course: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub credits: Option<Value>,
    #[serde(default)]
    pub additional_fields: Option<Value>,
    #[serde(default)]
    pub tree: Option<Value>,
}

/// Items payload of the related-courses endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedPage {
    #[serde(default)]
    pub items: Vec<RelatedCourseItem>,
}

/// Raw related-course item as returned by the API. Unrecognized fields are
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedCourseItem {
    pub id_course: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Related-course item joined against the loaded course details to add `slug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedCourse {
    pub slug: String,
    pub id_course: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One related-course list per catalog entry that yielded a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedCourseList {
    pub id: u64,
    pub items: Vec<RelatedCourse>,
}

/// The denormalized record handed to the sink, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub uid_course: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub credits: Option<Value>,
    #[serde(default)]
    pub additional_fields: Option<Value>,
    #[serde(default)]
    pub tree: Option<Value>,
    /// Absent (not null) when no related-course list matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_courses: Option<Vec<RelatedCourse>>,
}

impl CourseRecord {
    pub fn from_parts(detail: CourseDetail, related: Option<RelatedCourseList>) -> Result<Self> {
        let id = detail.id.to_string();
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("course record id is empty".to_string()));
        }
        Ok(Self {
            id,
            slug: detail.slug_name,
            img: detail.thumbnail,
            uid_course: detail.uid_course,
            name: detail.name,
            description: detail.description,
            duration: detail.duration,
            credits: detail.credits,
            additional_fields: detail.additional_fields,
            tree: detail.tree,
            related_courses: related.map(|list| list.items),
        })
    }

    /// Sha256 over the record's canonical JSON form. A pure function of the
    /// field values, so identical content across runs yields identical
    /// fingerprints.
    pub fn fingerprint(&self) -> Result<String> {
        let payload =
            serde_json::to_vec(self).map_err(|e| Error::backend("serialize course record", e))?;
        Ok(hex::encode(Sha256::digest(&payload)))
    }
}
