//! Run orchestration: aggregate catalogs, load details and related lists,
//! correlate by id, and emit one record per loaded course.

use crate::api::CourseApi;
use crate::catalog::load_catalogs;
use crate::config::SourceConfig;
use crate::courses::{load_details, load_related, slug_index};
use crate::models::{CourseRecord, RelatedCourseList};
use crate::sink::RecordSink;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Stages of one run. `Aborted` is terminal and reachable only from
/// `CatalogsFiltered` (the empty-catalog guard); every later stage tolerates
/// partial loss and proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Init,
    CatalogsLoading,
    CatalogsFiltered,
    DetailsLoading,
    RelatedLoading,
    Correlating,
    Emitting,
    Done,
    Aborted,
}

/// Outcome of one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub stage: RunStage,
    pub entries_active: u64,
    pub courses_loaded: u64,
    pub related_loaded: u64,
    pub records_emitted: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives one best-effort snapshot per invocation: the run either completes
/// each stage or aborts at the empty-catalog guard. Entities are transient,
/// built fresh each run and discarded after handoff to the sink.
pub struct SourceEngine {
    api: Arc<dyn CourseApi>,
    sink: Arc<dyn RecordSink>,
    config: SourceConfig,
}

impl SourceEngine {
    pub fn new(api: Arc<dyn CourseApi>, sink: Arc<dyn RecordSink>, config: SourceConfig) -> Self {
        Self { api, sink, config }
    }

    /// Structural validation plus the availability probe against the base
    /// URL. Run this before the first `run()`; a probe failure is a hard
    /// configuration error.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn check(&self) -> Result<()> {
        self.config.validate()?;
        self.api.probe().await
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            %run_id,
            stage = ?RunStage::CatalogsLoading,
            catalogs = self.config.catalog_ids.len(),
            "run started"
        );

        let entries = match load_catalogs(self.api.clone(), &self.config.catalog_ids).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(%run_id, stage = ?RunStage::Aborted, error = %e, "aborting run");
                return Err(e);
            }
        };
        let entries_active = entries.len() as u64;
        info!(
            %run_id,
            stage = ?RunStage::CatalogsFiltered,
            active = entries_active,
            "catalogs aggregated and filtered"
        );

        info!(%run_id, stage = ?RunStage::DetailsLoading, "loading course details");
        let details = load_details(self.api.clone(), &entries).await;
        let courses_loaded = details.len() as u64;

        // The detail set must be fully settled before the related loader and
        // the correlator read it; no mutation happens past this point.
        let slugs = slug_index(&details);

        info!(%run_id, stage = ?RunStage::RelatedLoading, "loading related courses");
        let related = load_related(
            self.api.clone(),
            &entries,
            &slugs,
            self.config.related_links,
        )
        .await;
        let related_loaded = related.len() as u64;

        info!(%run_id, stage = ?RunStage::Correlating, "correlating records");
        let related_by_id: HashMap<u64, RelatedCourseList> =
            related.into_iter().map(|list| (list.id, list)).collect();

        info!(%run_id, stage = ?RunStage::Emitting, records = courses_loaded, "emitting records");
        let mut records_emitted = 0u64;
        for detail in details {
            // A course may legitimately have no related list; the field stays unset.
            let related = related_by_id.get(&detail.id).cloned();
            let record = CourseRecord::from_parts(detail, related)?;
            let fingerprint = record.fingerprint()?;
            self.sink.accept(record, &fingerprint).await?;
            records_emitted += 1;
        }

        let summary = RunSummary {
            run_id,
            stage: RunStage::Done,
            entries_active,
            courses_loaded,
            related_loaded,
            records_emitted,
            started_at,
            finished_at: Utc::now(),
        };
        info!(%run_id, stage = ?RunStage::Done, records_emitted, "run finished");
        Ok(summary)
    }
}
