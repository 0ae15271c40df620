use std::sync::Arc;

use academy_core::CodeValidationTable;
use academy_core::model::LessonId;
use storage::{ProgressRepository, Storage};

use crate::Clock;
use crate::catalog::CourseCatalog;
use crate::content::{ContentSource, LessonRefresher, RefreshOutcome};
use crate::error::AppServicesError;
use crate::lesson_tracker::LessonTracker;
use crate::progress_service::UserProgressService;

/// Assembles the catalog, persistence and refresh machinery for a host.
pub struct AppServices {
    records: ProgressRepository,
    content: Arc<dyn ContentSource>,
    validators: Arc<CodeValidationTable>,
    refresher: Arc<LessonRefresher>,
    catalog: CourseCatalog,
}

impl AppServices {
    /// Build services on top of an existing storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Content` if the course list cannot be loaded.
    pub async fn new(
        storage: Storage,
        content: Arc<dyn ContentSource>,
        validators: CodeValidationTable,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let courses = content.list_courses().await?;
        tracing::debug!(courses = courses.len(), "loaded course catalog");

        Ok(Self {
            records: ProgressRepository::new(Arc::clone(&storage.kv)),
            content,
            validators: Arc::new(validators),
            refresher: Arc::new(LessonRefresher::new(clock)),
            catalog: CourseCatalog::new(courses),
        })
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        content: Arc<dyn ContentSource>,
        validators: CodeValidationTable,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(storage, content, validators, clock).await
    }

    #[must_use]
    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn records(&self) -> ProgressRepository {
        self.records.clone()
    }

    pub async fn user_progress(&self) -> UserProgressService {
        UserProgressService::load(self.records.clone()).await
    }

    /// Open a tracker for `id` and record it as the learner's current lesson.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` for unknown lessons, or a tracker
    /// error for lessons without steps or failed writes.
    pub async fn open_lesson(
        &self,
        id: &LessonId,
        user: &mut UserProgressService,
    ) -> Result<LessonTracker, AppServicesError> {
        let lesson = self.catalog.require_lesson(id)?.clone();
        let tracker =
            LessonTracker::open(lesson, self.records.clone(), Arc::clone(&self.validators))
                .await?;
        user.set_current_lesson(id).await?;
        Ok(tracker)
    }

    /// Re-fetch a lesson from the content source and apply it in ticket order.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Content` if the fetch fails.
    pub async fn refresh_lesson(&mut self, id: &LessonId) -> Result<RefreshOutcome, AppServicesError> {
        let outcome = self
            .refresher
            .refresh(self.content.as_ref(), id, &mut self.catalog)
            .await?;
        Ok(outcome)
    }
}
