//! Content sources and ordered lesson refreshes.
//!
//! Refreshes may overlap; each takes a ticket before fetching and only a
//! ticket newer than the last one applied for that lesson may replace it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use academy_core::Clock;
use academy_core::model::{Course, CourseDraft, Lesson, LessonDraft, LessonId};

use crate::catalog::CourseCatalog;
use crate::error::ContentError;

/// Where course content comes from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>, ContentError>;

    async fn fetch_lesson(&self, id: &LessonId) -> Result<Lesson, ContentError>;
}

/// Content held in memory, replaceable lesson by lesson.
#[derive(Clone, Default)]
pub struct InMemoryContent {
    courses: Arc<Mutex<Vec<Course>>>,
}

impl InMemoryContent {
    #[must_use]
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            courses: Arc::new(Mutex::new(courses)),
        }
    }

    /// Validate drafts into courses.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Invalid` for the first draft that fails validation.
    pub fn from_drafts(drafts: Vec<CourseDraft>) -> Result<Self, ContentError> {
        let courses = drafts
            .into_iter()
            .map(CourseDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(courses))
    }

    /// Replace a lesson's content, as an editor publishing a revision would.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidLesson` if the draft fails validation,
    /// `ContentError::LessonNotFound` if no course holds the lesson, or
    /// `ContentError::Unavailable` if the lock is poisoned.
    pub fn publish_lesson(&self, draft: LessonDraft) -> Result<(), ContentError> {
        let lesson = draft.validate()?;
        let mut guard = self
            .courses
            .lock()
            .map_err(|_| ContentError::Unavailable("content lock poisoned".into()))?;
        let Some(course) = guard
            .iter_mut()
            .find(|course| course.lesson(lesson.id()).is_some())
        else {
            return Err(ContentError::LessonNotFound(lesson.id().clone()));
        };
        course.replace_lesson(lesson);
        Ok(())
    }
}

#[async_trait]
impl ContentSource for InMemoryContent {
    async fn list_courses(&self) -> Result<Vec<Course>, ContentError> {
        let guard = self
            .courses
            .lock()
            .map_err(|_| ContentError::Unavailable("content lock poisoned".into()))?;
        Ok(guard.clone())
    }

    async fn fetch_lesson(&self, id: &LessonId) -> Result<Lesson, ContentError> {
        let guard = self
            .courses
            .lock()
            .map_err(|_| ContentError::Unavailable("content lock poisoned".into()))?;
        guard
            .iter()
            .find_map(|course| course.lesson(id))
            .cloned()
            .ok_or_else(|| ContentError::LessonNotFound(id.clone()))
    }
}

//
// ─── REFRESH ORDERING ──────────────────────────────────────────────────────────
//

/// Issued before a fetch starts; orders overlapping refreshes of one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    lesson: LessonId,
    seq: u64,
}

impl RefreshTicket {
    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { fetched_at: DateTime<Utc> },
    /// A newer refresh already landed; the fetched lesson was discarded.
    Stale,
}

pub struct LessonRefresher {
    clock: Clock,
    next_seq: AtomicU64,
    applied: Mutex<HashMap<LessonId, u64>>,
}

impl LessonRefresher {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            next_seq: AtomicU64::new(1),
            applied: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn begin(&self, lesson: &LessonId) -> RefreshTicket {
        RefreshTicket {
            lesson: lesson.clone(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Apply a fetched lesson unless a newer ticket for it was already applied.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Unavailable` if the ordering lock is poisoned, or
    /// `ContentError::LessonNotFound` if the catalog has no slot for the lesson.
    pub fn complete(
        &self,
        ticket: &RefreshTicket,
        lesson: Lesson,
        catalog: &mut CourseCatalog,
    ) -> Result<RefreshOutcome, ContentError> {
        let mut applied = self
            .applied
            .lock()
            .map_err(|_| ContentError::Unavailable("refresh lock poisoned".into()))?;

        if applied
            .get(&ticket.lesson)
            .is_some_and(|&last| last >= ticket.seq)
        {
            tracing::debug!(lesson = %ticket.lesson, seq = ticket.seq, "discarding stale refresh");
            return Ok(RefreshOutcome::Stale);
        }

        if !catalog.replace_lesson(lesson) {
            return Err(ContentError::LessonNotFound(ticket.lesson.clone()));
        }
        applied.insert(ticket.lesson.clone(), ticket.seq);

        let fetched_at = self.clock.now();
        tracing::debug!(lesson = %ticket.lesson, seq = ticket.seq, %fetched_at, "lesson refreshed");
        Ok(RefreshOutcome::Applied { fetched_at })
    }

    /// Fetch `id` from `source` and apply it in ticket order.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the fetch or the apply step fails.
    pub async fn refresh(
        &self,
        source: &dyn ContentSource,
        id: &LessonId,
        catalog: &mut CourseCatalog,
    ) -> Result<RefreshOutcome, ContentError> {
        let ticket = self.begin(id);
        let lesson = source.fetch_lesson(id).await?;
        self.complete(&ticket, lesson, catalog)
    }
}
