//! Shared error types for the services crate.

use thiserror::Error;

use academy_core::model::{CourseError, CourseId, LessonError, LessonId};
use academy_core::tracker::TrackerError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `LessonTracker`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonTrackerError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `UserProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Lookup failures in the course catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("lesson {0} not found")]
    LessonNotFound(LessonId),
}

/// Errors emitted by content sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("lesson {0} not found")]
    LessonNotFound(LessonId),
    #[error(transparent)]
    Invalid(#[from] CourseError),
    #[error(transparent)]
    InvalidLesson(#[from] LessonError),
    #[error("content source unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted while bootstrapping or driving app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Tracker(#[from] LessonTrackerError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
}
