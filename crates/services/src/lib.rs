#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod content;
pub mod error;
pub mod lesson_tracker;
pub mod progress_service;

pub use academy_core::Clock;

pub use app_services::AppServices;
pub use catalog::{CourseCatalog, LessonAccess};
pub use content::{ContentSource, InMemoryContent, LessonRefresher, RefreshOutcome, RefreshTicket};
pub use error::{
    AppServicesError, CatalogError, ContentError, LessonTrackerError, ProgressServiceError,
};
pub use lesson_tracker::LessonTracker;
pub use progress_service::UserProgressService;
