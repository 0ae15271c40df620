use academy_core::model::{Course, CourseId, Lesson, LessonId, UserProgress};

use crate::error::CatalogError;

/// Whether a learner may open a lesson right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonAccess {
    ComingSoon,
    Completed,
    Available,
    Locked,
}

impl LessonAccess {
    #[must_use]
    pub fn can_open(self) -> bool {
        matches!(self, Self::Completed | Self::Available)
    }
}

/// Loaded courses in display order.
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    courses: Vec<Course>,
}

impl CourseCatalog {
    #[must_use]
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id() == id)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` if no course has this id.
    pub fn require_course(&self, id: &CourseId) -> Result<&Course, CatalogError> {
        self.course(id)
            .ok_or_else(|| CatalogError::CourseNotFound(id.clone()))
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.courses.iter().find_map(|c| c.lesson(id))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::LessonNotFound` if no course contains this lesson.
    pub fn require_lesson(&self, id: &LessonId) -> Result<&Lesson, CatalogError> {
        self.lesson(id)
            .ok_or_else(|| CatalogError::LessonNotFound(id.clone()))
    }

    #[must_use]
    pub fn course_for_lesson(&self, id: &LessonId) -> Option<&Course> {
        self.courses.iter().find(|c| c.lesson(id).is_some())
    }

    /// The lesson recorded as current, if it still exists.
    #[must_use]
    pub fn current_lesson(&self, progress: &UserProgress) -> Option<&Lesson> {
        progress
            .current_lesson_id
            .as_ref()
            .and_then(|id| self.lesson(id))
    }

    /// Clone the courses with each lesson's `completed` flag taken from `progress`.
    #[must_use]
    pub fn with_progress(&self, progress: &UserProgress) -> Vec<Course> {
        let mut courses = self.courses.clone();
        for course in &mut courses {
            for lesson in course.lessons_mut() {
                let done = progress.is_lesson_completed(lesson.id());
                lesson.set_completed(done);
            }
        }
        courses
    }

    /// Gate a lesson on its predecessor within the same course.
    #[must_use]
    pub fn lesson_access(&self, id: &LessonId, progress: &UserProgress) -> Option<LessonAccess> {
        let course = self.course_for_lesson(id)?;
        let position = course.lesson_position(id)?;
        let lesson = &course.lessons()[position];

        let access = if lesson.is_coming_soon() {
            LessonAccess::ComingSoon
        } else if progress.is_lesson_completed(id) {
            LessonAccess::Completed
        } else if position == 0 {
            LessonAccess::Available
        } else {
            let before = course.lessons()[position - 1].id();
            if progress.is_lesson_completed(before) {
                LessonAccess::Available
            } else {
                LessonAccess::Locked
            }
        };
        Some(access)
    }

    /// Swap in a refreshed lesson. Returns false if no course holds its id.
    pub fn replace_lesson(&mut self, lesson: Lesson) -> bool {
        let Some(course) = self
            .courses
            .iter_mut()
            .find(|c| c.lesson(lesson.id()).is_some())
        else {
            return false;
        };
        course.replace_lesson(lesson)
    }
}
