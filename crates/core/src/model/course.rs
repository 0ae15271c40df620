use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, LessonId};
use crate::model::lesson::{Lesson, LessonDraft, LessonError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course id cannot be blank")]
    BlankId,

    #[error("course {course} lists lesson {lesson} twice")]
    DuplicateLesson { course: CourseId, lesson: LessonId },

    #[error("course {course}: invalid resource URL {raw}")]
    InvalidResourceUrl { course: CourseId, raw: String },

    #[error("course {course}: {source}")]
    Lesson {
        course: CourseId,
        #[source]
        source: LessonError,
    },
}

//
// ─── METADATA ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDraft {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub title: String,
    pub url: Url,
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub lessons: Vec<LessonDraft>,
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
    #[serde(default)]
    pub resources: Vec<ResourceDraft>,
}

impl CourseDraft {
    /// Validate the course, its lessons and resource URLs, and normalize the image path.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if any part of the course is invalid.
    pub fn validate(self) -> Result<Course, CourseError> {
        if self.id.as_str().trim().is_empty() {
            return Err(CourseError::BlankId);
        }

        let image = normalize_image_path(&self.id, self.image);

        let mut resources = Vec::with_capacity(self.resources.len());
        for resource in self.resources {
            let url = Url::parse(&resource.url).map_err(|_| CourseError::InvalidResourceUrl {
                course: self.id.clone(),
                raw: resource.url.clone(),
            })?;
            resources.push(Resource {
                title: resource.title,
                url,
            });
        }

        let mut seen = HashSet::new();
        let mut lessons = Vec::with_capacity(self.lessons.len());
        for draft in self.lessons {
            if !seen.insert(draft.id.clone()) {
                return Err(CourseError::DuplicateLesson {
                    course: self.id,
                    lesson: draft.id,
                });
            }
            let lesson = draft.validate().map_err(|source| CourseError::Lesson {
                course: self.id.clone(),
                source,
            })?;
            lessons.push(lesson);
        }

        Ok(Course {
            id: self.id,
            title: self.title,
            description: self.description,
            image,
            difficulty: self.difficulty,
            lessons,
            prerequisites: self.prerequisites,
            resources,
        })
    }
}

fn normalize_image_path(id: &CourseId, image: Option<String>) -> String {
    let path = image
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| format!("/images/courses/{id}.jpg"));
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

#[derive(Debug, Clone)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    image: String,
    difficulty: Option<String>,
    lessons: Vec<Lesson>,
    prerequisites: Vec<Prerequisite>,
    resources: Vec<Resource>,
}

impl Course {
    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<&str> {
        self.difficulty.as_deref()
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn lessons_mut(&mut self) -> &mut [Lesson] {
        &mut self.lessons
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id() == id)
    }

    #[must_use]
    pub fn lesson_position(&self, id: &LessonId) -> Option<usize> {
        self.lessons.iter().position(|lesson| lesson.id() == id)
    }

    #[must_use]
    pub fn prerequisites(&self) -> &[Prerequisite] {
        &self.prerequisites
    }

    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Replace a lesson in place. Returns false if the course does not contain it.
    pub fn replace_lesson(&mut self, lesson: Lesson) -> bool {
        match self.lesson_position(lesson.id()) {
            Some(pos) => {
                self.lessons[pos] = lesson;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::step::StepDraft;

    fn draft() -> CourseDraft {
        CourseDraft {
            id: CourseId::new("passport"),
            title: "Passport".into(),
            description: String::new(),
            image: None,
            difficulty: None,
            lessons: vec![LessonDraft {
                id: LessonId::new("passport-01"),
                title: "Setup".into(),
                description: String::new(),
                difficulty: None,
                time_to_complete: None,
                coming_soon: false,
                steps: vec![StepDraft::content_only("01", "Intro")],
            }],
            prerequisites: Vec::new(),
            resources: Vec::new(),
        }
    }

    #[test]
    fn default_image_path() {
        let course = draft().validate().unwrap();
        assert_eq!(course.image(), "/images/courses/passport.jpg");
    }

    #[test]
    fn image_gets_leading_slash() {
        let mut d = draft();
        d.image = Some("images/hero.png".into());
        assert_eq!(d.validate().unwrap().image(), "/images/hero.png");
    }

    #[test]
    fn invalid_resource_url_is_rejected() {
        let mut d = draft();
        d.resources.push(ResourceDraft {
            title: "Docs".into(),
            url: "not a url".into(),
        });
        assert!(matches!(
            d.validate().unwrap_err(),
            CourseError::InvalidResourceUrl { .. }
        ));
    }

    #[test]
    fn lesson_errors_are_wrapped() {
        let mut d = draft();
        d.lessons[0].steps.clear();
        assert!(matches!(d.validate().unwrap_err(), CourseError::Lesson { .. }));
    }
}
