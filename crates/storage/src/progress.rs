//! JSON records for lesson and user progress on top of a [`KeyValueStore`].
//!
//! Reads never fail: a missing, unreadable or malformed record decodes to its
//! default and is logged. Writes propagate storage errors to the caller.

use std::sync::Arc;

use academy_core::model::{LessonId, LessonProgress, UserProgress};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::keys::{LessonKeys, USER_PROGRESS_KEY};
use crate::repository::{KeyValueStore, StorageError};

#[derive(Clone)]
pub struct ProgressRepository {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressRepository {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load every per-lesson record, defaulting any that is absent or corrupt.
    pub async fn load_lesson(&self, lesson: &LessonId) -> LessonProgress {
        let keys = LessonKeys::new(lesson);
        LessonProgress {
            step_index: self.read_step_index(&keys.step_index).await,
            code_by_step: self.read_json(&keys.code).await,
            step_completed: self.read_json(&keys.completed).await,
            checklist_items: self.read_json(&keys.checklists).await,
            input_values: self.read_json(&keys.input_values).await,
        }
    }

    /// Write all five records for a lesson.
    ///
    /// # Errors
    ///
    /// Returns the first `StorageError`; records written before it stay written.
    pub async fn save_lesson(
        &self,
        lesson: &LessonId,
        progress: &LessonProgress,
    ) -> Result<(), StorageError> {
        self.save_step_index(lesson, progress).await?;
        self.save_code(lesson, progress).await?;
        self.save_completed(lesson, progress).await?;
        self.save_checklists(lesson, progress).await?;
        self.save_input_values(lesson, progress).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_step_index(
        &self,
        lesson: &LessonId,
        progress: &LessonProgress,
    ) -> Result<(), StorageError> {
        let keys = LessonKeys::new(lesson);
        self.kv
            .set(&keys.step_index, &progress.step_index.to_string())
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save_code(
        &self,
        lesson: &LessonId,
        progress: &LessonProgress,
    ) -> Result<(), StorageError> {
        self.write_json(&LessonKeys::new(lesson).code, &progress.code_by_step)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save_completed(
        &self,
        lesson: &LessonId,
        progress: &LessonProgress,
    ) -> Result<(), StorageError> {
        self.write_json(&LessonKeys::new(lesson).completed, &progress.step_completed)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save_checklists(
        &self,
        lesson: &LessonId,
        progress: &LessonProgress,
    ) -> Result<(), StorageError> {
        self.write_json(&LessonKeys::new(lesson).checklists, &progress.checklist_items)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save_input_values(
        &self,
        lesson: &LessonId,
        progress: &LessonProgress,
    ) -> Result<(), StorageError> {
        self.write_json(&LessonKeys::new(lesson).input_values, &progress.input_values)
            .await
    }

    /// Remove exactly the five records of a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a removal fails.
    pub async fn clear_lesson(&self, lesson: &LessonId) -> Result<(), StorageError> {
        self.kv.remove_many(&LessonKeys::new(lesson).all()).await
    }

    pub async fn load_user_progress(&self) -> UserProgress {
        self.read_json(USER_PROGRESS_KEY).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save_user_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        self.write_json(USER_PROGRESS_KEY, progress).await
    }

    async fn read_raw(&self, key: &str) -> Option<String> {
        match self.kv.get(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "progress record unreadable; using defaults");
                None
            }
        }
    }

    async fn read_step_index(&self, key: &str) -> usize {
        let Some(raw) = self.read_raw(key).await else {
            return 0;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, raw = %raw, "malformed step index; starting at 0");
            0
        })
    }

    async fn read_json<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.read_raw(key).await else {
            return T::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(key, error = %err, "malformed progress record; using defaults");
            T::default()
        })
    }

    async fn write_json<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Sync,
    {
        let encoded =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(key, &encoded).await
    }
}
