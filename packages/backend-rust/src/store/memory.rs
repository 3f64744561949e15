use std::collections::HashMap;

use parking_lot::RwLock;

use super::{
    LectureCatalog, LectureInfo, PreferenceStore, ReviewRecord, ReviewStore, StoreError,
};

#[derive(Debug, Default)]
pub struct MemoryReviewStore {
    records: RwLock<HashMap<(String, String), ReviewRecord>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ReviewStore for MemoryReviewStore {
    fn find(&self, user_id: &str, lecture_id: &str) -> Result<Option<ReviewRecord>, StoreError> {
        let key = (user_id.to_string(), lecture_id.to_string());
        Ok(self.records.read().get(&key).cloned())
    }

    fn upsert(&self, mut record: ReviewRecord) -> Result<ReviewRecord, StoreError> {
        let key = (record.user_id.clone(), record.lecture_id.clone());
        let mut guard = self.records.write();
        if let Some(existing) = guard.get(&key) {
            record.id = existing.id;
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    fn update_with(
        &self,
        user_id: &str,
        lecture_id: &str,
        update: &mut dyn FnMut(Option<&ReviewRecord>) -> Option<ReviewRecord>,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        let key = (user_id.to_string(), lecture_id.to_string());
        let mut guard = self.records.write();
        let existing_id = guard.get(&key).map(|r| r.id);
        let Some(mut record) = update(guard.get(&key)) else {
            return Ok(None);
        };
        if let Some(id) = existing_id {
            record.id = id;
        }
        guard.insert(key, record.clone());
        Ok(Some(record))
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    preferences: RwLock<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user_id: impl Into<String>, time_of_day: impl Into<String>) {
        self.preferences.write().insert(user_id.into(), time_of_day.into());
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn time_of_day(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.preferences.read().get(user_id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct MemoryLectureCatalog {
    lectures: RwLock<HashMap<String, LectureInfo>>,
}

impl MemoryLectureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, lecture_id: impl Into<String>, info: LectureInfo) {
        self.lectures.write().insert(lecture_id.into(), info);
    }
}

impl LectureCatalog for MemoryLectureCatalog {
    fn lecture(&self, lecture_id: &str) -> Result<Option<LectureInfo>, StoreError> {
        Ok(self.lectures.read().get(lecture_id).cloned())
    }
}
