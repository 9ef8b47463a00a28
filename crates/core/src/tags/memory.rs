#![forbid(unsafe_code)]

use super::repository::{InsertOutcome, TagRepository};
use super::types::Tag;
use crate::ids::TagId;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("unknown tag id {0}")]
    UnknownTag(TagId),
}

/// Process-local tag repository. Ids start at 1 and follow creation order.
#[derive(Clone, Debug, Default)]
pub struct MemoryTagStore {
    tags: Vec<Tag>,
    by_normalized: HashMap<String, usize>,
    next_id: i64,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Runs `f` against the store and restores the previous contents if it
    /// fails, so a batch either fully applies or leaves no trace.
    pub fn atomically<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }
}

impl TagRepository for MemoryTagStore {
    type Error = MemoryStoreError;

    fn list_tags(&self) -> Result<Vec<Tag>, Self::Error> {
        Ok(self.tags.clone())
    }

    fn insert_tag(
        &mut self,
        name: &str,
        normalized_name: &str,
        created_at_ms: i64,
    ) -> Result<InsertOutcome, Self::Error> {
        if let Some(&index) = self.by_normalized.get(normalized_name) {
            return Ok(InsertOutcome::Existing(self.tags[index].clone()));
        }
        self.next_id += 1;
        let tag = Tag {
            id: TagId::new(self.next_id),
            name: name.to_string(),
            usage_count: 0,
            last_used_at_ms: None,
            created_at_ms,
        };
        self.by_normalized
            .insert(normalized_name.to_string(), self.tags.len());
        self.tags.push(tag.clone());
        Ok(InsertOutcome::Created(tag))
    }

    fn record_usage(&mut self, ids: &[TagId], at_ms: i64) -> Result<(), Self::Error> {
        if let Some(missing) = ids.iter().find(|id| self.get(**id).is_none()) {
            return Err(MemoryStoreError::UnknownTag(*missing));
        }
        for id in ids {
            if let Some(tag) = self.tags.iter_mut().find(|tag| tag.id == *id) {
                tag.usage_count = tag.usage_count.saturating_add(1);
                tag.last_used_at_ms = Some(at_ms);
            }
        }
        Ok(())
    }
}
