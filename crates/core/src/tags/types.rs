#![forbid(unsafe_code)]

use crate::ids::TagId;
use serde::{Deserialize, Serialize};

/// Canonical tag entity as held by a [`TagRepository`](super::TagRepository).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub usage_count: u64,
    pub last_used_at_ms: Option<i64>,
    pub created_at_ms: i64,
}

/// Outcome of resolving one candidate string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTag {
    pub id: TagId,
    pub name: String,
    pub is_new: bool,
}

impl ResolvedTag {
    pub fn matched(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            is_new: false,
        }
    }

    pub fn created(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            is_new: true,
        }
    }
}
