#![forbid(unsafe_code)]

use tbr_core::ids::TagId;
use tbr_core::time::now_ms;

/// What a set of tags is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagTarget {
    /// Global tags shared by every reader of the book.
    Book { book_id: i64 },
    /// One user's personal tags on a book in their list.
    ListEntry { user_id: i64, book_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateTagRequest {
    pub name: String,
    pub created_at_ms: i64,
}

impl CreateTagRequest {
    pub fn now(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at_ms: now_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveTagsRequest {
    pub candidates: Vec<String>,
    pub at_ms: i64,
}

impl ResolveTagsRequest {
    pub fn now<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
            at_ms: now_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordUsageRequest {
    pub tag_ids: Vec<TagId>,
    pub at_ms: i64,
}

impl RecordUsageRequest {
    /// Usage stamped with the current time.
    pub fn now(tag_ids: impl Into<Vec<TagId>>) -> Self {
        Self {
            tag_ids: tag_ids.into(),
            at_ms: now_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachTagsRequest {
    pub target: TagTarget,
    pub candidates: Vec<String>,
    pub at_ms: i64,
}

impl AttachTagsRequest {
    pub fn now<I, S>(target: TagTarget, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target,
            candidates: candidates.into_iter().map(Into::into).collect(),
            at_ms: now_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachTagsResult {
    pub tags: Vec<tbr_core::ResolvedTag>,
    /// Tags newly associated with the target by this call; only these had
    /// their usage recorded.
    pub attached: Vec<TagId>,
}
