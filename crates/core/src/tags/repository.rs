#![forbid(unsafe_code)]

use super::types::Tag;
use crate::ids::TagId;

/// Result of asking a store to create a tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(Tag),
    /// A tag with the same normalized name already exists, typically
    /// because another writer created it after our snapshot was taken.
    Existing(Tag),
}

impl InsertOutcome {
    pub fn tag(&self) -> &Tag {
        match self {
            Self::Created(tag) | Self::Existing(tag) => tag,
        }
    }
}

/// The persistence surface the tag subsystem needs: create, scan and
/// increment-style update over a tag collection.
///
/// Implementations must keep `normalized_name` unique and report a clash as
/// [`InsertOutcome::Existing`] instead of an error.
pub trait TagRepository {
    type Error;

    /// Every known tag in a stable order (creation order for the bundled
    /// stores).
    fn list_tags(&self) -> Result<Vec<Tag>, Self::Error>;

    fn insert_tag(
        &mut self,
        name: &str,
        normalized_name: &str,
        created_at_ms: i64,
    ) -> Result<InsertOutcome, Self::Error>;

    /// `usage_count += 1` and `last_used_at_ms = at_ms` for every id,
    /// repeated ids included.
    fn record_usage(&mut self, ids: &[TagId], at_ms: i64) -> Result<(), Self::Error>;
}

impl<R: TagRepository + ?Sized> TagRepository for &mut R {
    type Error = R::Error;

    fn list_tags(&self) -> Result<Vec<Tag>, Self::Error> {
        (**self).list_tags()
    }

    fn insert_tag(
        &mut self,
        name: &str,
        normalized_name: &str,
        created_at_ms: i64,
    ) -> Result<InsertOutcome, Self::Error> {
        (**self).insert_tag(name, normalized_name, created_at_ms)
    }

    fn record_usage(&mut self, ids: &[TagId], at_ms: i64) -> Result<(), Self::Error> {
        (**self).record_usage(ids, at_ms)
    }
}
