#![forbid(unsafe_code)]

use crate::{
    CreateTagRequest, RecordUsageRequest, ResolveTagsRequest, SqliteStore, StoreError, write_tx,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tbr_core::ids::TagId;
use tbr_core::{
    CategorizedTags, InsertOutcome, ResolvedTag, Tag, TagAnalytics, TagRepository, TagResolver,
    normalize_tag,
};

const TAG_COLUMNS: &str = "id, name, usage_count, last_used_at_ms, created_at_ms";

/// [`TagRepository`] over a borrowed connection. Built on a transaction it
/// makes everything the resolver does commit or roll back together.
#[derive(Debug)]
pub struct SqliteTags<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteTags<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, id: TagId) -> Result<Option<Tag>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {TAG_COLUMNS} FROM tags WHERE id=?1"),
                params![id.get()],
                tag_from_row,
            )
            .optional()?)
    }

    pub fn get_by_normalized(&self, normalized_name: &str) -> Result<Option<Tag>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {TAG_COLUMNS} FROM tags WHERE normalized_name=?1"),
                params![normalized_name],
                tag_from_row,
            )
            .optional()?)
    }
}

impl TagRepository for SqliteTags<'_> {
    type Error = StoreError;

    fn list_tags(&self) -> Result<Vec<Tag>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY id ASC"))?;
        let rows = stmt.query_map([], tag_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn insert_tag(
        &mut self,
        name: &str,
        normalized_name: &str,
        created_at_ms: i64,
    ) -> Result<InsertOutcome, Self::Error> {
        let inserted = self.conn.execute(
            "INSERT INTO tags(name, normalized_name, usage_count, last_used_at_ms, created_at_ms) \
             VALUES (?1, ?2, 0, NULL, ?3) \
             ON CONFLICT(normalized_name) DO NOTHING",
            params![name, normalized_name, created_at_ms],
        )?;
        let tag = self
            .get_by_normalized(normalized_name)?
            .ok_or_else(|| StoreError::MissingAfterInsert {
                normalized_name: normalized_name.to_string(),
            })?;
        if inserted == 0 {
            Ok(InsertOutcome::Existing(tag))
        } else {
            Ok(InsertOutcome::Created(tag))
        }
    }

    fn record_usage(&mut self, ids: &[TagId], at_ms: i64) -> Result<(), Self::Error> {
        let mut stmt = self.conn.prepare_cached(
            "UPDATE tags SET usage_count = usage_count + 1, last_used_at_ms = ?2 WHERE id = ?1",
        )?;
        for id in ids {
            if stmt.execute(params![id.get(), at_ms])? == 0 {
                return Err(StoreError::UnknownTag(*id));
            }
        }
        Ok(())
    }
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    let usage_count: i64 = row.get(2)?;
    let usage_count = u64::try_from(usage_count)
        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(2, usage_count))?;
    Ok(Tag {
        id: TagId::new(row.get(0)?),
        name: row.get(1)?,
        usage_count,
        last_used_at_ms: row.get(3)?,
        created_at_ms: row.get(4)?,
    })
}

impl SqliteStore {
    pub fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        SqliteTags::new(&self.conn).list_tags()
    }

    pub fn get_tag(&self, id: TagId) -> Result<Option<Tag>, StoreError> {
        SqliteTags::new(&self.conn).get(id)
    }

    /// Exact-tier lookup: the tag whose normalized name equals `name`'s.
    pub fn find_tag(&self, name: &str) -> Result<Option<Tag>, StoreError> {
        SqliteTags::new(&self.conn).get_by_normalized(&normalize_tag(name))
    }

    /// Creates a tag without fuzzy matching. A tag that already normalizes
    /// to the same name is returned as [`InsertOutcome::Existing`].
    pub fn create_tag(&mut self, request: CreateTagRequest) -> Result<InsertOutcome, StoreError> {
        let normalized = normalize_tag(&request.name);
        if normalized.is_empty() {
            return Err(StoreError::InvalidInput("tag name must not be blank"));
        }
        let tx = write_tx(&mut self.conn)?;
        let outcome = SqliteTags::new(&tx).insert_tag(
            &request.name,
            &normalized,
            request.created_at_ms,
        )?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Resolves a batch of candidates in one transaction: either every
    /// created tag is committed or none is.
    pub fn resolve_tags(
        &mut self,
        request: ResolveTagsRequest,
    ) -> Result<Vec<ResolvedTag>, StoreError> {
        let tx = write_tx(&mut self.conn)?;
        let resolved = TagResolver::new(SqliteTags::new(&tx), self.config.matching)
            .resolve(&request.candidates, request.at_ms)?;
        tx.commit()?;
        Ok(resolved)
    }

    /// Bumps usage for every id; unknown ids fail the whole call.
    pub fn record_usage(&mut self, request: RecordUsageRequest) -> Result<(), StoreError> {
        let tx = write_tx(&mut self.conn)?;
        TagAnalytics::new(SqliteTags::new(&tx), &self.config.categories)
            .record_usage(&request.tag_ids, request.at_ms)?;
        tx.commit()?;
        Ok(())
    }

    pub fn popular_by_category(&self, limit: usize) -> Result<CategorizedTags, StoreError> {
        TagAnalytics::new(SqliteTags::new(&self.conn), &self.config.categories)
            .popular_by_category(limit)
    }

    /// Popularity view with the configured per-category limit.
    pub fn popular_tags(&self) -> Result<CategorizedTags, StoreError> {
        self.popular_by_category(self.config.popular_limit)
    }
}
