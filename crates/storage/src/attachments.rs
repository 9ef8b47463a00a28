#![forbid(unsafe_code)]

use crate::tags::SqliteTags;
use crate::{
    AttachTagsRequest, AttachTagsResult, SqliteStore, StoreError, TagTarget, write_tx,
};
use rusqlite::{Connection, params};
use tbr_core::ids::TagId;
use tbr_core::{Tag, TagAnalytics, TagResolver};

impl SqliteStore {
    /// Resolves the candidates, links every resolved tag to `target` and
    /// records usage for the links this call created. One transaction.
    pub fn attach_tags(
        &mut self,
        request: AttachTagsRequest,
    ) -> Result<AttachTagsResult, StoreError> {
        let tx = write_tx(&mut self.conn)?;

        let tags = TagResolver::new(SqliteTags::new(&tx), self.config.matching)
            .resolve(&request.candidates, request.at_ms)?;

        let mut attached = Vec::new();
        for tag in &tags {
            if insert_attachment(&tx, request.target, tag.id, request.at_ms)? {
                attached.push(tag.id);
            }
        }

        TagAnalytics::new(SqliteTags::new(&tx), &self.config.categories)
            .record_usage(&attached, request.at_ms)?;
        tx.commit()?;

        tracing::debug!(
            tag_target = ?request.target,
            resolved = tags.len(),
            attached = attached.len(),
            "tags attached"
        );
        Ok(AttachTagsResult { tags, attached })
    }

    /// Tags linked to `target`, oldest link first.
    pub fn target_tags(&self, target: TagTarget) -> Result<Vec<Tag>, StoreError> {
        let ids = match target {
            TagTarget::Book { book_id } => collect_ids(
                &self.conn,
                "SELECT tag_id FROM book_tags WHERE book_id=?1 \
                 ORDER BY attached_at_ms ASC, tag_id ASC",
                params![book_id],
            )?,
            TagTarget::ListEntry { user_id, book_id } => collect_ids(
                &self.conn,
                "SELECT tag_id FROM list_entry_tags WHERE user_id=?1 AND book_id=?2 \
                 ORDER BY attached_at_ms ASC, tag_id ASC",
                params![user_id, book_id],
            )?,
        };

        let tags = SqliteTags::new(&self.conn);
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let tag = tags.get(id)?.ok_or(StoreError::UnknownTag(id))?;
            out.push(tag);
        }
        Ok(out)
    }
}

/// Returns whether a new link was created; an existing link is left as is.
fn insert_attachment(
    conn: &Connection,
    target: TagTarget,
    tag_id: TagId,
    at_ms: i64,
) -> Result<bool, StoreError> {
    let inserted = match target {
        TagTarget::Book { book_id } => conn.execute(
            "INSERT OR IGNORE INTO book_tags(book_id, tag_id, attached_at_ms) VALUES (?1, ?2, ?3)",
            params![book_id, tag_id.get(), at_ms],
        )?,
        TagTarget::ListEntry { user_id, book_id } => conn.execute(
            "INSERT OR IGNORE INTO list_entry_tags(user_id, book_id, tag_id, attached_at_ms) \
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, book_id, tag_id.get(), at_ms],
        )?,
    };
    Ok(inserted > 0)
}

fn collect_ids(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<TagId>, StoreError> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, |row| row.get::<_, i64>(0))?;
    let mut out = Vec::new();
    for id in rows {
        out.push(TagId::new(id?));
    }
    Ok(out)
}
