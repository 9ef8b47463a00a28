#![forbid(unsafe_code)]

use rusqlite::{Connection, params};
use tbr_storage::{AttachTagsRequest, ResolveTagsRequest, SqliteStore, StoreError, TagTarget};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("tbr_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn fail_inserts_named(store: &SqliteStore, normalized_name: &str) {
    let conn = Connection::open(store.db_path()).expect("open db");
    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_insert BEFORE INSERT ON tags \
         WHEN NEW.normalized_name = '{normalized_name}' \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
    ))
    .expect("install trigger");
}

#[test]
fn resolve_rolls_back_tags_created_before_a_failure() {
    let storage_dir = temp_dir("resolve_rolls_back_tags_created_before_a_failure");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    fail_inserts_named(&store, "heist");

    let err = store
        .resolve_tags(ResolveTagsRequest {
            candidates: vec!["gothic".to_string(), "Heist".to_string()],
            at_ms: 1,
        })
        .expect_err("injected failure");
    assert!(matches!(err, StoreError::Sql(_)), "got {err:?}");
    assert!(
        store.list_tags().expect("list").is_empty(),
        "expected atomic rollback"
    );
}

#[test]
fn attach_rolls_back_links_and_usage_on_failure() {
    let storage_dir = temp_dir("attach_rolls_back_links_and_usage_on_failure");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let book = TagTarget::Book { book_id: 3 };
    store
        .attach_tags(AttachTagsRequest {
            target: book,
            candidates: vec!["gothic".to_string()],
            at_ms: 1,
        })
        .expect("seed");
    fail_inserts_named(&store, "heist");

    store
        .attach_tags(AttachTagsRequest {
            target: TagTarget::Book { book_id: 4 },
            candidates: vec!["Gothic".to_string(), "heist".to_string()],
            at_ms: 2,
        })
        .expect_err("injected failure");

    let tags = store.list_tags().expect("list");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].usage_count, 1);
    assert!(store
        .target_tags(TagTarget::Book { book_id: 4 })
        .expect("book tags")
        .is_empty());
}

#[test]
fn uncommitted_transaction_is_not_persisted_after_reopen() {
    let storage_dir = temp_dir("uncommitted_transaction_is_not_persisted_after_reopen");
    let db_path = {
        let store = SqliteStore::open(&storage_dir).expect("open store");
        store.db_path()
    };

    {
        let mut conn = Connection::open(&db_path).expect("open db");
        let tx = conn.transaction().expect("begin tx");
        tx.execute(
            "INSERT INTO tags (name, normalized_name, usage_count, created_at_ms) VALUES (?1, ?2, 0, ?3)",
            params!["Slow Burn", "slow burn", 0i64],
        )
        .expect("insert tag");
        // Drop without commit -> rollback (simulated crash before commit).
    }

    let store = SqliteStore::open(&storage_dir).expect("open store again");
    assert!(
        store.find_tag("slow burn").expect("find").is_none(),
        "uncommitted transaction should not persist"
    );
}

#[test]
fn tag_deleted_during_insert_is_reported_not_masked() {
    let storage_dir = temp_dir("tag_deleted_during_insert_is_reported_not_masked");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let conn = Connection::open(store.db_path()).expect("open db");
    conn.execute_batch(
        "CREATE TRIGGER drop_ghost AFTER INSERT ON tags \
         WHEN NEW.normalized_name = 'ghost' \
         BEGIN DELETE FROM tags WHERE id = NEW.id; END;",
    )
    .expect("install trigger");

    let err = store
        .resolve_tags(ResolveTagsRequest {
            candidates: vec!["Ghost".to_string()],
            at_ms: 1,
        })
        .expect_err("row vanished");
    assert!(
        matches!(&err, StoreError::MissingAfterInsert { normalized_name } if normalized_name == "ghost"),
        "got {err:?}"
    );
}

#[test]
fn corrupt_usage_count_is_a_read_error() {
    let storage_dir = temp_dir("corrupt_usage_count_is_a_read_error");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    store
        .resolve_tags(ResolveTagsRequest {
            candidates: vec!["gothic".to_string()],
            at_ms: 1,
        })
        .expect("seed");
    let conn = Connection::open(store.db_path()).expect("open db");
    conn.execute("UPDATE tags SET usage_count = -1", params![])
        .expect("corrupt");

    let err = store.list_tags().expect_err("negative usage");
    assert!(
        matches!(err, StoreError::Sql(rusqlite::Error::IntegralValueOutOfRange(2, -1))),
        "got {err:?}"
    );
}
