// tag_store.rs - Named canned responses backed by a single JSON file
// Every call re-reads the file; mutations rewrite it under a per-store lock

use crate::error::StoreResult;
use crate::storage::{ensure_file, read_json, write_json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub content: String,
    #[serde(rename = "owner")]
    pub owner_name: String,
    #[serde(rename = "ownerId")]
    pub owner_id: u64,
    /// Seconds since the Unix epoch, UTC
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Tag {
    fn matches(&self, normalized: &str) -> bool {
        self.name.to_lowercase() == normalized
    }
}

pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct TagStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create the store, seeding an empty `[]` file if none exists.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self::new(path);
        ensure_file(&store.path, &Vec::<Tag>::new()).await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<Vec<Tag>> {
        read_json(&self.path).await
    }

    async fn store(&self, tags: &[Tag]) -> StoreResult<()> {
        write_json(&self.path, tags).await
    }

    pub async fn get_content_by_name(&self, name: &str) -> StoreResult<Option<String>> {
        let name = normalize(name);
        let tags = self.load().await?;
        log::debug!("🔎 Looking up tag '{}' among {} tags", name, tags.len());

        Ok(tags.into_iter().find(|t| t.matches(&name)).map(|t| t.content))
    }

    /// Returns `Ok(false)` without touching the file if a tag with the same name exists.
    pub async fn create(
        &self,
        name: &str,
        content: &str,
        owner_name: &str,
        owner_id: u64,
    ) -> StoreResult<bool> {
        let name = normalize(name);
        let _guard = self.write_lock.lock().await;

        let mut tags = self.load().await?;
        if tags.iter().any(|t| t.matches(&name)) {
            log::debug!("Tag '{}' already exists, not creating", name);
            return Ok(false);
        }

        tags.push(Tag {
            name: name.clone(),
            content: content.to_string(),
            owner_name: owner_name.to_string(),
            owner_id,
            created_at: Utc::now().timestamp(),
        });
        self.store(&tags).await?;

        log::info!("🏷️ Tag '{}' created by {} ({})", name, owner_name, owner_id);
        Ok(true)
    }

    /// Removes every entry with the name. Returns whether anything was removed.
    pub async fn delete_by_name(&self, name: &str) -> StoreResult<bool> {
        let name = normalize(name);
        let _guard = self.write_lock.lock().await;

        let mut tags = self.load().await?;
        let before = tags.len();
        tags.retain(|t| !t.matches(&name));

        if tags.len() == before {
            return Ok(false);
        }

        self.store(&tags).await?;
        log::info!("🗑️ Tag '{}' deleted ({} entries)", name, before - tags.len());
        Ok(true)
    }

    /// Rewrites the content of every entry with the name. Returns whether anything matched.
    pub async fn edit(&self, name: &str, new_content: &str) -> StoreResult<bool> {
        let name = normalize(name);
        let _guard = self.write_lock.lock().await;

        let mut tags = self.load().await?;
        let mut edited = 0;
        for tag in tags.iter_mut().filter(|t| t.matches(&name)) {
            tag.content = new_content.to_string();
            edited += 1;
        }

        if edited == 0 {
            return Ok(false);
        }

        self.store(&tags).await?;
        log::info!("✏️ Tag '{}' edited", name);
        Ok(true)
    }

    /// All entries with the name. More than one only for files written before names were unique.
    pub async fn get_tag(&self, name: &str) -> StoreResult<Vec<Tag>> {
        let name = normalize(name);
        let tags = self.load().await?;
        Ok(tags.into_iter().filter(|t| t.matches(&name)).collect())
    }

    pub async fn get_all(&self) -> StoreResult<Vec<Tag>> {
        self.load().await
    }

    pub async fn exists(&self, name: &str) -> StoreResult<bool> {
        let name = normalize(name);
        let tags = self.load().await?;
        Ok(tags.iter().any(|t| t.matches(&name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn empty_store() -> (TempDir, TagStore) {
        let dir = TempDir::new().unwrap();
        let store = TagStore::open(dir.path().join("tags.json")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn create_then_lookup() {
        let (_dir, store) = empty_store().await;

        assert!(store.create("rules", "Be nice.", "Alice", 1001).await.unwrap());
        assert_eq!(
            store.get_content_by_name("rules").await.unwrap(),
            Some("Be nice.".to_string())
        );
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let (_dir, store) = empty_store().await;

        store.create("Foo", "bar", "Alice", 1001).await.unwrap();
        assert_eq!(
            store.get_content_by_name("fOO").await.unwrap(),
            Some("bar".to_string())
        );
        assert!(store.exists("FOO").await.unwrap());

        let all = store.get_all().await.unwrap();
        assert_eq!(all[0].name, "foo");
    }

    #[tokio::test]
    async fn unknown_tag_is_absent() {
        let (_dir, store) = empty_store().await;
        assert_eq!(store.get_content_by_name("ghost").await.unwrap(), None);
        assert!(!store.exists("ghost").await.unwrap());
        assert!(store.get_tag("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn welcome_lifecycle() {
        let (_dir, store) = empty_store().await;

        store.create("welcome", "Hello!", "Alice", 1001).await.unwrap();
        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "welcome");
        assert_eq!(all[0].owner_name, "Alice");
        assert_eq!(all[0].owner_id, 1001);
        assert!(all[0].created_at > 0);

        assert!(store.delete_by_name("welcome").await.unwrap());
        assert!(store.get_all().await.unwrap().is_empty());
        assert!(!store.exists("welcome").await.unwrap());
    }

    #[tokio::test]
    async fn edit_replaces_content() {
        let (_dir, store) = empty_store().await;

        store.create("faq", "old", "Alice", 1001).await.unwrap();
        assert!(store.edit("FAQ", "new").await.unwrap());
        assert_eq!(
            store.get_content_by_name("faq").await.unwrap(),
            Some("new".to_string())
        );
    }

    #[tokio::test]
    async fn missing_targets_are_noops() {
        let (_dir, store) = empty_store().await;

        assert!(!store.delete_by_name("nothing").await.unwrap());
        assert!(!store.edit("nothing", "x").await.unwrap());
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_is_refused() {
        let (_dir, store) = empty_store().await;

        assert!(store.create("dup", "first", "Alice", 1).await.unwrap());
        assert!(!store.create("DUP", "second", "Bob", 2).await.unwrap());

        let matches = store.get_tag("dup").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].content, "first");
    }

    #[tokio::test]
    async fn legacy_duplicates_are_edited_and_deleted_together() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags.json");
        std::fs::write(
            &path,
            r#"[
                {"name":"dup","content":"a","owner":"A","ownerId":1,"createdAt":10},
                {"name":"dup","content":"b","owner":"B","ownerId":2,"createdAt":20}
            ]"#,
        )
        .unwrap();
        let store = TagStore::open(&path).await.unwrap();

        assert_eq!(store.get_tag("dup").await.unwrap().len(), 2);
        assert_eq!(
            store.get_content_by_name("dup").await.unwrap(),
            Some("a".to_string())
        );

        store.edit("dup", "c").await.unwrap();
        assert!(store
            .get_tag("dup")
            .await
            .unwrap()
            .iter()
            .all(|t| t.content == "c"));

        store.delete_by_name("dup").await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_format_uses_original_field_names() {
        let (_dir, store) = empty_store().await;
        store.create("x", "y", "Alice", 42).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"ownerId\": 42"));
        assert!(raw.contains("\"owner\": \"Alice\""));
        assert!(raw.contains("\"createdAt\""));
        // pretty-printed
        assert!(raw.contains('\n'));
    }

    #[tokio::test]
    async fn missing_and_corrupt_files_surface_as_errors() {
        let dir = TempDir::new().unwrap();
        let missing = TagStore::new(dir.path().join("gone.json"));
        assert!(matches!(
            missing.get_all().await,
            Err(StoreError::NotFound(_))
        ));

        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, r#"{"name": "not a list"}"#).unwrap();
        let corrupt = TagStore::new(&path);
        assert!(matches!(
            corrupt.create("a", "b", "c", 1).await,
            Err(StoreError::CorruptData { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn reads_during_edits_never_see_a_partial_file() {
        let (_dir, store) = empty_store().await;
        let body = "x".repeat(20_000);
        for i in 0..50 {
            store.create(&format!("t{}", i), &body, "Alice", 1).await.unwrap();
        }
        let store = Arc::new(store);

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for i in 0..300 {
                    assert!(store.edit("t0", &format!("{}{}", i, "y".repeat(20_000))).await.unwrap());
                }
            })
        };

        let reader = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut reads = 0;
                loop {
                    match store.get_content_by_name("t1").await {
                        Ok(Some(content)) => assert_eq!(content.len(), 20_000),
                        Ok(None) => panic!("t1 vanished"),
                        Err(e) => panic!("read failed during concurrent edit: {}", e),
                    }
                    reads += 1;
                    if reads >= 300 {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_creates_are_not_lost() {
        let (_dir, store) = empty_store().await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .create(&format!("tag{}", i), "body", "Alice", 1)
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(store.get_all().await.unwrap().len(), 10);
    }
}
