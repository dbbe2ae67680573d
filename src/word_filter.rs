// word_filter.rs - Banned substrings checked against every inbound message
// The file is read once at startup; the in-memory list is authoritative afterwards

use crate::error::StoreResult;
use crate::storage::{ensure_file, read_json, write_json};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub struct WordFilter {
    path: PathBuf,
    words: RwLock<Vec<String>>,
}

impl WordFilter {
    /// Read the list at `path` once. Fails if the file is missing or malformed.
    pub async fn load(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let words: Vec<String> = read_json(&path).await?;
        // Hand-edited files may carry mixed case; every comparison is on lower case
        let words: Vec<String> = words.into_iter().map(|w| w.to_lowercase()).collect();
        log::info!("🚫 Loaded {} banned words from {}", words.len(), path.display());

        Ok(Self {
            path,
            words: RwLock::new(words),
        })
    }

    /// Like [`WordFilter::load`], seeding an empty list first if the file is missing.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        ensure_file(&path, &Vec::<String>::new()).await?;
        Self::load(path).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns false if the word is already listed. The in-memory list only
    /// changes once the file was written.
    pub async fn add(&self, word: &str) -> StoreResult<bool> {
        let word = word.to_lowercase();
        let mut words = self.words.write().await;

        if words.contains(&word) {
            return Ok(false);
        }

        let mut updated = words.clone();
        updated.push(word.clone());
        write_json(&self.path, &updated).await?;
        *words = updated;

        log::info!("🚫 Added banned word '{}'", word);
        Ok(true)
    }

    /// Removes the first equal entry. Returns false if the word was not listed.
    pub async fn remove(&self, word: &str) -> StoreResult<bool> {
        let word = word.to_lowercase();
        let mut words = self.words.write().await;

        let Some(index) = words.iter().position(|w| *w == word) else {
            return Ok(false);
        };

        let mut updated = words.clone();
        updated.remove(index);
        write_json(&self.path, &updated).await?;
        *words = updated;

        log::info!("✅ Removed banned word '{}'", word);
        Ok(true)
    }

    pub async fn contains(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.words.read().await.contains(&word)
    }

    /// Unanchored substring match: "ass" also hits "class".
    pub async fn text_contains_any(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.words
            .read()
            .await
            .iter()
            .any(|w| !w.is_empty() && text.contains(w.as_str()))
    }

    pub async fn words(&self) -> Vec<String> {
        self.words.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.words.read().await.len()
    }
}
