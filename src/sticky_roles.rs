// sticky_roles.rs - Roles that survive a member leaving and rejoining the guild

use crate::error::StoreResult;
use crate::storage::{ensure_file, read_json, write_json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickyData {
    #[serde(rename = "stickiedRoles", default)]
    pub stickied_roles: Vec<u64>,
    /// Keyed by user id. JSON object keys are strings, serde_json handles the u64 conversion.
    #[serde(rename = "stickiedUsers", default)]
    pub stickied_users: BTreeMap<u64, Vec<u64>>,
}

pub struct StickyRoleStore {
    path: PathBuf,
    data: RwLock<StickyData>,
}

impl StickyRoleStore {
    pub async fn load(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let data: StickyData = read_json(&path).await?;
        log::info!(
            "📌 Loaded {} stickied roles and {} stickied users",
            data.stickied_roles.len(),
            data.stickied_users.len()
        );

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        ensure_file(&path, &StickyData::default()).await?;
        Self::load(path).await
    }

    /// Apply `change` to a copy, persist it, then publish it. Nothing is written when `change` returns false.
    async fn update<F>(&self, change: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut StickyData) -> bool,
    {
        let mut data = self.data.write().await;
        let mut updated = data.clone();

        if !change(&mut updated) {
            return Ok(false);
        }

        write_json(&self.path, &updated).await?;
        *data = updated;
        Ok(true)
    }

    pub async fn add_role(&self, role_id: u64) -> StoreResult<bool> {
        let added = self
            .update(|d| {
                if d.stickied_roles.contains(&role_id) {
                    return false;
                }
                d.stickied_roles.push(role_id);
                true
            })
            .await?;

        if added {
            log::info!("📌 Role {} is now sticky", role_id);
        }
        Ok(added)
    }

    pub async fn remove_role(&self, role_id: u64) -> StoreResult<bool> {
        let removed = self
            .update(|d| {
                let before = d.stickied_roles.len();
                d.stickied_roles.retain(|r| *r != role_id);
                d.stickied_roles.len() != before
            })
            .await?;

        if removed {
            log::info!("📌 Role {} is no longer sticky", role_id);
        }
        Ok(removed)
    }

    pub async fn roles(&self) -> Vec<u64> {
        self.data.read().await.stickied_roles.clone()
    }

    pub async fn is_sticky(&self, role_id: u64) -> bool {
        self.data.read().await.stickied_roles.contains(&role_id)
    }

    /// Record which stickied roles a departing member held. Returns whether the file changed.
    pub async fn remember_member(&self, user_id: u64, held_roles: &[u64]) -> StoreResult<bool> {
        self.update(|d| {
            let kept: Vec<u64> = held_roles
                .iter()
                .copied()
                .filter(|r| d.stickied_roles.contains(r))
                .collect();

            if kept.is_empty() {
                return d.stickied_users.remove(&user_id).is_some();
            }

            if d.stickied_users.get(&user_id) == Some(&kept) {
                return false;
            }

            log::info!("📌 Remembering {} sticky roles for user {}", kept.len(), user_id);
            d.stickied_users.insert(user_id, kept);
            true
        })
        .await
    }

    /// Roles to hand back to a rejoining member, limited to roles that are still sticky.
    pub async fn roles_for(&self, user_id: u64) -> Vec<u64> {
        let data = self.data.read().await;
        data.stickied_users
            .get(&user_id)
            .map(|roles| {
                roles
                    .iter()
                    .copied()
                    .filter(|r| data.stickied_roles.contains(r))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn forget_user(&self, user_id: u64) -> StoreResult<bool> {
        let removed = self
            .update(|d| d.stickied_users.remove(&user_id).is_some())
            .await?;

        if removed {
            log::info!("📌 Forgot sticky roles of user {}", user_id);
        }
        Ok(removed)
    }

    pub async fn user_count(&self) -> usize {
        self.data.read().await.stickied_users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn empty_store() -> (TempDir, StickyRoleStore) {
        let dir = TempDir::new().unwrap();
        let store = StickyRoleStore::open(dir.path().join("stickyRoles.json"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn add_and_remove_roles() {
        let (_dir, store) = empty_store().await;

        assert!(store.add_role(10).await.unwrap());
        assert!(!store.add_role(10).await.unwrap());
        assert_eq!(store.roles().await, vec![10]);

        assert!(store.remove_role(10).await.unwrap());
        assert!(!store.remove_role(10).await.unwrap());
        assert!(store.roles().await.is_empty());
    }

    #[tokio::test]
    async fn departing_member_keeps_only_sticky_roles() {
        let (_dir, store) = empty_store().await;
        store.add_role(10).await.unwrap();
        store.add_role(20).await.unwrap();

        assert!(store.remember_member(7, &[10, 30]).await.unwrap());
        assert_eq!(store.roles_for(7).await, vec![10]);
    }

    #[tokio::test]
    async fn member_without_sticky_roles_is_dropped() {
        let (_dir, store) = empty_store().await;
        store.add_role(10).await.unwrap();

        store.remember_member(7, &[10]).await.unwrap();
        assert_eq!(store.user_count().await, 1);

        assert!(store.remember_member(7, &[99]).await.unwrap());
        assert_eq!(store.user_count().await, 0);
        assert!(store.roles_for(7).await.is_empty());
    }

    #[tokio::test]
    async fn unstickied_role_is_not_restored() {
        let (_dir, store) = empty_store().await;
        store.add_role(10).await.unwrap();
        store.add_role(20).await.unwrap();
        store.remember_member(7, &[10, 20]).await.unwrap();

        store.remove_role(20).await.unwrap();
        assert_eq!(store.roles_for(7).await, vec![10]);
    }

    #[tokio::test]
    async fn forget_user() {
        let (_dir, store) = empty_store().await;
        store.add_role(10).await.unwrap();
        store.remember_member(7, &[10]).await.unwrap();

        assert!(store.forget_user(7).await.unwrap());
        assert!(!store.forget_user(7).await.unwrap());
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn persisted_across_reload() {
        let (dir, store) = empty_store().await;
        store.add_role(10).await.unwrap();
        store.remember_member(7, &[10]).await.unwrap();

        let reloaded = StickyRoleStore::load(dir.path().join("stickyRoles.json"))
            .await
            .unwrap();
        assert!(reloaded.is_sticky(10).await);
        assert_eq!(reloaded.roles_for(7).await, vec![10]);

        let raw = std::fs::read_to_string(dir.path().join("stickyRoles.json")).unwrap();
        assert!(raw.contains("\"stickiedRoles\""));
        assert!(raw.contains("\"7\""));
    }
}
