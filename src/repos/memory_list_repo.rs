//! In-memory `ListRepo` used by handler and middleware tests.
//!
//! Same ownership semantics as `PgListRepo`; each operation holds the lock for
//! its whole duration. `calls()` counts every repo invocation so tests can
//! assert that rejected requests never reached the store.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::repos::{
    error::RepoResult,
    list_repo::{ItemPatch, ItemRow, ListPatch, ListRepo, ListRow, ListWithItems, attach_items},
};

#[derive(Default)]
struct Tables {
    // insertion order == creation order
    lists: Vec<ListRow>,
    items: Vec<ItemRow>,
}

impl Tables {
    fn owned_list(&self, list_id: Uuid, owner_id: &str) -> Option<&ListRow> {
        self.lists
            .iter()
            .find(|l| l.id == list_id && l.owner_id == owner_id)
    }

    fn with_items(&self, list: &ListRow) -> ListWithItems {
        ListWithItems {
            list: list.clone(),
            items: self
                .items
                .iter()
                .filter(|i| i.list_id == list.id)
                .cloned()
                .collect(),
        }
    }

    // Position of an item whose owning list belongs to owner_id.
    fn owned_item_position(&self, item_id: Uuid, owner_id: &str) -> Option<usize> {
        let pos = self.items.iter().position(|i| i.id == item_id)?;
        self.owned_list(self.items[pos].list_id, owner_id)?;
        Some(pos)
    }
}

#[derive(Default)]
pub struct MemoryListRepo {
    tables: Mutex<Tables>,
    calls: AtomicUsize,
}

impl MemoryListRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn item_count(&self) -> usize {
        self.lock().items.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lock()
    }
}

#[async_trait]
impl ListRepo for MemoryListRepo {
    async fn list_all(&self, owner_id: &str) -> RepoResult<Vec<ListWithItems>> {
        let tables = self.enter();
        let lists: Vec<ListRow> = tables
            .lists
            .iter()
            .rev()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        let items = tables
            .items
            .iter()
            .filter(|i| lists.iter().any(|l| l.id == i.list_id))
            .cloned()
            .collect();

        Ok(attach_items(lists, items))
    }

    async fn get_one(&self, list_id: Uuid, owner_id: &str) -> RepoResult<Option<ListWithItems>> {
        let tables = self.enter();
        Ok(tables
            .owned_list(list_id, owner_id)
            .map(|l| tables.with_items(l)))
    }

    async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<ListWithItems> {
        let mut tables = self.enter();
        let now = Utc::now();
        let list = ListRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.lists.push(list.clone());

        Ok(ListWithItems {
            list,
            items: Vec::new(),
        })
    }

    async fn update(
        &self,
        list_id: Uuid,
        owner_id: &str,
        patch: &ListPatch,
    ) -> RepoResult<Option<ListWithItems>> {
        let mut tables = self.enter();
        let Some(list) = tables
            .lists
            .iter_mut()
            .find(|l| l.id == list_id && l.owner_id == owner_id)
        else {
            return Ok(None);
        };

        if !patch.is_empty() {
            if let Some(name) = &patch.name {
                list.name = name.clone();
            }
            if let Some(description) = &patch.description {
                list.description = description.clone();
            }
            list.updated_at = Utc::now();
        }

        let list = list.clone();
        Ok(Some(tables.with_items(&list)))
    }

    async fn delete(&self, list_id: Uuid, owner_id: &str) -> RepoResult<bool> {
        let mut tables = self.enter();
        if tables.owned_list(list_id, owner_id).is_none() {
            return Ok(false);
        }

        tables.lists.retain(|l| l.id != list_id);
        tables.items.retain(|i| i.list_id != list_id);
        Ok(true)
    }

    async fn add_item(
        &self,
        list_id: Uuid,
        owner_id: &str,
        name: &str,
    ) -> RepoResult<Option<ItemRow>> {
        let mut tables = self.enter();
        if tables.owned_list(list_id, owner_id).is_none() {
            return Ok(None);
        }

        let now = Utc::now();
        let item = ItemRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            completed: false,
            list_id,
            created_at: now,
            updated_at: now,
        };
        tables.items.push(item.clone());
        Ok(Some(item))
    }

    async fn update_item(
        &self,
        item_id: Uuid,
        owner_id: &str,
        patch: &ItemPatch,
    ) -> RepoResult<Option<ItemRow>> {
        let mut tables = self.enter();
        let Some(pos) = tables.owned_item_position(item_id, owner_id) else {
            return Ok(None);
        };

        let item = &mut tables.items[pos];
        if !patch.is_empty() {
            if let Some(name) = &patch.name {
                item.name = name.clone();
            }
            if let Some(completed) = patch.completed {
                item.completed = completed;
            }
            item.updated_at = Utc::now();
        }

        Ok(Some(item.clone()))
    }

    async fn remove_item(&self, item_id: Uuid, owner_id: &str) -> RepoResult<bool> {
        let mut tables = self.enter();
        let Some(pos) = tables.owned_item_position(item_id, owner_id) else {
            return Ok(false);
        };

        tables.items.remove(pos);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ItemPatch {
        ItemPatch {
            completed: Some(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn groceries_scenario() {
        let repo = MemoryListRepo::new();

        let created = repo.create("u1", "Groceries", None).await.unwrap();
        assert_eq!(created.list.owner_id, "u1");
        assert_eq!(created.list.name, "Groceries");
        assert!(created.items.is_empty());

        let milk = repo
            .add_item(created.list.id, "u1", "Milk")
            .await
            .unwrap()
            .unwrap();
        assert!(!milk.completed);
        assert_eq!(milk.list_id, created.list.id);

        assert!(
            repo.add_item(created.list.id, "u2", "Eggs")
                .await
                .unwrap()
                .is_none()
        );

        assert!(repo.remove_item(milk.id, "u1").await.unwrap());
        assert!(repo.update_item(milk.id, "u1", &complete()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn other_owners_see_nothing() {
        let repo = MemoryListRepo::new();
        let theirs = repo.create("owner_b", "Secret", Some("mine")).await.unwrap();
        let item = repo
            .add_item(theirs.list.id, "owner_b", "hidden")
            .await
            .unwrap()
            .unwrap();

        assert!(repo.get_one(theirs.list.id, "owner_a").await.unwrap().is_none());
        assert!(repo.list_all("owner_a").await.unwrap().is_empty());
        assert!(repo.update_item(item.id, "owner_a", &complete()).await.unwrap().is_none());
        assert!(!repo.remove_item(item.id, "owner_a").await.unwrap());
        assert!(!repo.delete(theirs.list.id, "owner_a").await.unwrap());
        assert!(
            repo.update(theirs.list.id, "owner_a", &ListPatch {
                name: Some("pwned".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .is_none()
        );

        let still_theirs = repo.get_one(theirs.list.id, "owner_b").await.unwrap().unwrap();
        assert_eq!(still_theirs.list.name, "Secret");
        assert!(!still_theirs.items[0].completed);
    }

    #[tokio::test]
    async fn list_all_is_newest_first_and_contains_new_list_once() {
        let repo = MemoryListRepo::new();
        let first = repo.create("u1", "First", None).await.unwrap();
        let second = repo.create("u1", "Second", None).await.unwrap();
        repo.create("u2", "Other", None).await.unwrap();

        let lists = repo.list_all("u1").await.unwrap();
        let ids: Vec<_> = lists.iter().map(|l| l.list.id).collect();
        assert_eq!(ids, [second.list.id, first.list.id]);
    }

    #[tokio::test]
    async fn delete_cascades_to_items() {
        let repo = MemoryListRepo::new();
        let list = repo.create("u1", "Chores", None).await.unwrap();
        let a = repo.add_item(list.list.id, "u1", "Dishes").await.unwrap().unwrap();
        let b = repo.add_item(list.list.id, "u1", "Laundry").await.unwrap().unwrap();

        assert!(repo.delete(list.list.id, "u1").await.unwrap());
        assert_eq!(repo.item_count(), 0);
        for id in [a.id, b.id] {
            assert!(repo.update_item(id, "u1", &complete()).await.unwrap().is_none());
        }
        assert!(!repo.delete(list.list.id, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn empty_patches_change_nothing() {
        let repo = MemoryListRepo::new();
        let list = repo.create("u1", "Groceries", Some("sat")).await.unwrap();
        let item = repo.add_item(list.list.id, "u1", "Milk").await.unwrap().unwrap();

        let same_list = repo
            .update(list.list.id, "u1", &ListPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same_list.list, list.list);

        let same_item = repo
            .update_item(item.id, "u1", &ItemPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same_item, item);
    }

    #[tokio::test]
    async fn partial_patches_leave_other_fields_alone() {
        let repo = MemoryListRepo::new();
        let list = repo.create("u1", "Groceries", Some("sat")).await.unwrap();
        let item = repo.add_item(list.list.id, "u1", "Milk").await.unwrap().unwrap();

        let renamed = repo
            .update(list.list.id, "u1", &ListPatch {
                name: Some("Market".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.list.description.as_deref(), Some("sat"));
        assert_eq!(renamed.items.len(), 1);

        let done = repo.update_item(item.id, "u1", &complete()).await.unwrap().unwrap();
        assert!(done.completed);
        assert_eq!(done.name, "Milk");
    }
}
