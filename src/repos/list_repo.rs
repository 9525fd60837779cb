/*
 * Responsibility
 * - lists / list_items の所有者スコープ付き操作の契約 (ListRepo trait)
 * - 行の型 (ListRow / ItemRow) と部分更新の型 (ListPatch / ItemPatch)
 *
 * Notes
 * - 全ての操作は owner_id を必須引数に取る。所有者の条件はクエリ述語に含めること
 *   (取得後にフィルタしない)
 * - 他人のリストと存在しないリストは区別しない (どちらも None / false)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ListRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,

    #[sqlx(rename = "ownerId")]
    pub owner_id: String,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ItemRow {
    pub id: Uuid,
    pub name: String,
    pub completed: bool,

    #[sqlx(rename = "listId")]
    pub list_id: Uuid,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A list together with its items, oldest item first.
#[derive(Debug, Clone, PartialEq)]
pub struct ListWithItems {
    pub list: ListRow,
    pub items: Vec<ItemRow>,
}

#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    pub name: Option<String>,
    // description tri-state:
    // - None: do not update
    // - Some(None): set NULL
    // - Some(Some(v)): set v
    pub description: Option<Option<String>>,
}

impl ListPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub completed: Option<bool>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.completed.is_none()
    }
}

/// Ownership-scoped access to lists and their items.
///
/// `owner_id` is the caller's subject id. A row owned by somebody else is
/// reported exactly like a missing row.
#[async_trait]
pub trait ListRepo: Send + Sync {
    /// All lists owned by `owner_id`, newest first, each with its items.
    async fn list_all(&self, owner_id: &str) -> RepoResult<Vec<ListWithItems>>;

    async fn get_one(&self, list_id: Uuid, owner_id: &str) -> RepoResult<Option<ListWithItems>>;

    async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<ListWithItems>;

    /// Applies only the fields present in `patch`. An empty patch changes nothing.
    async fn update(
        &self,
        list_id: Uuid,
        owner_id: &str,
        patch: &ListPatch,
    ) -> RepoResult<Option<ListWithItems>>;

    /// Deletes the list and, transitively, its items.
    async fn delete(&self, list_id: Uuid, owner_id: &str) -> RepoResult<bool>;

    async fn add_item(
        &self,
        list_id: Uuid,
        owner_id: &str,
        name: &str,
    ) -> RepoResult<Option<ItemRow>>;

    async fn update_item(
        &self,
        item_id: Uuid,
        owner_id: &str,
        patch: &ItemPatch,
    ) -> RepoResult<Option<ItemRow>>;

    async fn remove_item(&self, item_id: Uuid, owner_id: &str) -> RepoResult<bool>;
}

/// Distribute `items` onto `lists`, keeping the order of both inputs.
pub(crate) fn attach_items(lists: Vec<ListRow>, items: Vec<ItemRow>) -> Vec<ListWithItems> {
    let mut out: Vec<ListWithItems> = lists
        .into_iter()
        .map(|list| ListWithItems {
            list,
            items: Vec::new(),
        })
        .collect();

    for item in items {
        if let Some(entry) = out.iter_mut().find(|e| e.list.id == item.list_id) {
            entry.items.push(item);
        }
    }

    out
}
