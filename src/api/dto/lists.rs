/*
 * Responsibility
 * - Lists / Items の request/response DTO
 * - JSON は camelCase (ownerId, listId, createdAt, updatedAt)
 * - validate() は形式チェックだけ。存在確認や所有者チェックは repo 側
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::repos::{ItemPatch, ItemRow, ListPatch, ListWithItems};

const NAME_MAX_CHARS: usize = 255;

fn check_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("name is required");
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err("name must be <= 255 chars");
    }
    Ok(())
}

// `"field": null` -> Some(None), missing field -> None (via #[serde(default)])
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateListRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        check_name(&self.name)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    #[serde(default)]
    pub name: Option<String>,
    // Tri-state:
    // - None: field missing (do not update)
    // - Some(None): null (clear)
    // - Some(Some(v)): set value
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl UpdateListRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        Ok(())
    }

    pub fn into_patch(self) -> ListPatch {
        ListPatch {
            name: self.name,
            description: self.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
}

impl CreateItemRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        check_name(&self.name)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl UpdateItemRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        Ok(())
    }

    pub fn into_patch(self) -> ItemPatch {
        ItemPatch {
            name: self.name,
            completed: self.completed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    pub name: String,
    pub completed: bool,
    pub list_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ItemRow> for ItemResponse {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            completed: row.completed,
            list_id: row.list_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<ItemResponse>,
}

impl From<ListWithItems> for ListResponse {
    fn from(ListWithItems { list, items }: ListWithItems) -> Self {
        Self {
            id: list.id,
            name: list.name,
            description: list.description,
            owner_id: list.owner_id,
            created_at: list.created_at,
            updated_at: list.updated_at,
            items: items.into_iter().map(ItemResponse::from).collect(),
        }
    }
}
