/**
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する
 *  - リソースが増えたらここにタグと alias を足す
 */
use super::core::{Resource, ResourceId};
use crate::error::AppError;

// lists
pub enum ListTag {}
pub type ListId = ResourceId<ListTag>;

impl Resource for ListTag {
    fn not_found(raw_id: &str) -> AppError {
        AppError::list_not_found(raw_id)
    }
}

// list items
pub enum ItemTag {}
pub type ItemId = ResourceId<ItemTag>;

impl Resource for ItemTag {
    fn not_found(raw_id: &str) -> AppError {
        AppError::item_not_found(raw_id)
    }
}
