/*
 * Responsibility
 * - 永続化層の公開インターフェース
 * - handler からは ListRepo trait だけを見る (実装は AppState 生成時に差し込む)
 */
pub mod error;
pub mod list_repo;
#[cfg(test)]
pub mod memory_list_repo;
pub mod pg_list_repo;

pub use error::RepoError;
pub use list_repo::{ItemPatch, ItemRow, ListPatch, ListRepo, ListWithItems};
pub use pg_list_repo::PgListRepo;
