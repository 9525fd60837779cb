/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - "見つからない / 他人の所有物" は Err ではなく Option::None / false で返す
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
