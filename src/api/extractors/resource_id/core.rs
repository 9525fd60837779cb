/*
 * Responsibility
 * - Path の String を受け、UUID としてパースしてリソース ID 型にする
 * - パースできない ID は "存在しない" と同じ 404 にする
 *
 * 置くもの
 *  - ResourceId<T> の定義（ジェネリック本体）と FromRequestParts 実装
 *  - Resource trait (リソースごとの not found の作り方)
 * 置かないもの
 *  - List / Item といった具体リソース名 (types.rs)
 */
use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::AppError;

pub trait Resource {
    fn not_found(raw_id: &str) -> AppError;
}

pub struct ResourceId<T> {
    pub id: Uuid,
    _marker: PhantomData<T>,
}

impl<T> ResourceId<T> {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }
}

impl<S, T> FromRequestParts<S> for ResourceId<T>
where
    S: Send + Sync,
    T: Resource + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| T::not_found(""))?;

        let id = Uuid::parse_str(raw.trim()).map_err(|_| T::not_found(&raw))?;
        Ok(Self::new(id))
    }
}

impl<T> Clone for ResourceId<T> {
    fn clone(&self) -> Self {
        Self::new(self.id)
    }
}

impl<T> Copy for ResourceId<T> {}

impl<T> std::fmt::Debug for ResourceId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceId").field("id", &self.id).finish()
    }
}

impl<T> std::fmt::Display for ResourceId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.id.fmt(f)
    }
}
