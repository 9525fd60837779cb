/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - lists: 所有者スコープ付きストア, verifier: トークン検証
 * - Clone 前提で持つ (内部は Arc なので Clone cheap)
 * - 実装は trait object で受けるので、テストではスタブを差し込める
 */
use std::sync::Arc;

use crate::repos::ListRepo;
use crate::services::auth::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub lists: Arc<dyn ListRepo>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(lists: Arc<dyn ListRepo>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { lists, verifier }
    }
}
