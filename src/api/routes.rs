/*
 * Responsibility
 * - URL 構造を定義
 * - /health は認証なし。/lists 系は handler が CurrentUser を受けるのでガード付き
 * - /lists/items/{item_id} は /lists/{list_id} より具体的なので衝突しない
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::api::handlers::{
    health::health,
    items::{add_item, delete_item, update_item},
    lists::{create_list, delete_list, get_list, list_lists, update_list},
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/lists", get(list_lists).post(create_list))
        .route(
            "/lists/{list_id}",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route("/lists/{list_id}/items", post(add_item))
        .route("/lists/items/{item_id}", put(update_item).delete(delete_item))
}
