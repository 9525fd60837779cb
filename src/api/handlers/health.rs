/*
 * Responsibility
 * - GET /health (疎通用, 認証なし)
 */
use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
