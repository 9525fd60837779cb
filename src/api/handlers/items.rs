/*
 * Responsibility
 * - list item handler (追加 / 更新 / 削除)
 * - 所有者の確認は repo の 1 文のクエリで行う (確認してから書く、をしない)
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

use crate::{
    api::{
        dto::{
            envelope::ApiResponse,
            lists::{CreateItemRequest, ItemResponse, UpdateItemRequest},
        },
        extractors::{CurrentUser, ItemId, ListId},
    },
    error::AppError,
    state::AppState,
};

pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    list_id: ListId,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ItemResponse>>), AppError> {
    let Json(req) = body?;
    req.validate().map_err(AppError::bad_request)?;

    let item = state
        .lists
        .add_item(list_id.id, &user.subject_id, req.name.trim())
        .await
        .map_err(AppError::store("Error adding item to list"))?
        .ok_or_else(|| AppError::list_not_found(list_id))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            ItemResponse::from(item),
            "Item added to list successfully",
        )),
    ))
}

pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    item_id: ItemId,
    body: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ItemResponse>>, AppError> {
    let Json(req) = body?;
    req.validate().map_err(AppError::bad_request)?;

    let mut patch = req.into_patch();
    patch.name = patch.name.map(|name| name.trim().to_string());

    let item = state
        .lists
        .update_item(item_id.id, &user.subject_id, &patch)
        .await
        .map_err(AppError::store("Error updating item"))?
        .ok_or_else(|| AppError::item_not_found(item_id))?;

    Ok(Json(ApiResponse::ok(
        ItemResponse::from(item),
        "Item updated successfully",
    )))
}

pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    item_id: ItemId,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let removed = state
        .lists
        .remove_item(item_id.id, &user.subject_id)
        .await
        .map_err(AppError::store("Error deleting item"))?;

    if !removed {
        return Err(AppError::item_not_found(item_id));
    }

    Ok(Json(ApiResponse::done("Item deleted successfully")))
}
