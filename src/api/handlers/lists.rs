/*
 * Responsibility
 * - /lists 系 handler
 * - CurrentUser (アクセスガード) を最初に受ける。未認証ならここまで来ない
 * - DTO validation → repo 呼び出し → 共通封筒で返す
 * - repo には必ず identity.subject_id を渡す (所有者の絞り込みは repo 側)
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

use crate::{
    api::{
        dto::{
            envelope::{ApiResponse, UserSummary},
            lists::{CreateListRequest, ListResponse, UpdateListRequest},
        },
        extractors::{CurrentUser, ListId},
    },
    error::AppError,
    state::AppState,
};

pub async fn list_lists(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<ListResponse>>>, AppError> {
    let lists = state
        .lists
        .list_all(&user.subject_id)
        .await
        .map_err(AppError::store("Error retrieving lists"))?;

    let message = format!("Found {} lists for user {}", lists.len(), user.subject_id);
    let data = lists.into_iter().map(ListResponse::from).collect();

    Ok(Json(
        ApiResponse::ok(data, message).with_user(UserSummary::full(&user)),
    ))
}

pub async fn get_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    list_id: ListId,
) -> Result<Json<ApiResponse<ListResponse>>, AppError> {
    let list = state
        .lists
        .get_one(list_id.id, &user.subject_id)
        .await
        .map_err(AppError::store("Error retrieving list"))?
        .ok_or_else(|| AppError::list_not_found(list_id))?;

    let message = format!("Retrieved list {} for user {}", list_id, user.subject_id);
    Ok(Json(
        ApiResponse::ok(ListResponse::from(list), message).with_user(UserSummary::brief(&user)),
    ))
}

pub async fn create_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<CreateListRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ListResponse>>), AppError> {
    let Json(req) = body?;
    req.validate().map_err(AppError::bad_request)?;

    let list = state
        .lists
        .create(&user.subject_id, req.name.trim(), req.description.as_deref())
        .await
        .map_err(AppError::store("Error creating list"))?;

    tracing::info!(list_id = %list.list.id, user_id = %user.subject_id, "list created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            ListResponse::from(list),
            "List created successfully",
        )),
    ))
}

pub async fn update_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    list_id: ListId,
    body: Result<Json<UpdateListRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ListResponse>>, AppError> {
    let Json(req) = body?;
    req.validate().map_err(AppError::bad_request)?;

    let mut patch = req.into_patch();
    patch.name = patch.name.map(|name| name.trim().to_string());

    let list = state
        .lists
        .update(list_id.id, &user.subject_id, &patch)
        .await
        .map_err(AppError::store("Error updating list"))?
        .ok_or_else(|| AppError::list_not_found(list_id))?;

    Ok(Json(ApiResponse::ok(
        ListResponse::from(list),
        "List updated successfully",
    )))
}

pub async fn delete_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    list_id: ListId,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let deleted = state
        .lists
        .delete(list_id.id, &user.subject_id)
        .await
        .map_err(AppError::store("Error deleting list"))?;

    if !deleted {
        return Err(AppError::list_not_found(list_id));
    }

    tracing::info!(list_id = %list_id, user_id = %user.subject_id, "list deleted");
    Ok(Json(ApiResponse::done("List deleted successfully")))
}
