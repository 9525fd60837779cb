/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / 共通封筒 {success:false, message, error?})
 * - RepoError は handler ごとのメッセージを付けて Store に変換する
 *   Store は transport エラー (5xx) にせず、200 + {success:false, message, error} で返す
 *
 * Notes
 * - NotFound は "存在しない" と "他人のもの" を区別しない
 * - Store の詳細 (SQL エラー等) はログにだけ出す
 */
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::dto::envelope::ApiResponse;
use crate::repos::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },
    #[error("{message}")]
    Unauthorized { message: &'static str },
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: RepoError,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::Unauthorized { message }
    }

    pub fn list_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            message: format!("List with ID {id} not found or access denied"),
        }
    }

    pub fn item_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            message: format!("Item with ID {id} not found or access denied"),
        }
    }

    /// `map_err` helper: `.map_err(AppError::store("Error retrieving lists"))`
    pub fn store(message: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| Self::Store { message, source }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure(message, Some("Bad Request".to_string())),
            ),
            AppError::Unauthorized { message } => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::failure(message, Some("Unauthorized".to_string())),
            ),
            AppError::NotFound { message } => {
                (StatusCode::NOT_FOUND, ApiResponse::failure(message, None))
            }
            AppError::Store { message, source } => {
                tracing::error!(error = ?source, "{message}");
                (
                    StatusCode::OK,
                    ApiResponse::failure(message, Some(source.to_string())),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
