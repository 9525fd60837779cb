/*
 * Responsibility
 * - 全レスポンス共通の封筒 {success, data?, message, error?, user?}
 * - 成功も失敗も同じ形で返す (失敗側は error.rs の AppError が組み立てる)
 */
use serde::Serialize;

use crate::services::auth::Identity;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            user: None,
        }
    }

    pub fn with_user(mut self, user: UserSummary) -> Self {
        self.user = Some(user);
        self
    }
}

impl ApiResponse<()> {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            error: None,
            user: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            error,
            user: None,
        }
    }
}

/// Who the response was produced for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserSummary {
    // id + email + name
    pub fn full(identity: &Identity) -> Self {
        Self {
            id: identity.subject_id.clone(),
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
        }
    }

    // id + email
    pub fn brief(identity: &Identity) -> Self {
        Self {
            id: identity.subject_id.clone(),
            email: identity.email.clone(),
            first_name: None,
            last_name: None,
        }
    }
}
