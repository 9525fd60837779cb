/*
 * Responsibility
 * - 検証済みトークンの中身 (IdentityPayload) と、handler から見える Identity の型
 *
 * Notes
 * - IdentityPayload は verifier の出力をそのまま持つ (sub が空の可能性もある)
 * - Identity は guard を通過したものだけ。subject_id は必ず空でない
 * - provider 固有の claim は extra に残し、コアはそれに依存しない
 */
use std::collections::HashMap;

use serde::Deserialize;

/// Claims of a verified provider token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPayload {
    // Subject (user id). Presence is checked by the guard, not the verifier.
    #[serde(default)]
    pub sub: String,

    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,

    pub exp: i64,
    pub iss: String,
    // authorized party (origin of the frontend that requested the token)
    #[serde(default)]
    pub azp: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// The caller as seen by handlers; `subject_id` scopes every store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub session_id: Option<String>,
}

impl Identity {
    /// `None` when the payload carries no usable subject id.
    pub fn from_payload(payload: &IdentityPayload) -> Option<Self> {
        let subject_id = payload.sub.trim();
        if subject_id.is_empty() {
            return None;
        }

        Some(Self {
            subject_id: subject_id.to_string(),
            email: payload.email.clone(),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            session_id: payload.sid.clone(),
        })
    }
}
