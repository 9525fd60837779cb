//! Access guard.
//!
//! Reads what the identity middleware attached to the request and turns it
//! into an `Identity`, or rejects with 401:
//! - nothing attached (no/invalid token, or middleware not applied)
//! - a verified payload without a subject id
//!
//! Because this runs as an extractor, a rejected request never reaches the
//! handler body (and therefore never touches the store).

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::middleware::identity::AttachedIdentity;
use crate::services::auth::Identity;

pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(payload) = parts
            .extensions
            .get::<AttachedIdentity>()
            .and_then(AttachedIdentity::payload)
        else {
            tracing::warn!("authentication required - no identity on request");
            return Err(AppError::unauthorized("Authentication required"));
        };

        let Some(identity) = Identity::from_payload(payload) else {
            tracing::warn!("invalid identity - missing subject (sub) claim");
            return Err(AppError::unauthorized("Invalid authentication token"));
        };

        tracing::debug!(
            user_id = %identity.subject_id,
            session_id = ?identity.session_id,
            "user authenticated"
        );
        Ok(CurrentUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::IdentityPayload;

    async fn whoami(CurrentUser(identity): CurrentUser) -> String {
        identity.subject_id
    }

    async fn status_with(attached: Option<AttachedIdentity>) -> (StatusCode, String) {
        let app = Router::new().route("/", get(whoami));

        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        if let Some(attached) = attached {
            request.extensions_mut().insert(attached);
        }

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn payload(sub: &str) -> IdentityPayload {
        IdentityPayload {
            sub: sub.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn passes_with_subject() {
        let attached = AttachedIdentity(Some(Arc::new(payload("user_123"))));
        let (status, body) = status_with(Some(attached)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "user_123");
    }

    #[tokio::test]
    async fn rejects_when_nothing_attached() {
        let (status, body) = status_with(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Authentication required"));

        let (status, _) = status_with(Some(AttachedIdentity(None))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_payload_without_subject() {
        let attached = AttachedIdentity(Some(Arc::new(payload(""))));
        let (status, body) = status_with(Some(attached)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid authentication token"));
    }
}
