//! Identity attachment stage.
//!
//! Runs in front of every route and never rejects a request by itself:
//! - valid `Authorization: Bearer <token>` -> `AttachedIdentity(Some(payload))`
//! - missing header, other scheme, or a token that fails verification
//!   -> `AttachedIdentity(None)`
//!
//! Rejection is the access guard's job (`api::extractors::CurrentUser`), so
//! public routes like `/health` keep working without a token.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::services::auth::IdentityPayload;
use crate::state::AppState;

/// What the identity stage found on the request. Always present after the stage ran.
#[derive(Debug, Clone, Default)]
pub struct AttachedIdentity(pub Option<Arc<IdentityPayload>>);

impl AttachedIdentity {
    pub fn payload(&self) -> Option<&IdentityPayload> {
        self.0.as_deref()
    }
}

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // from_fn は State を受け取れないので from_fn_with_state で渡す
    router.layer(middleware::from_fn_with_state(state, attach_identity))
}

async fn attach_identity(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let attached = match bearer_token(req.headers()) {
        None => AttachedIdentity(None),
        Some(token) => match state.verifier.verify(token).await {
            Ok(payload) => {
                tracing::debug!(
                    sub = %payload.sub,
                    sid = ?payload.sid,
                    azp = ?payload.azp,
                    iss = %payload.iss,
                    exp = payload.exp,
                    "identity attached"
                );
                AttachedIdentity(Some(Arc::new(payload)))
            }
            Err(err) => {
                tracing::warn!(error = %err, "token verification failed");
                AttachedIdentity(None)
            }
        },
    };

    req.extensions_mut().insert(attached);
    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
