pub mod clerk;
pub mod factory;
pub mod identity;
pub mod jwks;
pub mod verifier;

pub use clerk::ClerkVerifier;
pub use factory::build_token_verifier;
pub use identity::{Identity, IdentityPayload};
pub use jwks::JwksCache;
pub use verifier::{TokenVerifier, VerifyError};
