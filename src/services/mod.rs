/*
 * Responsibility
 * - handler/middleware から使うドメイン外のサービス (トークン検証など)
 */
pub mod auth;
