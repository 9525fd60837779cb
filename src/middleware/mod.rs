/*
 * Responsibility
 * - middleware の公開インターフェース
 *   - identity: Bearer トークンを検証して AttachedIdentity を extensions に入れる (拒否はしない)
 *   - http: request id / access log / body limit / timeout / security headers
 *   - cors: ブラウザ向け CORS ポリシー
 */
pub mod cors;
pub mod http;
pub mod identity;
