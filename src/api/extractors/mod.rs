/*
 * Responsibility
 * - handler が受け取る extractor の公開窓口
 *   - CurrentUser: アクセスガード (認証済みでなければ 401)
 *   - ListId / ItemId: Path の UUID (不正なら 404)
 */
pub mod current_user;
pub mod resource_id;

pub use current_user::CurrentUser;
pub use resource_id::{ItemId, ListId};
