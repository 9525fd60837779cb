/*
 * Responsibility
 * - handler の置き場
 *   - health: 疎通確認 (認証なし)
 *   - lists / items: CurrentUser を受けた上で repo を呼ぶだけの薄い層
 */
pub mod health;
pub mod items;
pub mod lists;
