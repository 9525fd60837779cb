/*
 * Responsibility
 * - request / response DTO
 *   - envelope: 共通の封筒 {success, data?, message, error?, user?}
 *   - lists: lists / items の request と response
 */
pub mod envelope;
pub mod lists;
