/*!
 * Authentication context extractors
 *
 * Responsibility:
 * - middleware が extensions に入れた Identity を handler に提供する
 * - endpoint ごとのアクセス方針 (認証必須 / AllowAny) を型で表す
 *
 * Public API:
 * - CurrentUser     (認証必須)
 * - CurrentIdentity (AllowAny)
 */

mod core;

pub use self::core::{CurrentIdentity, CurrentUser};
