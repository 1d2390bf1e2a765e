/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (access token), cors, http (request id / trace / limits), security headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
