pub mod auth_ctx;
pub mod json;

pub use auth_ctx::{CurrentIdentity, CurrentUser};
pub use json::JsonBody;
