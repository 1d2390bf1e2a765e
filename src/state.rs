/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - profiles: ProfileStore, auth: AuthGate
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::ProfileStore;
use crate::services::auth::AuthGate;

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub auth: Arc<AuthGate>,
}

impl AppState {
    pub fn new(profiles: Arc<dyn ProfileStore>, auth: Arc<AuthGate>) -> Self {
        Self { profiles, auth }
    }
}
