/// Factory: build `AuthGate` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AuthGate, TokenVerifier, VerifierOptions};

pub fn build_auth_gate(config: &Config) -> Arc<AuthGate> {
    let verifier = TokenVerifier::new(
        config.jwt_secret_key.as_bytes(),
        VerifierOptions {
            issuer: config.auth_issuer.clone(),
            audience: config.auth_audience.clone(),
            leeway_seconds: config.access_token_leeway_seconds,
        },
    );

    Arc::new(AuthGate::new(verifier))
}
