use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::services::auth::locator::RawToken;

/// Why a presented token was rejected.
///
/// - `Expired`: signature is fine but `exp` is in the past (client should re-authenticate)
/// - `Invalid`: bad signature, malformed payload, missing required claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for AuthFailure {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

/// Claims decoded from a verified access token.
///
/// NOTE:
/// - `user_id` is required; the authorization service may send it as a string or an integer.
/// - Unknown claims are kept untouched in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimSet {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub exp: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for user_id, got {other}"
        ))),
    }
}

/// Options layered on top of the fixed HS256 check.
#[derive(Debug, Clone, Default)]
pub struct VerifierOptions {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
}

/// HS256 access-token verifier.
///
/// - The secret is injected once at construction and never printed via Debug.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(secret: &[u8], options: VerifierOptions) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` must be present; a token without it is `Invalid`.
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = options.leeway_seconds;
        // A not-yet-valid token is `Invalid`, not `Expired`.
        validation.validate_nbf = true;

        if let Some(issuer) = options.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
        }
        // Without a configured audience, any token carrying `aud` is rejected.
        if let Some(audience) = options.audience.as_deref() {
            validation.set_audience(&[audience]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    #[cfg(test)]
    pub fn with_secret(secret: &str) -> Self {
        Self::new(secret.as_bytes(), VerifierOptions::default())
    }

    /// Verify signature + expiry and decode the claim set.
    ///
    /// `jsonwebtoken` checks the signature before `exp`, so a forged expired token is `Invalid`.
    pub fn verify(&self, token: &RawToken) -> Result<ClaimSet, AuthFailure> {
        self.verify_str(token.as_str())
    }

    pub fn verify_str(&self, token: &str) -> Result<ClaimSet, AuthFailure> {
        let data = jsonwebtoken::decode::<ClaimSet>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "access token rejected");
                AuthFailure::from(e)
            })?;

        Ok(data.claims)
    }
}
