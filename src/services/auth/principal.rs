//! Request identity derived from a verified claim set.
//!
//! `Identity` is what the authentication middleware puts into request extensions;
//! handlers match on it (or use the extractors) instead of checking a flag.
use crate::services::auth::verifier::ClaimSet;

/// Authenticated requester.
///
/// Only built from a `ClaimSet` that passed signature and expiry validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: String,
    username: Option<String>,
}

impl Principal {
    pub fn from_claims(claims: ClaimSet) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        true
    }
}

/// Requester without a credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnonymousPrincipal;

impl AnonymousPrincipal {
    pub fn is_authenticated(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(Principal),
    Anonymous(AnonymousPrincipal),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        match self {
            Self::Authenticated(p) => p.is_authenticated(),
            Self::Anonymous(a) => a.is_authenticated(),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(p) => Some(p),
            Self::Anonymous(_) => None,
        }
    }
}

impl From<Principal> for Identity {
    fn from(p: Principal) -> Self {
        Self::Authenticated(p)
    }
}
