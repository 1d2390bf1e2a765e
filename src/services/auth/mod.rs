pub mod factory;
pub mod gate;
pub mod locator;
pub mod principal;
pub mod verifier;

pub use factory::build_auth_gate;
pub use gate::AuthGate;
pub use principal::{AnonymousPrincipal, Identity, Principal};
pub use verifier::{AuthFailure, TokenVerifier, VerifierOptions};
