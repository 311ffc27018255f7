mod gate;
mod message;
mod nonce;
mod signature;

pub use gate::{AuthGate, VerifiedAddress};
pub use message::{AuthAction, AuthChallenge, signing_message};
pub use nonce::{IssuedNonce, NonceStore};
pub use signature::verify_signature;

/// Validity window shared by nonces and signed timestamps. Bounding both to
/// the same span caps the total exposure of a captured signature.
pub const AUTH_WINDOW_MINUTES: i64 = 10;
