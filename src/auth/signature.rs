use std::str::FromStr;

use alloy::primitives::{Address, Signature};

/// Checks that `signature` over `message` was produced by `expected_address`,
/// using standard Ethereum personal-message (EIP-191) recovery.
///
/// Malformed signatures and unparseable addresses are verification failures,
/// not errors: this returns false and never panics or propagates.
#[must_use]
pub fn verify_signature(message: &str, signature: &str, expected_address: &str) -> bool {
    let Ok(expected) = Address::from_str(expected_address) else {
        return false;
    };
    let Ok(signature) = Signature::from_str(signature) else {
        return false;
    };

    match signature.recover_address_from_msg(message) {
        Ok(recovered) => recovered == expected,
        Err(err) => {
            tracing::debug!("signature recovery failed: {err}");
            false
        }
    }
}
