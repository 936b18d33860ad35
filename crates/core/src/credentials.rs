//! Bearer-credential generation.
//!
//! Credential values are opaque random alphanumeric strings. The value
//! itself is the store's lookup key, so uniqueness is enforced at insert
//! time and the generator only has to make collisions negligible.

use rand::Rng;

/// Length of a generated credential string (alphanumeric characters).
pub const CREDENTIAL_LENGTH: usize = 48;

/// Generate a new random bearer credential.
///
/// 48 alphanumeric characters drawn from a CSPRNG (~285 bits). The store
/// rejects duplicates at insert time and the caller regenerates on that
/// signal.
pub fn generate_credential() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(CREDENTIAL_LENGTH)
        .map(char::from)
        .collect()
}
