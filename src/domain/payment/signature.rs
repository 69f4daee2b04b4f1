//! Gateway webhook signature verification.
//!
//! Midtrans signs each webhook as the lowercase hex SHA-512 digest of the
//! exact concatenation `order_id + status_code + gross_amount + server_key`.
//! There is no timestamp in the scheme; replay protection comes from the
//! payment state machine (a final payment ignores duplicate deliveries).

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Verifier for gateway webhook signatures.
pub struct SignatureVerifier {
    /// The merchant server key from the gateway dashboard.
    server_key: SecretString,
}

impl SignatureVerifier {
    /// Creates a new verifier with the given server key.
    pub fn new(server_key: SecretString) -> Self {
        Self { server_key }
    }

    /// Verifies a webhook signature.
    ///
    /// The `gross_amount` must be the raw string from the payload, never a
    /// re-formatted amount: the gateway signed those exact bytes.
    ///
    /// Returns false on any mismatch, including malformed hex. Comparison
    /// of the digests is constant-time.
    pub fn verify(
        &self,
        order_id: &str,
        status_code: &str,
        gross_amount: &str,
        signature: &str,
    ) -> bool {
        let expected = self.compute_digest(order_id, status_code, gross_amount);

        let provided = match hex::decode(signature) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        constant_time_compare(&expected, &provided)
    }

    /// Computes the raw SHA-512 digest for the signed fields.
    fn compute_digest(&self, order_id: &str, status_code: &str, gross_amount: &str) -> Vec<u8> {
        let mut hasher = Sha512::new();
        hasher.update(order_id.as_bytes());
        hasher.update(status_code.as_bytes());
        hasher.update(gross_amount.as_bytes());
        hasher.update(self.server_key.expose_secret().as_bytes());
        hasher.finalize().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a lowercase hex signature for use in test fixtures.
#[cfg(test)]
pub fn compute_test_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_KEY: &str = "test-secret";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::new(TEST_KEY.to_string()))
    }

    // Known vector: sha512("ORDER-abc-1700000000000" + "200" + "25000.00" + "test-secret")
    const KNOWN_SIGNATURE: &str = "a1ea1e3aa69a10496503c0f420cdbc3b0d5043b0117b6bd800580edbf553cf44472bbd35f94343e9505ad705c8c2a8caca3fc8efca61525fc7d1e844cf449524";

    #[test]
    fn verify_accepts_known_vector() {
        assert!(verifier().verify(
            "ORDER-abc-1700000000000",
            "200",
            "25000.00",
            KNOWN_SIGNATURE,
        ));
    }

    #[test]
    fn compute_test_signature_matches_known_vector() {
        let sig = compute_test_signature("ORDER-abc-1700000000000", "200", "25000.00", TEST_KEY);
        assert_eq!(sig, KNOWN_SIGNATURE);
    }

    #[test]
    fn verify_rejects_tampered_amount() {
        assert!(!verifier().verify(
            "ORDER-abc-1700000000000",
            "200",
            "25000.01",
            KNOWN_SIGNATURE,
        ));
    }

    #[test]
    fn verify_rejects_tampered_order_id() {
        assert!(!verifier().verify(
            "ORDER-abd-1700000000000",
            "200",
            "25000.00",
            KNOWN_SIGNATURE,
        ));
    }

    #[test]
    fn verify_rejects_wrong_server_key() {
        let other = SignatureVerifier::new(SecretString::new("other-secret".to_string()));
        assert!(!other.verify(
            "ORDER-abc-1700000000000",
            "200",
            "25000.00",
            KNOWN_SIGNATURE,
        ));
    }

    #[test]
    fn verify_rejects_malformed_hex() {
        assert!(!verifier().verify(
            "ORDER-abc-1700000000000",
            "200",
            "25000.00",
            "not-hex-at-all",
        ));
    }

    #[test]
    fn verify_rejects_truncated_signature() {
        assert!(!verifier().verify(
            "ORDER-abc-1700000000000",
            "200",
            "25000.00",
            &KNOWN_SIGNATURE[..64],
        ));
    }

    #[test]
    fn gross_amount_is_compared_verbatim() {
        // Same numeric amount, different rendering: must fail.
        assert!(!verifier().verify(
            "ORDER-abc-1700000000000",
            "200",
            "25000.0",
            KNOWN_SIGNATURE,
        ));
    }

    #[test]
    fn constant_time_compare_handles_lengths() {
        assert!(constant_time_compare(b"abc", b"abc"));
        assert!(!constant_time_compare(b"abc", b"abd"));
        assert!(!constant_time_compare(b"abc", b"abcd"));
        assert!(constant_time_compare(b"", b""));
    }

    proptest! {
        // Flipping any single hex character of a valid signature must
        // make verification fail.
        #[test]
        fn single_character_mutation_invalidates_signature(pos in 0usize..128) {
            let sig = compute_test_signature(
                "ORDER-abc-1700000000000",
                "200",
                "25000.00",
                TEST_KEY,
            );
            let mut mutated: Vec<char> = sig.chars().collect();
            mutated[pos] = if mutated[pos] == '0' { '1' } else { '0' };
            let mutated: String = mutated.into_iter().collect();

            prop_assert!(!verifier().verify(
                "ORDER-abc-1700000000000",
                "200",
                "25000.00",
                &mutated,
            ));
        }
    }
}
