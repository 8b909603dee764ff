//! Boundary to the zero-knowledge mental poker scheme.
//!
//! The engine never looks inside keys, ciphertexts, tokens or proofs. It
//! only hands them to a [`MentalPokerVerifier`] and hashes the results.

use std::fmt;
use thiserror::Error;

use crate::primitives::Bytes;

/// Failures of the non-boolean verifier operations.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VerifierError {
    #[error("malformed {0}")]
    Malformed(&'static str),
    #[error("verifier failure: {0}")]
    Other(String),
}

/// Cryptographic oracle consumed by the card engine.
///
/// Implementations must be pure: the same inputs always give the same
/// answer, and no call may depend on engine state.
pub trait MentalPokerVerifier: fmt::Debug + Send + Sync {
    /// Check that the caller knows the secret behind `public_key`. The memo
    /// is bound into the proof so a proof cannot be replayed under another
    /// memo.
    fn verify_key_ownership(
        &self,
        params: &[u8],
        public_key: &[u8],
        memo: &[u8],
        key_proof: &[u8],
    ) -> bool;

    /// Combine the joined players' keys, in roster order, into the shared
    /// key the deck is masked under.
    fn compute_aggregate_key(&self, public_keys: &[Bytes]) -> Result<Bytes, VerifierError>;

    /// Mask a plaintext card under the shared key.
    fn mask(&self, params: &[u8], shared_key: &[u8], encoded: &[u8])
    -> Result<Bytes, VerifierError>;

    /// Check that `shuffled` is a re-masked permutation of `current`.
    fn verify_shuffle(
        &self,
        params: &[u8],
        shared_key: &[u8],
        current: &[Bytes],
        shuffled: &[Bytes],
        proof: &[u8],
    ) -> bool;

    /// Check that `token` is the holder of `public_key`'s honest
    /// contribution towards unmasking `masked`.
    fn verify_reveal(
        &self,
        params: &[u8],
        public_key: &[u8],
        token: &[u8],
        masked: &[u8],
        proof: &[u8],
    ) -> bool;

    /// Combine one token per player to recover the plaintext of `masked`.
    fn reveal(&self, tokens: &[Bytes], masked: &[u8]) -> Result<Bytes, VerifierError>;
}
