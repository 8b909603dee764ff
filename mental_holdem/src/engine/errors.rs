//! Card engine error types.

use thiserror::Error;

use super::verifier::VerifierError;
use crate::primitives::Address;

/// Errors raised by the card engine. Every error aborts the whole call.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum EngineError {
    #[error("{0} is not the controller of this game")]
    Unauthorized(Address),
    #[error("game is full")]
    GameFull,
    #[error("{0} already joined")]
    AlreadyJoined(Address),
    #[error("{0} is not a player")]
    NotAPlayer(Address),
    #[error("public key already registered by another player")]
    DuplicatePublicKey,
    #[error("memo already registered by another player")]
    DuplicateMemo,
    #[error("key ownership proof rejected for {0}")]
    InvalidKeyProof(Address),
    #[error("shared key is not available until the roster is full")]
    SharedKeyMissing,
    #[error("deck size mismatch: expected {expected}, got {got}")]
    DeckSizeMismatch { expected: usize, got: usize },
    #[error("shuffled deck contains a repeated masked card")]
    DuplicateMaskedCard,
    #[error("shuffle proof rejected for {0}")]
    InvalidShuffleProof(Address),
    #[error("card index {index} out of range for a {num_cards}-card deck")]
    IndexOutOfRange { index: usize, num_cards: usize },
    #[error("card {0} is already open")]
    CardAlreadyOpened(usize),
    #[error("card {0} is already used")]
    CardAlreadyUsed(usize),
    #[error("card {index} ownership claim (own = {claimed_own}) does not match the hand")]
    OwnershipMismatch { index: usize, claimed_own: bool },
    #[error("{player} already submitted a reveal token for card {index}")]
    DuplicateRevealToken { player: Address, index: usize },
    #[error("length mismatch: got {got} {what}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("reveal proof rejected for card {0}")]
    InvalidRevealProof(usize),
    #[error("no card indexes given")]
    EmptyIndexes,
    #[error("{0} already drew cards")]
    AlreadyDrew(Address),
    #[error("cheating detected: card {0} does not open to a known card")]
    IntegrityViolation(usize),
    #[error(transparent)]
    Verifier(#[from] VerifierError),
}

/// Result type for card engine operations
pub type EngineResult<T> = Result<T, EngineError>;
