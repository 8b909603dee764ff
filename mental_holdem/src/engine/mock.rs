//! An insecure stand-in for a real mental poker scheme.
//!
//! [`InsecureVerifier`] implements the verifier interface with hash
//! commitments and XOR masking so the engine and the round controller can be
//! driven end to end in tests, benches and the simulator. [`MockPlayer`] is
//! the matching client side: it produces keys, proofs, shuffles and reveal
//! tokens that the verifier accepts.
//!
//! Nothing here hides anything from anyone. The shared key is the XOR of the
//! public keys and a reveal token is the public key itself.
//!
//! Masked card layout: `nonce (8 bytes) || encoded XOR keystream(shared key)`.
//! Shuffles permute the cards and replace every nonce, which changes every
//! masked hash while leaving the payload untouched.

use rand::{Rng, seq::SliceRandom};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::{
    instance::GameInstance,
    verifier::{MentalPokerVerifier, VerifierError},
};
use crate::primitives::{Address, Bytes};

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 8;

/// Domain-separated SHA-256 over length-prefixed parts.
fn digest(domain: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

fn keystream_xor(key: &[u8], data: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(data.len());
    for (counter, chunk) in data.chunks(32).enumerate() {
        let block = digest(b"keystream", &[key, &(counter as u64).to_le_bytes()]);
        out.extend(chunk.iter().zip(block).map(|(byte, pad)| byte ^ pad));
    }
    out
}

fn xor_keys(keys: &[Bytes], what: &'static str) -> Result<[u8; KEY_LEN], VerifierError> {
    if keys.is_empty() {
        return Err(VerifierError::Malformed(what));
    }
    let mut acc = [0u8; KEY_LEN];
    for key in keys {
        if key.len() != KEY_LEN {
            return Err(VerifierError::Malformed(what));
        }
        for (a, b) in acc.iter_mut().zip(key) {
            *a ^= b;
        }
    }
    Ok(acc)
}

fn payload(masked: &[u8]) -> Option<&[u8]> {
    masked.get(NONCE_LEN..)
}

fn shuffle_digest(params: &[u8], shared_key: &[u8], current: &[Bytes], shuffled: &[Bytes]) -> [u8; 32] {
    let current = current.concat();
    let shuffled = shuffled.concat();
    digest(b"shuffle", &[params, shared_key, &current, &shuffled])
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InsecureVerifier;

impl MentalPokerVerifier for InsecureVerifier {
    fn verify_key_ownership(
        &self,
        params: &[u8],
        public_key: &[u8],
        memo: &[u8],
        key_proof: &[u8],
    ) -> bool {
        public_key.len() == KEY_LEN
            && ct_eq(key_proof, &digest(b"own", &[params, public_key, memo]))
    }

    fn compute_aggregate_key(&self, public_keys: &[Bytes]) -> Result<Bytes, VerifierError> {
        xor_keys(public_keys, "public key").map(|key| key.to_vec())
    }

    fn mask(
        &self,
        params: &[u8],
        shared_key: &[u8],
        encoded: &[u8],
    ) -> Result<Bytes, VerifierError> {
        if shared_key.len() != KEY_LEN {
            return Err(VerifierError::Malformed("shared key"));
        }
        let nonce = digest(b"nonce", &[params, encoded]);
        let mut masked = nonce[..NONCE_LEN].to_vec();
        masked.extend(keystream_xor(shared_key, encoded));
        Ok(masked)
    }

    fn verify_shuffle(
        &self,
        params: &[u8],
        shared_key: &[u8],
        current: &[Bytes],
        shuffled: &[Bytes],
        proof: &[u8],
    ) -> bool {
        if current.len() != shuffled.len()
            || !ct_eq(proof, &shuffle_digest(params, shared_key, current, shuffled))
        {
            return false;
        }
        let mut before: Vec<Option<&[u8]>> = current.iter().map(|card| payload(card)).collect();
        let mut after: Vec<Option<&[u8]>> = shuffled.iter().map(|card| payload(card)).collect();
        before.sort_unstable();
        after.sort_unstable();
        before == after && after.iter().all(Option::is_some)
    }

    fn verify_reveal(
        &self,
        params: &[u8],
        public_key: &[u8],
        token: &[u8],
        masked: &[u8],
        proof: &[u8],
    ) -> bool {
        ct_eq(token, public_key) && ct_eq(proof, &digest(b"reveal", &[params, public_key, masked]))
    }

    fn reveal(&self, tokens: &[Bytes], masked: &[u8]) -> Result<Bytes, VerifierError> {
        let key = xor_keys(tokens, "reveal token")?;
        let body = payload(masked).ok_or(VerifierError::Malformed("masked card"))?;
        Ok(keystream_xor(&key, body))
    }
}

/// Client-side counterpart of [`InsecureVerifier`].
#[derive(Clone, Debug)]
pub struct MockPlayer {
    address: Address,
    public_key: Bytes,
    memo: Bytes,
}

impl MockPlayer {
    /// Deterministic player derived from `name`, which also becomes the
    /// account address and the memo.
    pub fn new(name: &str) -> Self {
        let secret = digest(b"secret", &[name.as_bytes()]);
        Self::from_secret(name, secret)
    }

    /// Player with a random key.
    pub fn random<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Self {
        let mut secret = [0u8; 32];
        rng.fill(&mut secret);
        Self::from_secret(name, secret)
    }

    fn from_secret(name: &str, secret: [u8; 32]) -> Self {
        Self {
            address: Address::new(name),
            public_key: digest(b"public", &[&secret]).to_vec(),
            memo: name.as_bytes().to_vec(),
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Address::new(address);
        self
    }

    #[must_use]
    pub fn with_memo(mut self, memo: Bytes) -> Self {
        self.memo = memo;
        self
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address.clone()
    }

    #[must_use]
    pub fn public_key(&self) -> &Bytes {
        &self.public_key
    }

    #[must_use]
    pub fn memo(&self) -> &Bytes {
        &self.memo
    }

    #[must_use]
    pub fn key_proof(&self, params: &[u8]) -> Bytes {
        digest(b"own", &[params, &self.public_key, &self.memo]).to_vec()
    }

    /// Token and proof for a single masked card.
    #[must_use]
    pub fn reveal_token(&self, params: &[u8], masked: &[u8]) -> (Bytes, Bytes) {
        let proof = digest(b"reveal", &[params, &self.public_key, masked]);
        (self.public_key.clone(), proof.to_vec())
    }

    /// Tokens and proofs for a batch, in the order of `masked`.
    #[must_use]
    pub fn reveal_tokens(&self, params: &[u8], masked: &[Bytes]) -> (Vec<Bytes>, Vec<Bytes>) {
        masked
            .iter()
            .map(|card| self.reveal_token(params, card))
            .unzip()
    }

    /// Tokens and proofs for `indexes` of a live instance.
    #[must_use]
    pub fn reveal_tokens_at(
        &self,
        instance: &GameInstance,
        indexes: &[usize],
    ) -> (Vec<Bytes>, Vec<Bytes>) {
        let masked: Vec<Bytes> = indexes
            .iter()
            .filter_map(|index| instance.masked_card(*index).cloned())
            .collect();
        self.reveal_tokens(instance.params(), &masked)
    }

    /// Shuffle the current deck of a live instance.
    pub fn shuffle_instance<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        instance: &GameInstance,
    ) -> (Vec<Bytes>, Bytes) {
        let shared_key = instance.shared_key().unwrap_or_default();
        self.shuffle(rng, instance.params(), shared_key, &instance.masked_deck())
    }

    /// Permute and re-nonce `deck`, returning the new deck and its proof.
    pub fn shuffle<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        params: &[u8],
        shared_key: &[u8],
        deck: &[Bytes],
    ) -> (Vec<Bytes>, Bytes) {
        let mut shuffled = deck.to_vec();
        shuffled.shuffle(rng);
        for card in &mut shuffled {
            if let Some(nonce) = card.get_mut(..NONCE_LEN) {
                rng.fill(nonce);
            }
        }
        let proof = shuffle_digest(params, shared_key, deck, &shuffled).to_vec();
        (shuffled, proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    const PARAMS: &[u8] = b"params";

    fn shared_key(players: &[MockPlayer]) -> Bytes {
        let keys: Vec<Bytes> = players.iter().map(|p| p.public_key().clone()).collect();
        InsecureVerifier.compute_aggregate_key(&keys).unwrap()
    }

    #[test]
    fn test_key_proof_binds_memo() {
        let alice = MockPlayer::new("alice");
        let proof = alice.key_proof(PARAMS);
        assert!(InsecureVerifier.verify_key_ownership(PARAMS, alice.public_key(), alice.memo(), &proof));
        assert!(!InsecureVerifier.verify_key_ownership(PARAMS, alice.public_key(), b"other", &proof));
        assert!(!InsecureVerifier.verify_key_ownership(b"other", alice.public_key(), alice.memo(), &proof));
    }

    #[test]
    fn test_aggregate_key_rejects_malformed_keys() {
        assert_eq!(
            InsecureVerifier.compute_aggregate_key(&[]),
            Err(VerifierError::Malformed("public key"))
        );
        assert_eq!(
            InsecureVerifier.compute_aggregate_key(&[vec![1, 2, 3]]),
            Err(VerifierError::Malformed("public key"))
        );
    }

    #[test]
    fn test_all_tokens_unmask_a_card() {
        let players = [MockPlayer::new("a"), MockPlayer::new("b"), MockPlayer::new("c")];
        let key = shared_key(&players);
        let masked = InsecureVerifier.mask(PARAMS, &key, b"QH").unwrap();
        assert_ne!(masked[NONCE_LEN..], b"QH"[..]);

        let tokens: Vec<Bytes> = players
            .iter()
            .map(|p| {
                let (token, proof) = p.reveal_token(PARAMS, &masked);
                assert!(InsecureVerifier.verify_reveal(PARAMS, p.public_key(), &token, &masked, &proof));
                token
            })
            .collect();
        assert_eq!(InsecureVerifier.reveal(&tokens, &masked).unwrap(), b"QH".to_vec());
        assert_ne!(InsecureVerifier.reveal(&tokens[..2], &masked).unwrap(), b"QH".to_vec());
    }

    #[test]
    fn test_shuffle_proof_verifies() {
        let players = [MockPlayer::new("a"), MockPlayer::new("b")];
        let key = shared_key(&players);
        let deck: Vec<Bytes> = ["2C", "3C", "4C", "5C"]
            .iter()
            .map(|label| InsecureVerifier.mask(PARAMS, &key, label.as_bytes()).unwrap())
            .collect();

        let mut rng = StdRng::seed_from_u64(11);
        let (shuffled, proof) = players[0].shuffle(&mut rng, PARAMS, &key, &deck);
        assert!(InsecureVerifier.verify_shuffle(PARAMS, &key, &deck, &shuffled, &proof));
        assert!(shuffled.iter().all(|card| !deck.contains(card)));

        let mut tampered = shuffled.clone();
        tampered[0] = InsecureVerifier.mask(PARAMS, &key, b"AS").unwrap();
        let proof = shuffle_digest(PARAMS, &key, &deck, &tampered);
        assert!(!InsecureVerifier.verify_shuffle(PARAMS, &key, &deck, &tampered, &proof));
    }
}
