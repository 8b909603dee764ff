//! The generic mental poker game instance.
//!
//! Owns the masked deck, the player roster with its aggregate key, and the
//! reveal protocol. Every mutation that touches card material is gated by a
//! proof check against the [`MentalPokerVerifier`], and every mutation is
//! restricted to the instance's controller.

use log::{debug, info, warn};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    mem,
    sync::Arc,
};

use super::{
    errors::{EngineError, EngineResult},
    models::{Card, PlayerRecord, PlayingCard, RevealContribution},
    verifier::MentalPokerVerifier,
};
use crate::{
    events::GameEvent,
    primitives::{Address, Bytes, CardHash},
};

/// Masked deck plus the `masked hash -> masked bytes` map that mirrors it.
type MaskedDeck = (Vec<Card>, HashMap<CardHash, Bytes>);

#[derive(Clone, Debug)]
pub struct GameInstance {
    controller: Address,
    verifier: Arc<dyn MentalPokerVerifier>,
    /// Plaintext cards the deck is regenerated from on every reset.
    card_set: Vec<PlayingCard>,
    /// Plaintext hash to label, used to resolve opened cards.
    card_labels: HashMap<CardHash, String>,
    params: Bytes,
    num_players: usize,
    /// Join order. Removal swaps the last player into the vacated slot.
    roster: Vec<Address>,
    players: HashMap<Address, PlayerRecord>,
    shared_key: Option<Bytes>,
    deck: Vec<Card>,
    /// Keys are always exactly the masked hashes referenced by `deck`.
    masked_cards: HashMap<CardHash, Bytes>,
    reveal_tokens: BTreeMap<usize, Vec<RevealContribution>>,
    opened_cards: BTreeMap<usize, CardHash>,
    used_cards: BTreeSet<usize>,
    events: VecDeque<GameEvent>,
}

impl GameInstance {
    /// Create an instance controlled by `controller` and set it up for
    /// `num_players` players.
    pub fn new(
        controller: Address,
        verifier: Arc<dyn MentalPokerVerifier>,
        card_set: Vec<PlayingCard>,
        params: Bytes,
        num_players: usize,
    ) -> EngineResult<Self> {
        let card_labels = card_set
            .iter()
            .map(|card| (card.hash(), card.label.clone()))
            .collect();
        let mut instance = Self {
            controller: controller.clone(),
            verifier,
            card_set,
            card_labels,
            params: Bytes::new(),
            num_players: 0,
            roster: Vec::new(),
            players: HashMap::new(),
            shared_key: None,
            deck: Vec::new(),
            masked_cards: HashMap::new(),
            reveal_tokens: BTreeMap::new(),
            opened_cards: BTreeMap::new(),
            used_cards: BTreeSet::new(),
            events: VecDeque::new(),
        };
        instance.reset_game(&controller, params, num_players)?;
        Ok(instance)
    }

    /// Clear the roster and all reveal state, then regenerate the initial
    /// deck. Without a shared key the mask is a no-op.
    pub fn reset_game(
        &mut self,
        caller: &Address,
        params: Bytes,
        num_players: usize,
    ) -> EngineResult<()> {
        self.ensure_controller(caller)?;

        self.params = params;
        self.num_players = num_players;
        self.roster.clear();
        self.players.clear();
        self.shared_key = None;
        self.reveal_tokens.clear();
        self.opened_cards.clear();
        self.used_cards.clear();
        let (deck, masked_cards) = self.build_deck(None)?;
        self.deck = deck;
        self.masked_cards = masked_cards;

        info!(
            "Game reset for {} players with a {}-card deck",
            self.num_players,
            self.deck.len()
        );
        Ok(())
    }

    pub fn join_game(
        &mut self,
        caller: &Address,
        player: &Address,
        public_key: Bytes,
        memo: Bytes,
        key_proof: &[u8],
    ) -> EngineResult<()> {
        self.ensure_controller(caller)?;

        if self.is_full() {
            return Err(EngineError::GameFull);
        }
        if self.players.contains_key(player) {
            return Err(EngineError::AlreadyJoined(player.clone()));
        }
        for other in self.players.values() {
            if other.public_key == public_key {
                return Err(EngineError::DuplicatePublicKey);
            }
            if other.memo == memo {
                return Err(EngineError::DuplicateMemo);
            }
        }
        if !self
            .verifier
            .verify_key_ownership(&self.params, &public_key, &memo, key_proof)
        {
            return Err(EngineError::InvalidKeyProof(player.clone()));
        }

        // Everything fallible runs before the roster changes.
        let mut keys: Vec<Bytes> = self
            .roster
            .iter()
            .filter_map(|account| self.players.get(account))
            .map(|record| record.public_key.clone())
            .collect();
        keys.push(public_key.clone());
        let completed = if keys.len() == self.num_players {
            let shared_key = self.verifier.compute_aggregate_key(&keys)?;
            let masked = self.build_deck(Some(&shared_key))?;
            Some((shared_key, masked))
        } else {
            None
        };

        self.roster.push(player.clone());
        self.players.insert(
            player.clone(),
            PlayerRecord::new(player.clone(), public_key.clone(), memo.clone()),
        );
        self.emit(GameEvent::PlayerJoined {
            player: player.clone(),
            public_key,
            memo,
        });

        if let Some((shared_key, (deck, masked_cards))) = completed {
            self.shared_key = Some(shared_key);
            self.deck = deck;
            self.masked_cards = masked_cards;
            info!("Roster full, deck masked under the shared key");
        }
        Ok(())
    }

    pub fn leave_game(&mut self, caller: &Address, player: &Address) -> EngineResult<()> {
        self.ensure_controller(caller)?;

        if self.players.remove(player).is_none() {
            return Err(EngineError::NotAPlayer(player.clone()));
        }
        if let Some(pos) = self.roster.iter().position(|account| account == player) {
            self.roster.swap_remove(pos);
        }
        self.shared_key = None;
        self.emit(GameEvent::PlayerLeft(player.clone()));
        Ok(())
    }

    /// Replace every masked card with `shuffled` once the shuffle proof
    /// verifies. On any failure the deck is left untouched.
    pub fn shuffle_deck(
        &mut self,
        caller: &Address,
        player: &Address,
        shuffled: Vec<Bytes>,
        shuffle_proof: &[u8],
    ) -> EngineResult<()> {
        self.ensure_controller(caller)?;
        self.ensure_joined(player)?;
        let shared_key = self
            .shared_key
            .as_ref()
            .ok_or(EngineError::SharedKeyMissing)?;

        if shuffled.len() != self.deck.len() {
            return Err(EngineError::DeckSizeMismatch {
                expected: self.deck.len(),
                got: shuffled.len(),
            });
        }
        let hashes: Vec<CardHash> = shuffled.iter().map(|masked| CardHash::of(masked)).collect();
        if hashes.iter().collect::<HashSet<_>>().len() != hashes.len() {
            return Err(EngineError::DuplicateMaskedCard);
        }
        let current = self.masked_deck();
        if !self.verifier.verify_shuffle(
            &self.params,
            shared_key,
            &current,
            &shuffled,
            shuffle_proof,
        ) {
            warn!("Rejected shuffle proof from {player}");
            return Err(EngineError::InvalidShuffleProof(player.clone()));
        }

        for card in &self.deck {
            self.masked_cards.remove(&card.masked);
        }
        for ((card, hash), masked) in self.deck.iter_mut().zip(hashes).zip(&shuffled) {
            card.masked = hash;
            self.masked_cards.insert(hash, masked.clone());
        }

        debug!("{player} shuffled the deck");
        self.emit(GameEvent::DeckShuffled {
            player: player.clone(),
            deck: shuffled,
        });
        Ok(())
    }

    /// Record `player`'s reveal tokens for `indexes`.
    ///
    /// `revealing_own_cards` must agree with whether each index is in the
    /// player's hand, so nobody can reveal their own hole cards through the
    /// path meant for other players' cards or the other way around. When
    /// every index of the batch reaches a full set of tokens, those cards
    /// are opened within the same call.
    pub fn add_reveal_tokens(
        &mut self,
        caller: &Address,
        player: &Address,
        revealing_own_cards: bool,
        indexes: &[usize],
        tokens: Vec<Bytes>,
        proofs: &[Bytes],
    ) -> EngineResult<()> {
        self.ensure_controller(caller)?;
        let record = self.ensure_joined(player)?;
        ensure_len("reveal tokens", indexes.len(), tokens.len())?;
        ensure_len("reveal proofs", indexes.len(), proofs.len())?;

        let mut seen = HashSet::with_capacity(indexes.len());
        for ((&index, token), proof) in indexes.iter().zip(&tokens).zip(proofs) {
            let masked = self.masked_bytes(index)?;
            if self.opened_cards.contains_key(&index) {
                return Err(EngineError::CardAlreadyOpened(index));
            }
            if record.holds(index) != revealing_own_cards {
                return Err(EngineError::OwnershipMismatch {
                    index,
                    claimed_own: revealing_own_cards,
                });
            }
            let already_given = self
                .reveal_tokens
                .get(&index)
                .is_some_and(|set| set.iter().any(|c| &c.player == player));
            if already_given || !seen.insert(index) {
                return Err(EngineError::DuplicateRevealToken {
                    player: player.clone(),
                    index,
                });
            }
            if !self
                .verifier
                .verify_reveal(&self.params, &record.public_key, token, masked, proof)
            {
                warn!("Rejected reveal proof from {player} for card {index}");
                return Err(EngineError::InvalidRevealProof(index));
            }
        }

        // Open the batch before committing any token, so an integrity
        // failure leaves no trace.
        let completes = indexes
            .iter()
            .all(|index| self.contribution_count(*index) + 1 == self.num_players);
        let mut opened = Vec::new();
        if completes {
            for (&index, token) in indexes.iter().zip(&tokens) {
                let hash = self.open_card(index, token)?;
                opened.push((index, hash));
            }
        }

        for (&index, token) in indexes.iter().zip(tokens) {
            self.reveal_tokens
                .entry(index)
                .or_default()
                .push(RevealContribution {
                    player: player.clone(),
                    token,
                });
        }
        debug!("{player} submitted reveal tokens for cards {indexes:?}");

        if !opened.is_empty() {
            opened.sort_by_key(|(index, _)| *index);
            for (index, hash) in &opened {
                self.opened_cards.insert(*index, *hash);
            }
            let (indexes, hashes) = opened.into_iter().unzip();
            self.emit(GameEvent::CardsRevealed { indexes, hashes });
        }
        Ok(())
    }

    /// Mark cards as consumed by the round. Marking a used card again is
    /// rejected rather than counted twice.
    pub fn set_used(&mut self, caller: &Address, indexes: &[usize]) -> EngineResult<()> {
        self.ensure_controller(caller)?;

        let mut seen = HashSet::with_capacity(indexes.len());
        for &index in indexes {
            self.ensure_index(index)?;
            if self.used_cards.contains(&index) || !seen.insert(index) {
                return Err(EngineError::CardAlreadyUsed(index));
            }
        }
        self.used_cards.extend(indexes.iter().copied());
        Ok(())
    }

    pub fn drain_events(&mut self) -> VecDeque<GameEvent> {
        mem::take(&mut self.events)
    }

    #[must_use]
    pub fn controller(&self) -> &Address {
        &self.controller
    }

    #[must_use]
    pub fn params(&self) -> &[u8] {
        &self.params
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.num_players
    }

    #[must_use]
    pub fn num_cards(&self) -> usize {
        self.deck.len()
    }

    /// Joined players in roster order.
    #[must_use]
    pub fn players(&self) -> &[Address] {
        &self.roster
    }

    #[must_use]
    pub fn player(&self, account: &Address) -> Option<&PlayerRecord> {
        self.players.get(account)
    }

    #[must_use]
    pub fn is_joined(&self, account: &Address) -> bool {
        self.players.contains_key(account)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.roster.len() >= self.num_players
    }

    #[must_use]
    pub fn shared_key(&self) -> Option<&[u8]> {
        self.shared_key.as_deref()
    }

    /// Hash of the masked card currently at `index`.
    #[must_use]
    pub fn card_hash(&self, index: usize) -> Option<CardHash> {
        self.deck.get(index).map(|card| card.masked)
    }

    #[must_use]
    pub fn masked_card(&self, index: usize) -> Option<&Bytes> {
        self.card_hash(index)
            .and_then(|hash| self.masked_cards.get(&hash))
    }

    /// The whole masked deck in index order.
    #[must_use]
    pub fn masked_deck(&self) -> Vec<Bytes> {
        self.deck
            .iter()
            .filter_map(|card| self.masked_cards.get(&card.masked).cloned())
            .collect()
    }

    #[must_use]
    pub fn is_open(&self, index: usize) -> bool {
        self.opened_cards.contains_key(&index)
    }

    /// Plaintext hash of an opened card, `None` while it is still secret.
    #[must_use]
    pub fn opened_card(&self, index: usize) -> Option<CardHash> {
        self.opened_cards.get(&index).copied()
    }

    /// Label (e.g. `"QH"`) of an opened card.
    #[must_use]
    pub fn card_label(&self, index: usize) -> Option<&str> {
        self.opened_cards
            .get(&index)
            .and_then(|hash| self.card_labels.get(hash))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_used(&self, index: usize) -> bool {
        self.used_cards.contains(&index)
    }

    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used_cards.len()
    }

    #[must_use]
    pub fn reveal_tokens(&self, index: usize) -> &[RevealContribution] {
        self.reveal_tokens
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True iff every listed card holds a token from every player.
    #[must_use]
    pub fn ready_to_reveal(&self, indexes: &[usize]) -> bool {
        indexes
            .iter()
            .all(|index| self.contribution_count(*index) == self.num_players)
    }

    pub(crate) fn ensure_controller(&self, caller: &Address) -> EngineResult<()> {
        if caller == &self.controller {
            Ok(())
        } else {
            Err(EngineError::Unauthorized(caller.clone()))
        }
    }

    pub(crate) fn ensure_joined(&self, player: &Address) -> EngineResult<PlayerRecord> {
        self.players
            .get(player)
            .cloned()
            .ok_or_else(|| EngineError::NotAPlayer(player.clone()))
    }

    pub(crate) fn ensure_index(&self, index: usize) -> EngineResult<()> {
        if index < self.deck.len() {
            Ok(())
        } else {
            Err(EngineError::IndexOutOfRange {
                index,
                num_cards: self.deck.len(),
            })
        }
    }

    pub(crate) fn assign_hand(&mut self, player: &Address, indexes: Vec<usize>) {
        if let Some(record) = self.players.get_mut(player) {
            record.hand_indexes = indexes;
        }
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    fn masked_bytes(&self, index: usize) -> EngineResult<&Bytes> {
        self.ensure_index(index)?;
        self.masked_card(index).ok_or(EngineError::IndexOutOfRange {
            index,
            num_cards: self.deck.len(),
        })
    }

    fn contribution_count(&self, index: usize) -> usize {
        self.reveal_tokens.get(&index).map_or(0, Vec::len)
    }

    /// Combine the stored tokens for `index` with `last_token` and resolve
    /// the plaintext against the known card hashes.
    fn open_card(&self, index: usize, last_token: &Bytes) -> EngineResult<CardHash> {
        let mut tokens: Vec<Bytes> = self
            .reveal_tokens(index)
            .iter()
            .map(|contribution| contribution.token.clone())
            .collect();
        tokens.push(last_token.clone());

        let masked = self.masked_bytes(index)?;
        let plaintext = self.verifier.reveal(&tokens, masked)?;
        let hash = CardHash::of(&plaintext);
        if !self.card_labels.contains_key(&hash) {
            warn!("Card {index} opened to an unknown plaintext");
            return Err(EngineError::IntegrityViolation(index));
        }
        Ok(hash)
    }

    fn build_deck(&self, shared_key: Option<&[u8]>) -> EngineResult<MaskedDeck> {
        let mut deck = Vec::with_capacity(self.card_set.len());
        let mut masked_cards = HashMap::with_capacity(self.card_set.len());
        for card in &self.card_set {
            let masked = match shared_key {
                Some(key) => self.verifier.mask(&self.params, key, &card.encoded)?,
                None => card.encoded.clone(),
            };
            let hash = CardHash::of(&masked);
            if masked_cards.insert(hash, masked).is_some() {
                return Err(EngineError::DuplicateMaskedCard);
            }
            deck.push(Card { masked: hash });
        }
        Ok((deck, masked_cards))
    }
}

pub(crate) fn ensure_len(what: &'static str, expected: usize, got: usize) -> EngineResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(EngineError::LengthMismatch {
            what,
            expected,
            got,
        })
    }
}
