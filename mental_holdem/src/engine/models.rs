//! Card, player and reveal-token records held by the card engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::primitives::{Address, Bytes, CardHash};

const RANKS: [char; 13] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
];
const SUITS: [char; 4] = ['C', 'D', 'H', 'S'];

/// A plaintext card: its canonical label and the encoding the mental
/// poker scheme masks.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayingCard {
    pub label: String,
    pub encoded: Bytes,
}

impl PlayingCard {
    pub fn new(label: &str, encoded: Bytes) -> Self {
        Self {
            label: label.to_string(),
            encoded,
        }
    }

    /// Standard 52-card deck labelled `2C` through `AS`. The encoding is the
    /// label itself, which is what the reference verifier expects. Schemes
    /// that encode cards as group elements supply their own card set.
    #[must_use]
    pub fn standard_deck() -> Vec<PlayingCard> {
        let mut deck = Vec::with_capacity(52);
        for rank in RANKS {
            for suit in SUITS {
                let label = format!("{rank}{suit}");
                let encoded = label.as_bytes().to_vec();
                deck.push(Self { label, encoded });
            }
        }
        deck
    }

    #[must_use]
    pub fn hash(&self) -> CardHash {
        CardHash::of(&self.encoded)
    }
}

impl fmt::Display for PlayingCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// One deck slot. `masked` points into the engine's masked-card map and
/// changes on every shuffle.
#[derive(Clone, Debug)]
pub struct Card {
    pub masked: CardHash,
}

/// A joined player.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub account: Address,
    pub public_key: Bytes,
    pub memo: Bytes,
    /// Deck indexes of the player's hand, in the order they were drawn.
    pub hand_indexes: Vec<usize>,
}

impl PlayerRecord {
    pub fn new(account: Address, public_key: Bytes, memo: Bytes) -> Self {
        Self {
            account,
            public_key,
            memo,
            hand_indexes: Vec::with_capacity(2),
        }
    }

    #[must_use]
    pub fn has_drawn(&self) -> bool {
        !self.hand_indexes.is_empty()
    }

    #[must_use]
    pub fn holds(&self, index: usize) -> bool {
        self.hand_indexes.contains(&index)
    }
}

/// A single player's reveal token for one card.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RevealContribution {
    pub player: Address,
    pub token: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_deck_has_52_unique_cards() {
        let deck = PlayingCard::standard_deck();
        assert_eq!(deck.len(), 52);
        let labels: HashSet<_> = deck.iter().map(|c| c.label.clone()).collect();
        assert_eq!(labels.len(), 52);
        let hashes: HashSet<_> = deck.iter().map(PlayingCard::hash).collect();
        assert_eq!(hashes.len(), 52);
    }

    #[test]
    fn test_standard_deck_labels() {
        let deck = PlayingCard::standard_deck();
        assert_eq!(deck[0].label, "2C");
        assert_eq!(deck[51].label, "AS");
        assert!(deck.iter().any(|c| c.label == "TH"));
    }

    #[test]
    fn test_player_record_hand() {
        let mut player = PlayerRecord::new("alice".into(), vec![1], vec![2]);
        assert!(!player.has_drawn());
        player.hand_indexes = vec![4, 5];
        assert!(player.has_drawn());
        assert!(player.holds(5));
        assert!(!player.holds(6));
    }
}
