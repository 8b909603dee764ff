//! Notifications emitted for external observers and indexers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::primitives::{Address, Bytes, CardHash, Chips};

/// Events that occur as actions are applied to the engine or the round.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum GameEvent {
    PlayerJoined {
        player: Address,
        public_key: Bytes,
        memo: Bytes,
    },
    PlayerLeft(Address),
    DeckShuffled {
        player: Address,
        deck: Vec<Bytes>,
    },
    CardsRevealed {
        indexes: Vec<usize>,
        hashes: Vec<CardHash>,
    },
    PlayerDrew {
        player: Address,
        indexes: Vec<usize>,
    },
    ButtonPicked(Address),
    SmallBlindBet(Address, Chips),
    BigBlindBet(Address, Chips),
    PlayerCalled(Address, Chips),
    PlayerRaised(Address, Chips),
    PlayerChecked(Address),
    PlayerFolded(Address),
    PlayerShowed {
        player: Address,
        indexes: Vec<usize>,
    },
    GameEnded {
        winner: Option<Address>,
        amount: Chips,
    },
    GameTimeout {
        blamed: Address,
        forfeited: Chips,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PlayerJoined { player, .. } => format!("{player} joined the game"),
            Self::PlayerLeft(player) => format!("{player} left the game"),
            Self::DeckShuffled { player, deck } => {
                format!("{player} shuffled the deck ({} cards)", deck.len())
            }
            Self::CardsRevealed { indexes, .. } => format!("cards {indexes:?} revealed"),
            Self::PlayerDrew { player, indexes } => format!("{player} drew cards {indexes:?}"),
            Self::ButtonPicked(player) => format!("{player} has the button"),
            Self::SmallBlindBet(player, amount) => format!("{player} posted small blind ${amount}"),
            Self::BigBlindBet(player, amount) => format!("{player} posted big blind ${amount}"),
            Self::PlayerCalled(player, amount) => format!("{player} calls ${amount}"),
            Self::PlayerRaised(player, amount) => format!("{player} raises ${amount}"),
            Self::PlayerChecked(player) => format!("{player} checks"),
            Self::PlayerFolded(player) => format!("{player} folds"),
            Self::PlayerShowed { player, indexes } => format!("{player} shows cards {indexes:?}"),
            Self::GameEnded {
                winner: Some(winner),
                amount,
            } => format!("{winner} won ${amount}"),
            Self::GameEnded { winner: None, .. } => "game ended without a winner".to_string(),
            Self::GameTimeout { blamed, forfeited } => {
                format!("{blamed} timed out and forfeited ${forfeited}")
            }
        };
        write!(f, "{repr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let event = GameEvent::GameTimeout {
            blamed: Address::new("bob"),
            forfeited: 15,
        };
        assert_eq!(event.to_string(), "bob timed out and forfeited $15");
        let event = GameEvent::GameEnded {
            winner: None,
            amount: 0,
        };
        assert_eq!(event.to_string(), "game ended without a winner");
    }

    #[test]
    fn test_json_shape() {
        let event = GameEvent::PlayerCalled(Address::new("alice"), 10);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"PlayerCalled":["alice",10]}"#);
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
