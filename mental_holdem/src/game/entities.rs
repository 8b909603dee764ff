use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::primitives::{Address, Chips};

/// Type alias for seat indices, positions in the ordered player list
/// captured when the button is picked.
pub type SeatIndex = usize;

/// Round phases. Phases only ever move forward; `End` and `Timeout` are
/// terminal.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Phase {
    AwaitPlayers,
    PickButton,
    ShuffleDeck,
    SmallBlindBet,
    BigBlindBet,
    DrawCards,
    PreFlopBet,
    Flop,
    FlopBet,
    Turn,
    TurnBet,
    River,
    RiverBet,
    Showdown,
    End,
    Timeout,
}

impl Phase {
    /// The phase that follows in the normal course of a hand. Terminal
    /// phases map to themselves; `Timeout` is only reached by a purge.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::AwaitPlayers => Self::PickButton,
            Self::PickButton => Self::ShuffleDeck,
            Self::ShuffleDeck => Self::SmallBlindBet,
            Self::SmallBlindBet => Self::BigBlindBet,
            Self::BigBlindBet => Self::DrawCards,
            Self::DrawCards => Self::PreFlopBet,
            Self::PreFlopBet => Self::Flop,
            Self::Flop => Self::FlopBet,
            Self::FlopBet => Self::Turn,
            Self::Turn => Self::TurnBet,
            Self::TurnBet => Self::River,
            Self::River => Self::RiverBet,
            Self::RiverBet => Self::Showdown,
            Self::Showdown | Self::End => Self::End,
            Self::Timeout => Self::Timeout,
        }
    }

    #[must_use]
    pub fn is_betting(self) -> bool {
        matches!(
            self,
            Self::PreFlopBet | Self::FlopBet | Self::TurnBet | Self::RiverBet
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::End | Self::Timeout)
    }

    /// Between the first shuffle and the showdown, inclusive.
    #[must_use]
    pub fn is_in_hand(self) -> bool {
        (Self::ShuffleDeck..=Self::Showdown).contains(&self)
    }

    /// Community cards opened during this phase.
    #[must_use]
    pub fn cards_to_flip(self) -> usize {
        match self {
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::AwaitPlayers => "awaiting players",
            Self::PickButton => "picking the button",
            Self::ShuffleDeck => "shuffling",
            Self::SmallBlindBet => "small blind",
            Self::BigBlindBet => "big blind",
            Self::DrawCards => "drawing cards",
            Self::PreFlopBet => "pre-flop betting",
            Self::Flop => "flop",
            Self::FlopBet => "flop betting",
            Self::Turn => "turn",
            Self::TurnBet => "turn betting",
            Self::River => "river",
            Self::RiverBet => "river betting",
            Self::Showdown => "showdown",
            Self::End => "ended",
            Self::Timeout => "timed out",
        };
        write!(f, "{repr}")
    }
}

/// Betting and turn state of a single hand.
///
/// The per-seat vectors (`bets`, `done`) are sized when the button is picked
/// and indexed by [`SeatIndex`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoundState {
    pub game_id: Uuid,
    pub phase: Phase,
    pub players: Vec<Address>,
    pub button: SeatIndex,
    pub player_to_act: SeatIndex,
    pub deadline: Option<DateTime<Utc>>,
    pub pot: Chips,
    /// Cumulative bet of each seat over the whole hand
    pub bets: Vec<Chips>,
    /// Folded or timed out
    pub done: Vec<bool>,
    /// Seat holding the bet to match; reaching it again closes the street
    pub who_raised: SeatIndex,
    pub who_showed: Option<SeatIndex>,
    pub winner: Option<Address>,
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            game_id: Uuid::new_v4(),
            phase: Phase::AwaitPlayers,
            players: Vec::new(),
            button: 0,
            player_to_act: 0,
            deadline: None,
            pot: 0,
            bets: Vec::new(),
            done: Vec::new(),
            who_raised: 0,
            who_showed: None,
            winner: None,
        }
    }

    /// Fix the seat order for the hand.
    pub fn seat_players(&mut self, players: Vec<Address>) {
        self.bets = vec![0; players.len()];
        self.done = vec![false; players.len()];
        self.players = players;
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn seat_of(&self, player: &Address) -> Option<SeatIndex> {
        self.players.iter().position(|p| p == player)
    }

    #[must_use]
    pub fn is_active(&self, seat: SeatIndex) -> bool {
        self.done.get(seat).is_some_and(|done| !done)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.done.iter().filter(|done| !**done).count()
    }

    pub fn active_seats(&self) -> impl Iterator<Item = SeatIndex> + '_ {
        (0..self.players.len()).filter(|seat| self.is_active(*seat))
    }

    /// First not-done seat strictly after `from`, wrapping. Returns `from`
    /// when no other seat is active.
    #[must_use]
    pub fn next_active(&self, from: SeatIndex) -> SeatIndex {
        let n = self.players.len();
        (1..=n)
            .map(|offset| (from + offset) % n)
            .find(|seat| self.is_active(*seat))
            .unwrap_or(from)
    }

    /// The button if it is still active, else the next active seat.
    #[must_use]
    pub fn first_active_from_button(&self) -> SeatIndex {
        if self.is_active(self.button) {
            self.button
        } else {
            self.next_active(self.button)
        }
    }

    #[must_use]
    pub fn small_blind_seat(&self) -> SeatIndex {
        (self.button + 1) % self.players.len().max(1)
    }

    #[must_use]
    pub fn big_blind_seat(&self) -> SeatIndex {
        (self.button + 2) % self.players.len().max(1)
    }

    /// Dealing position relative to the button; the small blind is 0 and the
    /// button is last.
    #[must_use]
    pub fn position(&self, seat: SeatIndex) -> usize {
        let n = self.players.len().max(1);
        (seat + n - self.button % n - 1) % n
    }

    #[must_use]
    pub fn bet_to_match(&self) -> Chips {
        self.bets.get(self.who_raised).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn bet_of(&self, seat: SeatIndex) -> Chips {
        self.bets.get(seat).copied().unwrap_or(0)
    }
}

/// One seat as seen from outside.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SeatView {
    pub player: Address,
    pub bet: Chips,
    pub done: bool,
    /// Labels of the seat's opened hole cards
    pub hole_cards: Vec<String>,
}

/// Serializable snapshot of a round.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoundView {
    pub game_id: Uuid,
    pub phase: Phase,
    pub seats: Vec<SeatView>,
    pub button: Option<Address>,
    pub player_to_act: Option<Address>,
    pub deadline: Option<DateTime<Utc>>,
    pub pot: Chips,
    pub bet_to_match: Chips,
    /// Labels of the opened community cards, in dealing order
    pub board: Vec<String>,
    pub winner: Option<Address>,
}
