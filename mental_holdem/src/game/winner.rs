//! Winner decision at showdown.
//!
//! Hand ranking lives outside this crate. The round hands a
//! [`WinnerDecider`] everything that is public at showdown and pays whoever
//! it names.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::primitives::Address;

/// A hand that is still in at showdown.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ShownHand {
    pub player: Address,
    /// Opened hole card labels; empty for a player who never showed
    pub hole_cards: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ShowdownView {
    pub hands: Vec<ShownHand>,
    pub board: Vec<String>,
}

pub trait WinnerDecider: fmt::Debug + Send + Sync {
    /// Pick the winner among `showdown.hands`, or `None` for no winner.
    fn decide_winner(&self, showdown: &ShowdownView) -> Option<Address>;
}

/// Never names a winner.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoWinner;

impl WinnerDecider for NoWinner {
    fn decide_winner(&self, _showdown: &ShowdownView) -> Option<Address> {
        None
    }
}
