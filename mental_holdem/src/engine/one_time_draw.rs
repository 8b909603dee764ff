//! A game instance where every player claims their whole hand in one draw.

use log::debug;
use std::{
    collections::HashSet,
    ops::{Deref, DerefMut},
};

use super::{
    errors::{EngineError, EngineResult},
    instance::{GameInstance, ensure_len},
};
use crate::{
    events::GameEvent,
    primitives::{Address, Bytes},
};

/// [`GameInstance`] plus the draw, fold and show-hand flows.
///
/// Everything the base instance offers is reachable through `Deref`.
#[derive(Clone, Debug)]
pub struct OneTimeDrawInstance {
    inner: GameInstance,
}

impl OneTimeDrawInstance {
    pub fn new(inner: GameInstance) -> Self {
        Self { inner }
    }

    /// Claim `my_indexes` as `player`'s hand and hand over the player's
    /// reveal tokens for `others_indexes`, the other players' private cards.
    ///
    /// The hand keeps the order given here. Fails without side effects if
    /// the player already drew, if `my_indexes` is empty or if any own index
    /// is out of range or already used.
    pub fn draw_cards_and_submit_reveal_tokens(
        &mut self,
        caller: &Address,
        player: &Address,
        my_indexes: &[usize],
        others_indexes: &[usize],
        tokens: Vec<Bytes>,
        proofs: &[Bytes],
    ) -> EngineResult<()> {
        self.inner.ensure_controller(caller)?;
        let record = self.inner.ensure_joined(player)?;
        if record.has_drawn() {
            return Err(EngineError::AlreadyDrew(player.clone()));
        }
        if my_indexes.is_empty() {
            return Err(EngineError::EmptyIndexes);
        }
        let mut seen = HashSet::with_capacity(my_indexes.len());
        for &index in my_indexes {
            self.inner.ensure_index(index)?;
            if self.inner.is_used(index) || !seen.insert(index) {
                return Err(EngineError::CardAlreadyUsed(index));
            }
        }

        // The hand has to be in place for the ownership check on
        // `others_indexes`, so undo it if the tokens are refused.
        self.inner.assign_hand(player, my_indexes.to_vec());
        if let Err(err) =
            self.inner
                .add_reveal_tokens(caller, player, false, others_indexes, tokens, proofs)
        {
            self.inner.assign_hand(player, Vec::new());
            return Err(err);
        }

        debug!("{player} drew {my_indexes:?}");
        self.inner.emit(GameEvent::PlayerDrew {
            player: player.clone(),
            indexes: my_indexes.to_vec(),
        });
        Ok(())
    }

    /// Surrender the folding player's tokens for cards that are still
    /// secret, so the rest of the table can keep opening them.
    pub fn fold_cards(
        &mut self,
        caller: &Address,
        player: &Address,
        unrevealed_indexes: &[usize],
        tokens: Vec<Bytes>,
        proofs: &[Bytes],
    ) -> EngineResult<()> {
        self.inner.ensure_controller(caller)?;
        self.inner.ensure_joined(player)?;
        ensure_len("reveal tokens", unrevealed_indexes.len(), tokens.len())?;
        ensure_len("reveal proofs", unrevealed_indexes.len(), proofs.len())?;
        if unrevealed_indexes.is_empty() {
            return Ok(());
        }
        self.inner
            .add_reveal_tokens(caller, player, false, unrevealed_indexes, tokens, proofs)
    }

    /// Reveal the player's own cards.
    pub fn show_hand(
        &mut self,
        caller: &Address,
        player: &Address,
        indexes: &[usize],
        tokens: Vec<Bytes>,
        proofs: &[Bytes],
    ) -> EngineResult<()> {
        self.inner.ensure_controller(caller)?;
        self.inner.ensure_joined(player)?;
        if indexes.is_empty() {
            return Err(EngineError::EmptyIndexes);
        }
        self.inner
            .add_reveal_tokens(caller, player, true, indexes, tokens, proofs)
    }
}

impl Deref for OneTimeDrawInstance {
    type Target = GameInstance;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for OneTimeDrawInstance {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
