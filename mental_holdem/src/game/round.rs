//! The Texas Hold'em round controller.
//!
//! Sequences one hand from joining to payout on top of a
//! [`OneTimeDrawInstance`]. Every public action is all-or-nothing: the
//! engine, the round state, the treasury and the event queue are restored if
//! any step fails.
//!
//! Card layout for `n` players: hole cards of the player at dealing position
//! `p` (small blind is 0, button is `n - 1`) sit at `2p` and `2p + 1`, and
//! the five community cards follow at `2n..2n + 5`.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::{collections::VecDeque, mem, sync::Arc};

use super::{
    clock::Clock,
    entities::{Phase, RoundState, RoundView, SeatIndex, SeatView},
    errors::{RoundError, RoundResult},
    winner::{NoWinner, ShowdownView, ShownHand, WinnerDecider},
};
use crate::{
    config::{COMMUNITY_CARDS, HOLE_CARDS, RoundConfig},
    engine::{GameInstance, MentalPokerVerifier, OneTimeDrawInstance, PlayingCard},
    events::GameEvent,
    primitives::{Address, Bytes, Chips},
    wallet::{EntryType, Treasury},
};

/// Identity the round uses as the controller of its card engine.
pub const ROUND_ADDRESS: &str = "texas-holdem-round";

#[derive(Debug)]
pub struct TexasHoldemRound {
    admin: Address,
    address: Address,
    config: RoundConfig,
    engine: OneTimeDrawInstance,
    treasury: Treasury,
    state: RoundState,
    clock: Arc<dyn Clock>,
    decider: Arc<dyn WinnerDecider>,
    events: VecDeque<GameEvent>,
}

impl TexasHoldemRound {
    /// Create a new round awaiting players
    ///
    /// # Arguments
    ///
    /// * `admin` - Account allowed to pick the button and reset the game
    /// * `config` - Stakes and timing, validated here
    /// * `verifier` - Proof system backing the card engine
    /// * `params` - Public parameters of the proof system
    /// * `clock` - Time source for turn deadlines
    pub fn new(
        admin: Address,
        config: RoundConfig,
        verifier: Arc<dyn MentalPokerVerifier>,
        params: Bytes,
        clock: Arc<dyn Clock>,
    ) -> RoundResult<Self> {
        config.validate()?;
        let address = Address::new(ROUND_ADDRESS);
        let instance = GameInstance::new(
            address.clone(),
            verifier,
            PlayingCard::standard_deck(),
            params,
            config.num_players,
        )?;

        Ok(Self {
            admin,
            address,
            engine: OneTimeDrawInstance::new(instance),
            treasury: Treasury::new(config.house.clone()),
            state: RoundState::new(),
            clock,
            decider: Arc::new(NoWinner),
            events: VecDeque::new(),
            config,
        })
    }

    #[must_use]
    pub fn with_decider(mut self, decider: Arc<dyn WinnerDecider>) -> Self {
        self.decider = decider;
        self
    }

    #[must_use]
    pub fn admin(&self) -> &Address {
        &self.admin
    }

    /// Controller identity expected by the card engine.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    #[must_use]
    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    #[must_use]
    pub fn engine(&self) -> &OneTimeDrawInstance {
        &self.engine
    }

    #[must_use]
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    #[must_use]
    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The player whose turn it is, while a hand is running.
    #[must_use]
    pub fn player_to_act(&self) -> Option<&Address> {
        if self.state.phase.is_in_hand() {
            self.state.players.get(self.state.player_to_act)
        } else {
            None
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.state.deadline
    }

    pub fn drain_events(&mut self) -> VecDeque<GameEvent> {
        mem::take(&mut self.events)
    }

    /// Credit chips to an account so it can pay fees and bets.
    pub fn deposit(&mut self, account: &Address, amount: Chips) -> RoundResult<Chips> {
        let now = self.clock.now();
        Ok(self.treasury.deposit(account, amount, now)?)
    }

    /// Card indexes `player` has to submit reveal tokens for in the current
    /// phase: other players' hole cards when drawing, the still-secret board
    /// when folding during betting, the cards being flipped, or the player's
    /// own hole cards at showdown.
    pub fn required_reveal_indexes(&self, player: &Address) -> RoundResult<Vec<usize>> {
        let seat = self
            .state
            .seat_of(player)
            .ok_or_else(|| RoundError::NotAPlayer(player.clone()))?;
        let phase = self.state.phase;
        match phase {
            Phase::DrawCards => Ok(self.hole_card_indexes(seat).1),
            Phase::Flop | Phase::Turn | Phase::River => Ok(self.flip_indexes()),
            Phase::Showdown => Ok(self.hole_card_indexes(seat).0),
            _ if phase.is_betting() => Ok(self.unrevealed_board()),
            _ => Err(RoundError::InvalidPhase(phase)),
        }
    }

    /// Replace the card engine. The new engine must be controlled by this
    /// round, seat `config.num_players` and have nobody joined yet. No hand
    /// may be in progress.
    pub fn set_card_engine(
        &mut self,
        caller: &Address,
        engine: OneTimeDrawInstance,
    ) -> RoundResult<()> {
        self.ensure_admin(caller)?;
        let idle = self.state.phase.is_terminal()
            || (self.state.phase == Phase::AwaitPlayers && self.engine.players().is_empty());
        if !idle {
            return Err(RoundError::InvalidPhase(self.state.phase));
        }
        if engine.controller() != &self.address {
            return Err(RoundError::ForeignEngine(engine.controller().clone()));
        }
        if engine.num_players() != self.config.num_players {
            return Err(RoundError::EngineSize {
                expected: self.config.num_players,
                got: engine.num_players(),
            });
        }
        if !engine.players().is_empty() {
            return Err(RoundError::EngineInUse(engine.players().len()));
        }
        self.engine = engine;
        info!("Card engine replaced");
        Ok(())
    }

    /// Start over with new parameters. Only allowed once the previous game
    /// has ended or timed out.
    pub fn reset_game(
        &mut self,
        caller: &Address,
        params: Bytes,
        num_players: usize,
        table_fee: Chips,
    ) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_admin(caller)?;
            if !round.state.phase.is_terminal() {
                return Err(RoundError::InvalidPhase(round.state.phase));
            }
            let config = RoundConfig {
                num_players,
                table_fee,
                ..round.config.clone()
            };
            config.validate()?;
            round.engine.reset_game(&round.address, params, num_players)?;
            round.config = config;
            round.state = RoundState::new();
            info!("Game {} reset for {num_players} players", round.state.game_id);
            Ok(())
        })
    }

    /// Take a seat by paying exactly the table fee.
    pub fn join_game(
        &mut self,
        player: &Address,
        value: Chips,
        public_key: Bytes,
        memo: Bytes,
        key_proof: &[u8],
    ) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_phase(Phase::AwaitPlayers)?;
            ensure_payment(round.config.table_fee, value)?;
            round
                .engine
                .join_game(&round.address, player, public_key, memo, key_proof)?;
            round.escrow_in(player, value, EntryType::TableFee)?;

            let players = round.engine.players().to_vec();
            round.state.seat_players(players);
            if round.engine.is_full() {
                round.advance_phase();
            }
            Ok(())
        })
    }

    pub fn leave_game(&mut self, player: &Address) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_phase(Phase::AwaitPlayers)?;
            round.engine.leave_game(&round.address, player)?;
            let fee = round.config.table_fee;
            round.escrow_out(player, fee, EntryType::Refund)?;

            let players = round.engine.players().to_vec();
            round.state.seat_players(players);
            Ok(())
        })
    }

    /// Pick the button as `seed mod n`. The seed comes from outside (an
    /// oracle or a commit-reveal among players).
    pub fn pick_button(&mut self, caller: &Address, seed: u64) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_admin(caller)?;
            round.ensure_phase(Phase::PickButton)?;
            let n = round.state.num_players() as u64;
            let button = (seed % n) as SeatIndex;
            round.state.button = button;
            round.state.player_to_act = button;
            let player = round.state.players[button].clone();
            round.emit(GameEvent::ButtonPicked(player));
            round.advance_phase();
            round.advance_turn();
            Ok(())
        })
    }

    /// Re-mask and permute the deck. Shuffling starts after the button and
    /// ends with it.
    pub fn shuffle_deck(
        &mut self,
        player: &Address,
        shuffled: Vec<Bytes>,
        shuffle_proof: &[u8],
    ) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_phase(Phase::ShuffleDeck)?;
            let seat = round.ensure_turn(player)?;
            round
                .engine
                .shuffle_deck(&round.address, player, shuffled, shuffle_proof)?;
            if seat == round.state.button {
                round.advance_phase();
            }
            round.advance_turn();
            Ok(())
        })
    }

    pub fn small_blind_bet(&mut self, player: &Address, value: Chips) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_phase(Phase::SmallBlindBet)?;
            let seat = round.ensure_turn(player)?;
            ensure_payment(round.config.small_blind, value)?;
            round.collect(seat, value, EntryType::Blind)?;
            round.state.who_raised = seat;
            round.emit(GameEvent::SmallBlindBet(player.clone(), value));
            round.advance_phase();
            round.advance_turn();
            Ok(())
        })
    }

    /// Post the big blind. Drawing starts right after, with the seat after
    /// the button.
    pub fn big_blind_bet(&mut self, player: &Address, value: Chips) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_phase(Phase::BigBlindBet)?;
            let seat = round.ensure_turn(player)?;
            ensure_payment(round.config.big_blind, value)?;
            round.collect(seat, value, EntryType::Blind)?;
            round.state.who_raised = seat;
            round.emit(GameEvent::BigBlindBet(player.clone(), value));
            round.advance_phase();
            round.state.player_to_act = round.state.button;
            round.advance_turn();
            Ok(())
        })
    }

    /// Claim the player's hole cards and hand over tokens for everybody
    /// else's. `tokens` and `proofs` cover [`Self::required_reveal_indexes`]
    /// in ascending order.
    pub fn draw_cards(
        &mut self,
        player: &Address,
        tokens: Vec<Bytes>,
        proofs: &[Bytes],
    ) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_phase(Phase::DrawCards)?;
            let seat = round.ensure_turn(player)?;
            let (mine, others) = round.hole_card_indexes(seat);
            round.engine.draw_cards_and_submit_reveal_tokens(
                &round.address,
                player,
                &mine,
                &others,
                tokens,
                proofs,
            )?;
            round.engine.set_used(&round.address, &mine)?;

            if seat == round.state.button {
                round.advance_phase();
                round.state.player_to_act = round.state.big_blind_seat();
            }
            round.advance_turn();
            Ok(())
        })
    }

    /// Pay `value` to bring the player's bet up to the bet to match.
    pub fn call(&mut self, player: &Address, value: Chips) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_betting()?;
            let seat = round.ensure_turn(player)?;
            let to_match = round.state.bet_to_match();
            let bet = round.state.bet_of(seat);
            if bet.checked_add(value) != Some(to_match) {
                return Err(RoundError::PaymentMismatch {
                    expected: to_match.saturating_sub(bet),
                    got: value,
                });
            }
            round.collect(seat, value, EntryType::Bet)?;
            round.emit(GameEvent::PlayerCalled(player.clone(), value));
            round.advance_after_bet();
            Ok(())
        })
    }

    /// Pay `value` on top of the player's bet. The new total has to reach
    /// `min_raise_multiplier` times the bet to match.
    pub fn raise(&mut self, player: &Address, value: Chips) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_betting()?;
            let seat = round.ensure_turn(player)?;
            let to_match = round.state.bet_to_match();
            let minimum = to_match
                .saturating_mul(round.config.min_raise_multiplier)
                .max(to_match.saturating_add(1));
            let new_bet = round
                .state
                .bet_of(seat)
                .checked_add(value)
                .ok_or(RoundError::InvalidRaise {
                    minimum,
                    got: Chips::MAX,
                })?;
            if new_bet < minimum {
                return Err(RoundError::InvalidRaise {
                    minimum,
                    got: new_bet,
                });
            }
            round.collect(seat, value, EntryType::Bet)?;
            round.state.who_raised = seat;
            round.emit(GameEvent::PlayerRaised(player.clone(), value));
            round.advance_turn();
            Ok(())
        })
    }

    pub fn check(&mut self, player: &Address) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_betting()?;
            let seat = round.ensure_turn(player)?;
            let to_match = round.state.bet_to_match();
            let bet = round.state.bet_of(seat);
            if bet != to_match {
                return Err(RoundError::CannotCheck { to_match, bet });
            }
            round.emit(GameEvent::PlayerChecked(player.clone()));
            round.advance_after_bet();
            Ok(())
        })
    }

    /// Leave the hand, surrendering tokens for every community card that
    /// is still secret.
    pub fn fold(&mut self, player: &Address, tokens: Vec<Bytes>, proofs: &[Bytes]) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_betting()?;
            let seat = round.ensure_turn(player)?;
            let unrevealed = round.unrevealed_board();
            round
                .engine
                .fold_cards(&round.address, player, &unrevealed, tokens, proofs)?;
            round.state.done[seat] = true;
            round.emit(GameEvent::PlayerFolded(player.clone()));

            if round.state.active_count() == 1 {
                let survivor = round.state.first_active_from_button();
                return round.end_game(survivor);
            }
            if seat == round.state.who_raised {
                // The street opener folded, the marker moves on unmatched.
                round.advance_turn();
                round.state.who_raised = round.state.player_to_act;
            } else {
                round.advance_after_bet();
            }
            Ok(())
        })
    }

    /// Submit tokens for this street's community cards. The last active
    /// player to flip opens them and betting starts again from the button.
    pub fn flip_cards(
        &mut self,
        player: &Address,
        tokens: Vec<Bytes>,
        proofs: &[Bytes],
    ) -> RoundResult<()> {
        self.transact(|round| {
            if round.state.phase.cards_to_flip() == 0 {
                return Err(RoundError::InvalidPhase(round.state.phase));
            }
            round.ensure_turn(player)?;
            let indexes = round.flip_indexes();
            round
                .engine
                .add_reveal_tokens(&round.address, player, false, &indexes, tokens, proofs)?;
            round.advance_turn();

            if round.engine.ready_to_reveal(&indexes) {
                round.engine.set_used(&round.address, &indexes)?;
                round.advance_phase();
                round.reset_actor();
            }
            Ok(())
        })
    }

    /// Open the player's hole cards. Once every active player has shown the
    /// winner is decided and the game ends.
    pub fn showdown(&mut self, player: &Address, tokens: Vec<Bytes>, proofs: &[Bytes]) -> RoundResult<()> {
        self.transact(|round| {
            round.ensure_phase(Phase::Showdown)?;
            let seat = round.ensure_turn(player)?;
            let (mine, _) = round.hole_card_indexes(seat);
            round
                .engine
                .show_hand(&round.address, player, &mine, tokens, proofs)?;
            round.emit(GameEvent::PlayerShowed {
                player: player.clone(),
                indexes: mine,
            });

            let first = *round.state.who_showed.get_or_insert(seat);
            round.advance_turn();
            if round.state.player_to_act == first {
                round.decide_winner()?;
            }
            Ok(())
        })
    }

    /// Punish the actor for letting their deadline pass.
    ///
    /// With one player left that player wins. Otherwise the game times out:
    /// everybody but `other` gets their table fee back, active players get
    /// their bets back, and the rest goes to the house.
    pub fn purge_player(&mut self, caller: &Address, other: &Address) -> RoundResult<()> {
        self.transact(|round| {
            if !round.state.phase.is_in_hand() {
                return Err(RoundError::InvalidPhase(round.state.phase));
            }
            let caller_seat = round
                .state
                .seat_of(caller)
                .ok_or_else(|| RoundError::NotAPlayer(caller.clone()))?;
            if !round.state.is_active(caller_seat) {
                return Err(RoundError::PlayerDone(caller.clone()));
            }
            let blamed = round
                .state
                .seat_of(other)
                .ok_or_else(|| RoundError::NotAPlayer(other.clone()))?;
            if blamed != round.state.player_to_act {
                return Err(RoundError::OutOfTurnAction(other.clone()));
            }
            let now = round.clock.now();
            if let Some(deadline) = round.state.deadline {
                if now <= deadline {
                    return Err(RoundError::DeadlineNotReached(deadline));
                }
            }

            warn!("{other} missed their deadline, purged by {caller}");
            round.state.done[blamed] = true;
            if round.state.active_count() == 1 {
                let survivor = round.state.first_active_from_button();
                return round.end_game(survivor);
            }
            round.time_out(blamed)
        })
    }

    /// Serializable snapshot of the round.
    #[must_use]
    pub fn view(&self) -> RoundView {
        let state = &self.state;
        let has_button = state.phase > Phase::PickButton;
        let seats = state
            .players
            .iter()
            .enumerate()
            .map(|(seat, player)| SeatView {
                player: player.clone(),
                bet: state.bet_of(seat),
                done: !state.is_active(seat),
                hole_cards: self.labels(&self.hole_card_indexes(seat).0),
            })
            .collect();

        RoundView {
            game_id: state.game_id,
            phase: state.phase,
            seats,
            button: state.players.get(state.button).filter(|_| has_button).cloned(),
            player_to_act: self.player_to_act().cloned(),
            deadline: state.deadline,
            pot: state.pot,
            bet_to_match: state.bet_to_match(),
            board: self.labels(&self.board_indexes()),
            winner: state.winner.clone(),
        }
    }

    /// Public information the winner decision is based on.
    #[must_use]
    pub fn showdown_view(&self) -> ShowdownView {
        let hands = self
            .state
            .active_seats()
            .map(|seat| ShownHand {
                player: self.state.players[seat].clone(),
                hole_cards: self.labels(&self.hole_card_indexes(seat).0),
            })
            .collect();
        ShowdownView {
            hands,
            board: self.labels(&self.board_indexes()),
        }
    }

    fn transact<T>(&mut self, action: impl FnOnce(&mut Self) -> RoundResult<T>) -> RoundResult<T> {
        let engine = self.engine.clone();
        let treasury = self.treasury.clone();
        let state = self.state.clone();
        let config = self.config.clone();
        let num_events = self.events.len();

        match action(self) {
            Ok(value) => {
                self.collect_engine_events();
                Ok(value)
            }
            Err(err) => {
                debug!("Action rolled back: {err}");
                self.engine = engine;
                self.treasury = treasury;
                self.state = state;
                self.config = config;
                self.events.truncate(num_events);
                Err(err)
            }
        }
    }

    fn collect_engine_events(&mut self) {
        let events = self.engine.drain_events();
        self.events.extend(events);
    }

    fn emit(&mut self, event: GameEvent) {
        self.collect_engine_events();
        debug!("{event}");
        self.events.push_back(event);
    }

    fn ensure_admin(&self, caller: &Address) -> RoundResult<()> {
        if caller == &self.admin {
            Ok(())
        } else {
            Err(RoundError::Unauthorized(caller.clone()))
        }
    }

    fn ensure_phase(&self, expected: Phase) -> RoundResult<()> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(RoundError::InvalidPhase(self.state.phase))
        }
    }

    fn ensure_betting(&self) -> RoundResult<()> {
        if self.state.phase.is_betting() {
            Ok(())
        } else {
            Err(RoundError::InvalidPhase(self.state.phase))
        }
    }

    fn ensure_turn(&self, player: &Address) -> RoundResult<SeatIndex> {
        let seat = self
            .state
            .seat_of(player)
            .ok_or_else(|| RoundError::NotAPlayer(player.clone()))?;
        if seat == self.state.player_to_act {
            Ok(seat)
        } else {
            Err(RoundError::OutOfTurnAction(player.clone()))
        }
    }

    fn advance_phase(&mut self) {
        self.state.phase = self.state.phase.next();
        info!("Game {} is {}", self.state.game_id, self.state.phase);
    }

    fn advance_turn(&mut self) {
        self.state.player_to_act = self.state.next_active(self.state.player_to_act);
        self.state.deadline = Some(self.clock.now() + self.config.action_timeout());
    }

    /// Hand the action back to the button (or the first active seat after
    /// it) and make that seat the bet to match.
    fn reset_actor(&mut self) {
        let first = self.state.first_active_from_button();
        self.state.player_to_act = first;
        self.state.who_raised = first;
        self.state.deadline = Some(self.clock.now() + self.config.action_timeout());
    }

    /// Pass the turn and close the street when it comes back around to the
    /// bet to match.
    fn advance_after_bet(&mut self) {
        self.advance_turn();
        if self.state.player_to_act == self.state.who_raised {
            self.advance_phase();
            self.reset_actor();
        }
    }

    fn collect(&mut self, seat: SeatIndex, amount: Chips, entry_type: EntryType) -> RoundResult<()> {
        let player = self.state.players[seat].clone();
        self.escrow_in(&player, amount, entry_type)?;
        self.state.pot += amount;
        self.state.bets[seat] += amount;
        Ok(())
    }

    fn escrow_in(&mut self, account: &Address, amount: Chips, entry_type: EntryType) -> RoundResult<()> {
        if amount > 0 {
            let now = self.clock.now();
            self.treasury
                .transfer_to_escrow(account, amount, entry_type, now)?;
        }
        Ok(())
    }

    fn escrow_out(&mut self, account: &Address, amount: Chips, entry_type: EntryType) -> RoundResult<()> {
        if amount > 0 {
            let now = self.clock.now();
            self.treasury
                .transfer_from_escrow(account, amount, entry_type, now)?;
        }
        Ok(())
    }

    fn refund_table_fees(&mut self, except: Option<SeatIndex>) -> RoundResult<()> {
        let fee = self.config.table_fee;
        let players = self.state.players.clone();
        for (seat, player) in players.iter().enumerate() {
            if Some(seat) != except {
                self.escrow_out(player, fee, EntryType::Refund)?;
            }
        }
        Ok(())
    }

    /// Return each active player's bet out of the pot.
    fn refund_active_bets(&mut self) -> RoundResult<()> {
        let seats: Vec<SeatIndex> = self.state.active_seats().collect();
        for seat in seats {
            let player = self.state.players[seat].clone();
            let bet = self.state.bets[seat];
            self.escrow_out(&player, bet, EntryType::Refund)?;
            self.state.pot -= bet;
        }
        Ok(())
    }

    fn finish(&mut self, phase: Phase) {
        self.state.phase = phase;
        self.state.deadline = None;
        info!("Game {} is {}", self.state.game_id, phase);
    }

    /// Refund all table fees and pay the pot minus commission to `seat`.
    fn end_game(&mut self, seat: SeatIndex) -> RoundResult<()> {
        self.refund_table_fees(None)?;
        let winner = self.state.players[seat].clone();
        let pot = mem::take(&mut self.state.pot);
        let payout = self.config.payout(pot);
        self.escrow_out(&winner, payout, EntryType::Payout)?;
        let now = self.clock.now();
        self.treasury
            .pay_house(pot - payout, EntryType::Commission, now)?;

        self.state.winner = Some(winner.clone());
        self.finish(Phase::End);
        self.emit(GameEvent::GameEnded {
            winner: Some(winner),
            amount: payout,
        });
        Ok(())
    }

    /// Unwind a showdown nobody won: fees and live bets go back, folded
    /// bets go to the house.
    fn end_without_winner(&mut self) -> RoundResult<()> {
        self.refund_table_fees(None)?;
        self.refund_active_bets()?;
        let rest = mem::take(&mut self.state.pot);
        let now = self.clock.now();
        self.treasury.pay_house(rest, EntryType::Forfeit, now)?;

        self.finish(Phase::End);
        self.emit(GameEvent::GameEnded {
            winner: None,
            amount: 0,
        });
        Ok(())
    }

    fn time_out(&mut self, blamed: SeatIndex) -> RoundResult<()> {
        self.refund_table_fees(Some(blamed))?;
        self.refund_active_bets()?;
        let fee = self.config.table_fee;
        let forfeited = self.state.bet_of(blamed) + fee;
        let rest = mem::take(&mut self.state.pot) + fee;
        let now = self.clock.now();
        self.treasury.pay_house(rest, EntryType::Forfeit, now)?;

        self.finish(Phase::Timeout);
        let blamed = self.state.players[blamed].clone();
        self.emit(GameEvent::GameTimeout { blamed, forfeited });
        Ok(())
    }

    fn decide_winner(&mut self) -> RoundResult<()> {
        let showdown = self.showdown_view();
        let named = self.decider.decide_winner(&showdown);
        let winner = named
            .as_ref()
            .and_then(|winner| self.state.seat_of(winner))
            .filter(|seat| self.state.is_active(*seat));
        if let (Some(named), None) = (&named, winner) {
            warn!("Ignoring winner {named}, not in the hand");
        }
        match winner {
            Some(seat) => self.end_game(seat),
            None => self.end_without_winner(),
        }
    }

    /// Own hole card indexes of `seat`, and everybody else's in ascending
    /// order.
    fn hole_card_indexes(&self, seat: SeatIndex) -> (Vec<usize>, Vec<usize>) {
        let position = self.state.position(seat);
        let n = self.state.num_players();
        let mine = (HOLE_CARDS * position..HOLE_CARDS * (position + 1)).collect();
        let others = (0..HOLE_CARDS * n)
            .filter(|index| index / HOLE_CARDS != position)
            .collect();
        (mine, others)
    }

    fn board_indexes(&self) -> Vec<usize> {
        let start = HOLE_CARDS * self.state.num_players();
        (start..start + COMMUNITY_CARDS).collect()
    }

    /// Community cards not flipped yet.
    fn unrevealed_board(&self) -> Vec<usize> {
        let end = HOLE_CARDS * self.state.num_players() + COMMUNITY_CARDS;
        (self.engine.used_count()..end).collect()
    }

    fn flip_indexes(&self) -> Vec<usize> {
        let start = self.engine.used_count();
        (start..start + self.state.phase.cards_to_flip()).collect()
    }

    fn labels(&self, indexes: &[usize]) -> Vec<String> {
        indexes
            .iter()
            .filter_map(|index| self.engine.card_label(*index))
            .map(str::to_string)
            .collect()
    }
}

fn ensure_payment(expected: Chips, got: Chips) -> RoundResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(RoundError::PaymentMismatch { expected, got })
    }
}
