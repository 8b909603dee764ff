//! Shared table driver for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use mental_holdem::{
    Address, Bytes, ManualClock, MockPlayer, Phase, RoundConfig, TexasHoldemRound,
    engine::InsecureVerifier,
    game::{RoundResult, ShowdownView, WinnerDecider},
};
use rand::{SeedableRng, rngs::StdRng};

pub const PARAMS: &[u8] = b"integration-params";
pub const STARTING_BALANCE: u64 = 1_000;

/// Names the winner up front, whatever the cards say.
#[derive(Debug)]
pub struct FixedWinner(pub Address);

impl WinnerDecider for FixedWinner {
    fn decide_winner(&self, _showdown: &ShowdownView) -> Option<Address> {
        Some(self.0.clone())
    }
}

pub fn admin() -> Address {
    Address::new("admin")
}

/// Default stakes with a 10% house cut so small pots still pay commission.
pub fn config(num_players: usize) -> RoundConfig {
    RoundConfig {
        num_players,
        commission_numerator: 1,
        commission_denominator: 10,
        ..RoundConfig::default()
    }
}

pub struct Table {
    pub round: TexasHoldemRound,
    pub players: Vec<MockPlayer>,
    pub clock: Arc<ManualClock>,
    pub rng: StdRng,
}

impl Table {
    pub fn new(names: &[&str]) -> Self {
        Self::with_config(names, config(names.len()))
    }

    pub fn with_config(names: &[&str], config: RoundConfig) -> Self {
        let clock = Arc::new(ManualClock::default());
        let mut round = TexasHoldemRound::new(
            admin(),
            config,
            Arc::new(InsecureVerifier),
            PARAMS.to_vec(),
            clock.clone(),
        )
        .unwrap();
        let players: Vec<MockPlayer> = names.iter().map(|name| MockPlayer::new(name)).collect();
        for player in &players {
            round.deposit(&player.address(), STARTING_BALANCE).unwrap();
        }
        Self {
            round,
            players,
            clock,
            rng: StdRng::seed_from_u64(42),
        }
    }

    pub fn decided_by(mut self, decider: Arc<dyn WinnerDecider>) -> Self {
        self.round = self.round.with_decider(decider);
        self
    }

    pub fn balance(&self, name: &str) -> u64 {
        self.round.treasury().balance(&Address::new(name))
    }

    pub fn player(&self, name: &str) -> MockPlayer {
        self.players
            .iter()
            .find(|p| p.address().as_str() == name)
            .unwrap()
            .clone()
    }

    pub fn actor(&self) -> MockPlayer {
        let address = self.round.player_to_act().unwrap().clone();
        self.player(address.as_str())
    }

    pub fn tokens(&self, player: &MockPlayer) -> (Vec<Bytes>, Vec<Bytes>) {
        let indexes = self
            .round
            .required_reveal_indexes(&player.address())
            .unwrap();
        player.reveal_tokens_at(self.round.engine(), &indexes)
    }

    pub fn join_all(&mut self) {
        let fee = self.round.config().table_fee;
        for player in self.players.clone() {
            self.round
                .join_game(
                    &player.address(),
                    fee,
                    player.public_key().clone(),
                    player.memo().clone(),
                    &player.key_proof(PARAMS),
                )
                .unwrap();
        }
    }

    pub fn shuffle_all(&mut self) {
        while self.round.phase() == Phase::ShuffleDeck {
            let actor = self.actor();
            let (deck, proof) = actor.shuffle_instance(&mut self.rng, self.round.engine());
            self.round
                .shuffle_deck(&actor.address(), deck, &proof)
                .unwrap();
        }
    }

    pub fn post_blinds(&mut self) {
        let sb = self.actor();
        let small_blind = self.round.config().small_blind;
        self.round.small_blind_bet(&sb.address(), small_blind).unwrap();
        let bb = self.actor();
        let big_blind = self.round.config().big_blind;
        self.round.big_blind_bet(&bb.address(), big_blind).unwrap();
    }

    pub fn draw_all(&mut self) {
        while self.round.phase() == Phase::DrawCards {
            let actor = self.actor();
            let (tokens, proofs) = self.tokens(&actor);
            self.round
                .draw_cards(&actor.address(), tokens, &proofs)
                .unwrap();
        }
    }

    /// Everything up to the pre-flop betting street, button on `button`.
    pub fn deal(&mut self, button: u64) {
        self.join_all();
        self.round.pick_button(&admin(), button).unwrap();
        self.shuffle_all();
        self.post_blinds();
        self.draw_all();
    }

    pub fn act(&mut self, action: impl FnOnce(&mut TexasHoldemRound, &Address) -> RoundResult<()>) {
        let actor = self.actor().address();
        action(&mut self.round, &actor).unwrap();
    }

    pub fn fold(&mut self) {
        let actor = self.actor();
        let (tokens, proofs) = self.tokens(&actor);
        self.round.fold(&actor.address(), tokens, &proofs).unwrap();
    }

    pub fn flip_street(&mut self) {
        let phase = self.round.phase();
        while self.round.phase() == phase {
            let actor = self.actor();
            let (tokens, proofs) = self.tokens(&actor);
            self.round
                .flip_cards(&actor.address(), tokens, &proofs)
                .unwrap();
        }
    }

    pub fn check_around(&mut self) {
        let phase = self.round.phase();
        while self.round.phase() == phase {
            self.act(|round, actor| round.check(actor));
        }
    }

    pub fn show_all(&mut self) {
        while self.round.phase() == Phase::Showdown {
            let actor = self.actor();
            let (tokens, proofs) = self.tokens(&actor);
            self.round
                .showdown(&actor.address(), tokens, &proofs)
                .unwrap();
        }
    }

    /// Flip and check through flop, turn and river.
    pub fn play_to_showdown(&mut self) {
        for _ in 0..3 {
            self.flip_street();
            self.check_around();
        }
    }
}
