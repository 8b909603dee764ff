//! Mental Hold'em table simulator.
//!
//! Seats mock players at a round backed by the insecure reference verifier,
//! plays hands with a simple random policy and prints every event as a JSON
//! line on stdout.

use std::sync::Arc;

use anyhow::{Error, anyhow};
use chrono::Duration;
use ctrlc::set_handler;
use log::{info, warn};
use mental_holdem::{
    Address, InsecureVerifier, ManualClock, MockPlayer, Phase, RoundConfig, TexasHoldemRound,
    game::{ShowdownView, WinnerDecider},
};
use pico_args::Arguments;
use rand::{Rng, SeedableRng, rngs::StdRng};

const HELP: &str = "\
Simulate mental Hold'em hands and print the event stream

USAGE:
  mh_sim [OPTIONS]

OPTIONS:
  --players    N           Players at the table         [default: env HOLDEM_NUM_PLAYERS or 2]
  --hands      N           Hands to play                [default: 1]
  --seed       N           RNG seed                     [default: random]
  --stall      N           Let the player at seat N time out in every hand

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  HOLDEM_TABLE_FEE         Table fee paid on joining
  HOLDEM_SMALL_BLIND       Small blind
  HOLDEM_BIG_BLIND         Big blind
  HOLDEM_ACTION_TIMEOUT_SECS
                           Seconds before a stalled player can be purged
  (See RoundConfig::from_env for all configuration options)
";

const PARAMS: &[u8] = b"mh_sim";
const STARTING_BALANCE: u64 = 10_000;
const RANKS: &str = "23456789TJQKA";

struct Args {
    num_players: Option<usize>,
    num_hands: usize,
    seed: u64,
    stall: Option<usize>,
}

/// Highest hole card wins, first to show breaks ties.
#[derive(Debug)]
struct HighCard;

fn rank(label: &str) -> Option<usize> {
    label.chars().next().and_then(|c| RANKS.find(c))
}

impl WinnerDecider for HighCard {
    fn decide_winner(&self, showdown: &ShowdownView) -> Option<Address> {
        showdown
            .hands
            .iter()
            .filter_map(|hand| {
                let best = hand.hole_cards.iter().filter_map(|card| rank(card)).max()?;
                Some((best, &hand.player))
            })
            .rev()
            .max_by_key(|(best, _)| *best)
            .map(|(_, player)| player.clone())
    }
}

struct Simulation {
    round: TexasHoldemRound,
    players: Vec<MockPlayer>,
    clock: Arc<ManualClock>,
    rng: StdRng,
    stall: Option<usize>,
}

impl Simulation {
    fn player(&self, address: &Address) -> Result<MockPlayer, Error> {
        self.players
            .iter()
            .find(|p| &p.address() == address)
            .cloned()
            .ok_or_else(|| anyhow!("unknown player {address}"))
    }

    fn print_events(&mut self) -> Result<(), Error> {
        for event in self.round.drain_events() {
            println!("{}", serde_json::to_string(&event)?);
        }
        Ok(())
    }

    fn join_all(&mut self) -> Result<(), Error> {
        let fee = self.round.config().table_fee;
        for player in &self.players {
            self.round.join_game(
                &player.address(),
                fee,
                player.public_key().clone(),
                player.memo().clone(),
                &player.key_proof(PARAMS),
            )?;
        }
        Ok(())
    }

    /// Purge the stalled actor on behalf of the next active seat.
    fn purge(&mut self, stalled: &Address) -> Result<(), Error> {
        self.clock
            .advance(self.round.config().action_timeout() + Duration::seconds(1));
        let state = self.round.state();
        let seat = state
            .seat_of(stalled)
            .ok_or_else(|| anyhow!("{stalled} is not seated"))?;
        let purger = state.players[state.next_active(seat)].clone();
        warn!("{stalled} stalls, {purger} purges");
        self.round.purge_player(&purger, stalled)?;
        Ok(())
    }

    fn bet(&mut self, actor: &MockPlayer) -> Result<(), Error> {
        let address = actor.address();
        let state = self.round.state();
        let to_match = state.bet_to_match();
        let bet = state.bet_of(state.player_to_act);
        let owed = to_match.saturating_sub(bet);
        let raise_to = (to_match * self.round.config().min_raise_multiplier).max(to_match + 1);
        let can_raise = raise_to - bet <= self.round.treasury().balance(&address) / 4;
        let roll: u8 = self.rng.random_range(0..100);

        if roll < 10 {
            let indexes = self.round.required_reveal_indexes(&address)?;
            let (tokens, proofs) = actor.reveal_tokens_at(self.round.engine(), &indexes);
            self.round.fold(&address, tokens, &proofs)?;
        } else if roll < 25 && can_raise {
            self.round.raise(&address, raise_to - bet)?;
        } else if owed > 0 {
            self.round.call(&address, owed)?;
        } else {
            self.round.check(&address)?;
        }
        Ok(())
    }

    fn step(&mut self) -> Result<(), Error> {
        let address = self
            .round
            .player_to_act()
            .cloned()
            .ok_or_else(|| anyhow!("nobody to act while {}", self.round.phase()))?;
        if self.stall == self.round.state().seat_of(&address) {
            return self.purge(&address);
        }

        let actor = self.player(&address)?;
        let phase = self.round.phase();
        match phase {
            Phase::ShuffleDeck => {
                let (deck, proof) = actor.shuffle_instance(&mut self.rng, self.round.engine());
                self.round.shuffle_deck(&address, deck, &proof)?;
            }
            Phase::SmallBlindBet => {
                let amount = self.round.config().small_blind;
                self.round.small_blind_bet(&address, amount)?;
            }
            Phase::BigBlindBet => {
                let amount = self.round.config().big_blind;
                self.round.big_blind_bet(&address, amount)?;
            }
            _ if phase.is_betting() => self.bet(&actor)?,
            _ => {
                let indexes = self.round.required_reveal_indexes(&address)?;
                let (tokens, proofs) = actor.reveal_tokens_at(self.round.engine(), &indexes);
                match phase {
                    Phase::DrawCards => self.round.draw_cards(&address, tokens, &proofs)?,
                    Phase::Showdown => self.round.showdown(&address, tokens, &proofs)?,
                    _ => self.round.flip_cards(&address, tokens, &proofs)?,
                }
            }
        }
        Ok(())
    }

    fn play_hand(&mut self, admin: &Address) -> Result<(), Error> {
        self.join_all()?;
        let seed = self.rng.random();
        self.round.pick_button(admin, seed)?;
        while !self.round.phase().is_terminal() {
            self.step()?;
            self.print_events()?;
        }
        Ok(())
    }
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        num_players: pargs.opt_value_from_str("--players")?,
        num_hands: pargs.opt_value_from_str("--hands")?.unwrap_or(1),
        seed: pargs
            .opt_value_from_str("--seed")?
            .unwrap_or_else(|| rand::rng().random()),
        stall: pargs.opt_value_from_str("--stall")?,
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let config = RoundConfig::from_env(args.num_players)?;
    info!(
        "Simulating {} hand(s) with {} players, seed {}",
        args.num_hands, config.num_players, args.seed
    );

    let admin = Address::new("admin");
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let mut rng = StdRng::seed_from_u64(args.seed);
    let players: Vec<MockPlayer> = (0..config.num_players)
        .map(|i| MockPlayer::random(&format!("player{}", i + 1), &mut rng))
        .collect();

    let mut round = TexasHoldemRound::new(
        admin.clone(),
        config.clone(),
        Arc::new(InsecureVerifier),
        PARAMS.to_vec(),
        clock.clone(),
    )?
    .with_decider(Arc::new(HighCard));
    for player in &players {
        round.deposit(&player.address(), STARTING_BALANCE)?;
    }

    let mut sim = Simulation {
        round,
        players,
        clock,
        rng,
        stall: args.stall,
    };

    for hand in 1..=args.num_hands {
        if hand > 1 {
            sim.round.reset_game(
                &admin,
                PARAMS.to_vec(),
                config.num_players,
                config.table_fee,
            )?;
        }
        sim.play_hand(&admin)?;
        info!("Hand {hand} finished: {}", sim.round.phase());
    }

    for player in &sim.players {
        info!(
            "{}: {}",
            player.address(),
            sim.round.treasury().balance(&player.address())
        );
    }
    info!("house: {}", sim.round.treasury().house_balance());
    Ok(())
}
