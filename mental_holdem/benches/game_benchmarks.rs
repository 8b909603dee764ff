use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mental_holdem::{
    Address, GameInstance, InsecureVerifier, ManualClock, MockPlayer, Phase, PlayingCard,
    RoundConfig, TexasHoldemRound,
};
use rand::{SeedableRng, rngs::StdRng};

const PARAMS: &[u8] = b"bench-params";

fn players(n: usize) -> Vec<MockPlayer> {
    (0..n).map(|i| MockPlayer::new(&format!("player{i}"))).collect()
}

/// Helper to create an engine with a full roster and a masked deck
fn full_instance(players: &[MockPlayer]) -> GameInstance {
    let controller = Address::new("table");
    let mut instance = GameInstance::new(
        controller.clone(),
        Arc::new(InsecureVerifier),
        PlayingCard::standard_deck(),
        PARAMS.to_vec(),
        players.len(),
    )
    .unwrap();
    for player in players {
        instance
            .join_game(
                &controller,
                &player.address(),
                player.public_key().clone(),
                player.memo().clone(),
                &player.key_proof(PARAMS),
            )
            .unwrap();
    }
    instance
}

/// Play a hand where everybody checks down to a showdown with no winner
fn play_hand(players: &[MockPlayer], rng: &mut StdRng) {
    let config = RoundConfig {
        num_players: players.len(),
        ..RoundConfig::default()
    };
    let mut round = TexasHoldemRound::new(
        Address::new("admin"),
        config,
        Arc::new(InsecureVerifier),
        PARAMS.to_vec(),
        Arc::new(ManualClock::default()),
    )
    .unwrap();

    for player in players {
        round.deposit(&player.address(), 1_000).unwrap();
        round
            .join_game(
                &player.address(),
                10,
                player.public_key().clone(),
                player.memo().clone(),
                &player.key_proof(PARAMS),
            )
            .unwrap();
    }
    round.pick_button(&Address::new("admin"), 0).unwrap();

    while round.phase() != Phase::End {
        let actor = round.player_to_act().unwrap().clone();
        let player = players.iter().find(|p| p.address() == actor).unwrap();
        match round.phase() {
            Phase::ShuffleDeck => {
                let (deck, proof) = player.shuffle_instance(rng, round.engine());
                round.shuffle_deck(&actor, deck, &proof).unwrap();
            }
            Phase::SmallBlindBet => round.small_blind_bet(&actor, 5).unwrap(),
            Phase::BigBlindBet => round.big_blind_bet(&actor, 10).unwrap(),
            phase => {
                let state = round.state();
                let to_pay = state
                    .bet_to_match()
                    .saturating_sub(state.bet_of(state.player_to_act));
                if phase.is_betting() {
                    if to_pay > 0 {
                        round.call(&actor, to_pay).unwrap();
                    } else {
                        round.check(&actor).unwrap();
                    }
                    continue;
                }
                let indexes = round.required_reveal_indexes(&actor).unwrap();
                let (tokens, proofs) = player.reveal_tokens_at(round.engine(), &indexes);
                match phase {
                    Phase::DrawCards => round.draw_cards(&actor, tokens, &proofs).unwrap(),
                    Phase::Showdown => round.showdown(&actor, tokens, &proofs).unwrap(),
                    _ => round.flip_cards(&actor, tokens, &proofs).unwrap(),
                }
            }
        }
    }
}

/// Benchmark masking a full deck when the roster fills up
fn bench_join_and_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("join_and_mask");
    for n in [2, 6, 10] {
        let players = players(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &players, |b, players| {
            b.iter(|| full_instance(players));
        });
    }
    group.finish();
}

/// Benchmark one player's shuffle of a 52-card deck
fn bench_shuffle(c: &mut Criterion) {
    let players = players(4);
    let instance = full_instance(&players);
    let mut rng = StdRng::seed_from_u64(7);

    c.bench_function("shuffle_deck", |b| {
        b.iter(|| {
            let mut instance = instance.clone();
            let (deck, proof) = players[0].shuffle_instance(&mut rng, &instance);
            instance
                .shuffle_deck(&Address::new("table"), &players[0].address(), deck, &proof)
                .unwrap();
        });
    });
}

/// Benchmark a complete hand from joining to showdown
fn bench_full_hand(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_hand");
    for n in [2, 4, 6] {
        let players = players(n);
        let mut rng = StdRng::seed_from_u64(11);
        group.bench_with_input(BenchmarkId::from_parameter(n), &players, |b, players| {
            b.iter(|| play_hand(players, &mut rng));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_join_and_mask, bench_shuffle, bench_full_hand);
criterion_main!(benches);
