/// Property-based tests for the card engine using proptest
///
/// These tests check the engine's invariants over random rosters, shuffle
/// sequences and reveal orders.
use std::{collections::BTreeSet, sync::Arc};

use mental_holdem::{
    Address, Bytes, EngineError, GameInstance, MockPlayer, PlayingCard,
    engine::{InsecureVerifier, mock::NONCE_LEN},
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

const PARAMS: &[u8] = b"proptest-params";

fn controller() -> Address {
    Address::new("table")
}

fn full_instance(num_players: usize) -> (GameInstance, Vec<MockPlayer>) {
    let mut instance = GameInstance::new(
        controller(),
        Arc::new(InsecureVerifier),
        PlayingCard::standard_deck(),
        PARAMS.to_vec(),
        num_players,
    )
    .unwrap();
    let players: Vec<MockPlayer> = (0..num_players)
        .map(|i| MockPlayer::new(&format!("player{i}")))
        .collect();
    for player in &players {
        instance
            .join_game(
                &controller(),
                &player.address(),
                player.public_key().clone(),
                player.memo().clone(),
                &player.key_proof(PARAMS),
            )
            .unwrap();
    }
    (instance, players)
}

fn payloads(deck: &[Bytes]) -> Vec<Bytes> {
    let mut payloads: Vec<Bytes> = deck.iter().map(|card| card[NONCE_LEN..].to_vec()).collect();
    payloads.sort();
    payloads
}

proptest! {
    #[test]
    fn test_shuffles_preserve_the_deck(num_players in 2usize..6, seed in any::<u64>(), rounds in 1usize..4) {
        let (mut instance, players) = full_instance(num_players);
        let original = instance.masked_deck();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..rounds {
            for player in &players {
                let (deck, proof) = player.shuffle_instance(&mut rng, &instance);
                instance.shuffle_deck(&controller(), &player.address(), deck, &proof).unwrap();
            }
        }

        let shuffled = instance.masked_deck();
        prop_assert_eq!(shuffled.len(), 52);
        prop_assert_eq!(payloads(&shuffled), payloads(&original));
        // Masked hashes stay unique after every re-mask.
        let hashes: BTreeSet<_> = (0..52).filter_map(|i| instance.card_hash(i)).collect();
        prop_assert_eq!(hashes.len(), 52);
    }

    #[test]
    fn test_cards_open_once_every_player_contributed(
        num_players in 2usize..5,
        indexes in prop::collection::btree_set(0usize..52, 1..8),
        seed in any::<u64>(),
    ) {
        use rand::seq::SliceRandom;

        let (mut instance, players) = full_instance(num_players);
        let mut submissions: Vec<(usize, usize)> = indexes
            .iter()
            .flat_map(|&index| (0..num_players).map(move |p| (p, index)))
            .collect();
        submissions.shuffle(&mut StdRng::seed_from_u64(seed));

        let deck = PlayingCard::standard_deck();
        let mut opened = BTreeSet::new();
        for (p, index) in submissions {
            let player = &players[p];
            let (tokens, proofs) = player.reveal_tokens_at(&instance, &[index]);
            instance
                .add_reveal_tokens(&controller(), &player.address(), false, &[index], tokens, &proofs)
                .unwrap();

            // Opened cards stay open.
            for &was_open in &opened {
                prop_assert!(instance.is_open(was_open));
            }
            let complete = instance.reveal_tokens(index).len() == num_players;
            prop_assert_eq!(instance.is_open(index), complete);
            if complete {
                opened.insert(index);
                prop_assert_eq!(instance.card_label(index), Some(deck[index].label.as_str()));
            }
        }
        prop_assert_eq!(opened, indexes);
    }

    #[test]
    fn test_public_keys_and_memos_are_unique(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        prop_assume!(a != b);
        let mut instance = GameInstance::new(
            controller(),
            Arc::new(InsecureVerifier),
            PlayingCard::standard_deck(),
            PARAMS.to_vec(),
            3,
        )
        .unwrap();
        let first = MockPlayer::new(&a);
        instance
            .join_game(&controller(), &first.address(), first.public_key().clone(), first.memo().clone(), &first.key_proof(PARAMS))
            .unwrap();

        let same_key = first.clone().with_address(&b).with_memo(b.as_bytes().to_vec());
        prop_assert_eq!(
            instance.join_game(&controller(), &same_key.address(), same_key.public_key().clone(), same_key.memo().clone(), &same_key.key_proof(PARAMS)),
            Err(EngineError::DuplicatePublicKey)
        );

        let same_memo = MockPlayer::new(&b).with_memo(first.memo().clone());
        prop_assert_eq!(
            instance.join_game(&controller(), &same_memo.address(), same_memo.public_key().clone(), same_memo.memo().clone(), &same_memo.key_proof(PARAMS)),
            Err(EngineError::DuplicateMemo)
        );
        prop_assert_eq!(instance.players().len(), 1);
    }
}
