//! Property tests over arbitrary play sequences.
//!
//! Each case plays a random sequence of placements, removals and ticks on
//! the test config, then checks one invariant.

use ecosim_core::{
    engine::SimEngine,
    error::SimError,
    rng::FixedRng,
    snapshot::SavePayload,
};
use proptest::prelude::*;

const ENTITY_IDS: [&str; 3] = ["tree", "factory", "house"];

#[derive(Debug, Clone)]
enum Action {
    Place { x: i32, y: i32, entity: usize },
    Remove { x: i32, y: i32 },
    Tick,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => (-1..6i32, -1..6i32, 0..ENTITY_IDS.len())
            .prop_map(|(x, y, entity)| Action::Place { x, y, entity }),
        1 => (0..5i32, 0..5i32).prop_map(|(x, y)| Action::Remove { x, y }),
        2 => Just(Action::Tick),
    ]
}

fn play(seed: u64, actions: &[Action]) -> SimEngine {
    let mut engine = SimEngine::build_test(seed).unwrap();
    for action in actions {
        apply(&mut engine, action);
    }
    engine
}

fn apply(engine: &mut SimEngine, action: &Action) {
    match *action {
        Action::Place { x, y, entity } => {
            let _ = engine.place(x, y, ENTITY_IDS[entity]);
        }
        Action::Remove { x, y } => {
            let _ = engine.remove(x, y);
        }
        Action::Tick => {
            engine.tick();
        }
    }
}

proptest! {
    /// Any failed placement leaves every resource and every cell unchanged.
    #[test]
    fn failed_placement_changes_nothing(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 0..40),
        x in -2..7i32,
        y in -2..7i32,
        entity in 0..ENTITY_IDS.len(),
    ) {
        let mut engine = play(seed, &actions);
        let before = engine.state().clone();
        if engine.place(x, y, ENTITY_IDS[entity]).is_err() {
            prop_assert_eq!(engine.state(), &before);
        }
    }

    /// Placing onto an occupied cell is always CellOccupied.
    #[test]
    fn occupied_cells_are_exclusive(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 0..40),
        entity in 0..ENTITY_IDS.len(),
    ) {
        let mut engine = play(seed, &actions);
        let occupied: Vec<_> = engine.state().grid.occupied().map(|(x, y, _)| (x, y)).collect();
        for (x, y) in occupied {
            let before = engine.state().resources.clone();
            let result = engine.place(x, y, ENTITY_IDS[entity]);
            prop_assert!(
                matches!(result, Err(SimError::CellOccupied { .. })),
                "expected CellOccupied at ({}, {})", x, y
            );
            prop_assert_eq!(&engine.state().resources, &before);
        }
    }

    /// Removal never changes the ledger.
    #[test]
    fn removal_never_refunds(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 0..40),
        x in 0..5i32,
        y in 0..5i32,
    ) {
        let mut engine = play(seed, &actions);
        let before = engine.state().resources.clone();
        engine.remove(x, y).unwrap();
        prop_assert_eq!(&engine.state().resources, &before);
    }

    /// N ticks from day D end on day D + N.
    #[test]
    fn ticks_advance_day_exactly(
        actions in prop::collection::vec(action(), 0..20),
        n in 0..50u64,
    ) {
        let mut engine = play(7, &actions);
        let start = engine.day();
        engine.run_ticks(n);
        prop_assert_eq!(engine.day(), start + n);
    }

    /// The evaluator's effects appear only on multiples of five: with
    /// smog-level pollution and no buildings, score moves only on those days.
    #[test]
    fn crisis_only_on_multiples_of_five(start_ticks in 0..30u64, n in 1..30u64) {
        let mut engine = SimEngine::build_test(3).unwrap().with_rng(Box::new(FixedRng::never()));
        let mut payload = engine.save(None);
        payload.state.resources.insert("pollution", 75.0);
        engine.load(payload).unwrap();
        engine.run_ticks(start_ticks);

        for _ in 0..n {
            let score_before = engine.state().resources.balance("score");
            engine.tick();
            let changed = engine.state().resources.balance("score") != score_before;
            prop_assert_eq!(changed, engine.day() % 5 == 0, "day {}", engine.day());
        }
    }

    /// load(save(state)) == state, through JSON.
    #[test]
    fn save_load_round_trip(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 0..60),
    ) {
        let engine = play(seed, &actions);
        let json = engine.save(None).to_json().unwrap();
        let payload = SavePayload::from_json(&json).unwrap();

        let mut restored = SimEngine::build_test(seed).unwrap();
        restored.load(payload).unwrap();
        prop_assert_eq!(restored.state(), engine.state());
    }

    /// Fractional balances survive JSON bit-for-bit.
    #[test]
    fn fractional_balances_round_trip_exactly(
        budget in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL,
        pollution in -1.0e6..1.0e6f64,
        score in any::<i32>().prop_map(|n| f64::from(n) / 7.0),
    ) {
        let mut engine = SimEngine::build_test(1).unwrap();
        let mut payload = engine.save(None);
        payload.state.resources.insert("budget", budget);
        payload.state.resources.insert("pollution", pollution);
        payload.state.resources.insert("score", score);
        engine.load(payload).unwrap();

        let json = engine.save(None).to_json().unwrap();
        let mut restored = SimEngine::build_test(1).unwrap();
        restored.load(SavePayload::from_json(&json).unwrap()).unwrap();

        for name in ["budget", "pollution", "score"] {
            let before = engine.state().resources.balance(name);
            let after = restored.state().resources.balance(name);
            prop_assert_eq!(before.to_bits(), after.to_bits(), "{} {} -> {}", name, before, after);
        }
        prop_assert_eq!(restored.state(), engine.state());
    }
}
