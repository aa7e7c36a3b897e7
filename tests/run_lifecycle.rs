//! Integration test: whole runs through the public game API
//!
//! Drives Idle → Running → Over with a seeded RNG and checks scoring, high
//! score persistence and input handling between runs.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

use why_am_i_flying::assets::CharacterId;
use why_am_i_flying::effects::{Effect, Recorder, Silent};
use why_am_i_flying::highscore::{JsonFileStore, MemoryStore, ScoreStore};
use why_am_i_flying::{Crash, Game, Phase, TickOutcome, Tuning, Viewport};

const VIEW: Viewport = Viewport {
    width: 480.0,
    height: 640.0,
};

/// The player pins itself to the ceiling and every gap spans the whole
/// column, so pipes only ever score.
fn cruise_tuning() -> Tuning {
    Tuning {
        gravity: 0.0,
        min_segment: 0.0,
        pipe_gap: 640.0,
        ..Tuning::default()
    }
}

fn new_game<S: ScoreStore>(store: S) -> Game<S> {
    Game::new(cruise_tuning(), store, CharacterId::Nidha, StdRng::seed_from_u64(11))
}

/// Ticks until the score reaches `target`, then shrinks the surface so the
/// player hits the floor.
fn play_to<S: ScoreStore>(game: &mut Game<S>, target: u32, fx: &mut Recorder) {
    for _ in 0..20_000 {
        if game.run().score >= target {
            break;
        }
        let outcome = game.tick(VIEW, fx);
        assert!(matches!(outcome, TickOutcome::Advanced { .. }), "{outcome:?}");
    }
    assert_eq!(game.run().score, target);
    let cramped = Viewport {
        width: VIEW.width,
        height: 20.0,
    };
    assert_eq!(game.tick(cramped, fx), TickOutcome::Ended(Crash::Ground));
}

#[test]
fn better_run_replaces_high_score() {
    let mut game = new_game(MemoryStore::with_value(5));
    let mut fx = Recorder::default();
    assert_eq!(game.high_score().best(), 5);

    game.activate(&mut fx);
    play_to(&mut game, 7, &mut fx);

    assert_eq!(game.phase(), Phase::Over);
    assert!(game.run().new_best);
    assert_eq!(game.high_score().best(), 7);
    assert_eq!(game.high_score().store().load(), Some(7));
    assert_eq!(game.high_score().store().writes(), 1);
    assert_eq!(fx.emitted.last(), Some(&Effect::Crash));
}

#[test]
fn worse_run_leaves_high_score_alone() {
    let mut game = new_game(MemoryStore::with_value(5));
    let mut fx = Recorder::default();
    game.activate(&mut fx);
    play_to(&mut game, 3, &mut fx);

    assert!(!game.run().new_best);
    assert_eq!(game.high_score().best(), 5);
    assert_eq!(game.high_score().store().writes(), 0);
}

#[test]
fn obstacles_leave_in_spawn_order() {
    let mut game = new_game(MemoryStore::default());
    let mut fx = Silent;
    game.activate(&mut fx);

    let mut spawned = 0u32;
    let mut prev_len = 0usize;
    for _ in 0..3_000 {
        let outcome = game.tick(VIEW, &mut fx);
        let TickOutcome::Advanced { scored } = outcome else {
            panic!("unexpected {outcome:?}");
        };
        let len = game.field().len();
        let grew = (len + scored as usize) - prev_len;
        assert!(grew <= 1);
        spawned += grew as u32;
        prev_len = len;

        // Head is always the leftmost pipe
        let xs: Vec<f64> = game.field().iter().map(|o| o.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(game.run().score + len as u32, spawned);
    }
    assert!(game.run().score > 10);
}

#[test]
fn shrinking_mid_run_keeps_pipes_in_order() {
    let mut game = new_game(MemoryStore::default());
    let mut fx = Silent;
    game.activate(&mut fx);

    let wide = Viewport {
        width: 2000.0,
        height: 640.0,
    };
    let narrow = Viewport {
        width: 200.0,
        height: 640.0,
    };
    while game.field().is_empty() {
        game.tick(wide, &mut fx);
    }

    let pipe_w = game.field().pipe_w();
    let mut spawned = 1u32;
    let mut prev_len = game.field().len();
    for _ in 0..3_000 {
        let TickOutcome::Advanced { scored } = game.tick(narrow, &mut fx) else {
            panic!("run ended early");
        };
        let len = game.field().len();
        spawned += ((len + scored as usize) - prev_len) as u32;
        prev_len = len;

        let xs: Vec<f64> = game.field().iter().map(|o| o.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]), "{xs:?}");
        assert!(xs.iter().all(|x| x + pipe_w > 0.0), "{xs:?}");
        assert_eq!(game.run().score + len as u32, spawned);
    }
    assert!(spawned > 2);
    assert!(game.run().score > 2);
}

#[test]
fn difficulty_never_decreases_during_a_run() {
    let mut game = new_game(MemoryStore::default());
    let mut fx = Silent;
    game.activate(&mut fx);
    let mut prev = game.multiplier();
    for _ in 0..5_000 {
        game.tick(VIEW, &mut fx);
        let m = game.multiplier();
        assert!(m >= prev);
        assert!(m <= game.tuning().difficulty_cap);
        prev = m;
    }
}

#[test]
fn over_ignores_taps_until_restart() {
    let mut game = new_game(MemoryStore::default());
    let mut fx = Recorder::default();
    game.activate(&mut fx);
    play_to(&mut game, 2, &mut fx);

    let snapshot = game.run().clone();
    let body = game.body().clone();
    let emitted = fx.emitted.len();
    for _ in 0..10 {
        assert!(!game.activate(&mut fx));
        assert_eq!(game.tick(VIEW, &mut fx), TickOutcome::Halted);
    }
    assert_eq!(game.run(), &snapshot);
    assert_eq!(game.body(), &body);
    assert_eq!(fx.emitted.len(), emitted);

    assert!(game.restart(&mut fx));
    assert_eq!(game.phase(), Phase::Running);
    assert_eq!(game.run().score, 0);
    assert!(game.field().is_empty());
    assert_eq!(fx.emitted.last(), Some(&Effect::Flap(CharacterId::Nidha)));
}

#[test]
fn home_returns_to_title_and_allows_character_change() {
    let mut game = new_game(MemoryStore::default());
    let mut fx = Recorder::default();
    game.activate(&mut fx);
    play_to(&mut game, 1, &mut fx);

    assert!(game.home());
    assert_eq!(game.phase(), Phase::Idle);
    assert_eq!(game.tick(VIEW, &mut fx), TickOutcome::Halted);
    assert!(game.cycle_character());

    assert!(game.activate(&mut fx));
    assert_eq!(fx.emitted.last(), Some(&Effect::Flap(CharacterId::Aami)));
    assert_eq!(game.high_score().best(), 1);
}

#[test]
fn high_score_survives_a_restart_of_the_program() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("highscore.json");

    let mut game = new_game(JsonFileStore::new(&path));
    let mut fx = Recorder::default();
    assert_eq!(game.high_score().best(), 0);
    game.activate(&mut fx);
    play_to(&mut game, 4, &mut fx);
    drop(game);

    let game = new_game(JsonFileStore::new(&path));
    assert_eq!(game.high_score().best(), 4);
}
