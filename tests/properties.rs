//! Property-based tests for generation and match resolution using proptest
//!
//! These tests verify grid invariants hold across random levels and strikes:
//! - Columns stay compacted after every resolve
//! - Hard mode never places equal colors side by side
//! - Cascades terminate and only ever remove blocks
//! - A strike without a match only adds its own block

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use ring_match::{
    ColorId, FillMode, Grid, GridGenerator, LevelConfig, MatchEngine, Palette, Position, Session,
    Strike,
};

const MAX_DIM: usize = 12;
const MAX_STRIKES: usize = 60;
const HARD_GRIDS: u64 = 1000;

fn fill_mode() -> impl Strategy<Value = FillMode> {
    prop_oneof![
        Just(FillMode::Easy),
        Just(FillMode::Normal),
        Just(FillMode::Hard),
    ]
}

/// Level small enough to resolve quickly, big enough to cascade
fn level() -> impl Strategy<Value = LevelConfig> {
    (3..=MAX_DIM, 2..=MAX_DIM, fill_mode(), 1u32..5, any::<u64>())
        .prop_flat_map(|(n_slice, n_layer, mode, denominator, seed)| {
            (0..=n_layer).prop_map(move |fill_height| LevelConfig {
                n_slice,
                n_layer,
                palette: Palette::default(),
                fill_height,
                empty_probability_denominator: denominator,
                fill_mode: mode,
                seed: Some(seed),
            })
        })
}

fn strikes() -> impl Strategy<Value = Vec<(usize, u8)>> {
    prop::collection::vec((0..MAX_DIM, 1u8..6), 0..MAX_STRIKES)
}

fn same_colored_neighbors(grid: &Grid) -> Vec<(Position, Position)> {
    let mut pairs = Vec::new();
    for pos in grid.positions() {
        let color = grid.color(pos);
        if color.is_empty() {
            continue;
        }
        let right = grid.right_of(pos);
        if right != pos && grid.color(right) == color {
            pairs.push((pos, right));
        }
        if let Some(up) = grid.above(pos) {
            if grid.color(up) == color {
                pairs.push((pos, up));
            }
        }
    }
    pairs
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn generated_grids_are_compacted(config in level()) {
        let session = Session::new(config).unwrap();
        prop_assert!(session.grid().is_compacted());
    }

    #[test]
    fn columns_stay_compacted_after_strikes(config in level(), shots in strikes()) {
        let mut session = Session::new(config).unwrap();
        for (slice, color) in shots {
            let slice = slice % session.grid().n_slice();
            let filled_before = session.grid().filled();
            if let Strike::Placed { changes, .. } = session.strike(slice, ColorId(color)).unwrap() {
                prop_assert!(session.grid().is_compacted(), "gap after strike:\n{}", session.grid());
                // Cascades only ever remove blocks
                prop_assert_eq!(session.grid().filled() + changes.cleared, filled_before + 1);
                prop_assert!((changes.cascades as usize) <= filled_before);
            }
        }
    }

    #[test]
    fn strike_without_match_only_adds_its_block(config in level(), slice in 0..MAX_DIM, color in 1u8..6) {
        let mut session = Session::new(config).unwrap();
        let slice = slice % session.grid().n_slice();
        let before = session.grid().clone();
        let landing = match session.landing(slice).unwrap() {
            ring_match::Landing::Cell(pos) => pos,
            _ => return Ok(()),
        };

        let mut placed = before.clone();
        placed.set(landing, ColorId(color));
        prop_assume!(!MatchEngine::new().find(&placed, landing).is_clear());

        let changes = session.place_and_resolve(landing.slice, landing.layer, ColorId(color)).unwrap();
        prop_assert_eq!(changes.positions.into_iter().collect::<Vec<_>>(), vec![landing]);
        prop_assert_eq!(session.grid(), &placed);
    }

    #[test]
    fn resolve_without_match_returns_empty_change_set(config in level(), slice in 0..MAX_DIM, color in 1u8..6) {
        let mut grid = Session::new(config).unwrap().grid().clone();
        let slice = slice % grid.n_slice();
        let Ok(ring_match::Landing::Cell(pos)) = grid.landing(slice) else {
            return Ok(());
        };
        grid.set(pos, ColorId(color));
        prop_assume!(!MatchEngine::new().find(&grid, pos).is_clear());

        let before = grid.clone();
        let changes = MatchEngine::new().resolve(&mut grid, pos).unwrap();
        prop_assert!(changes.is_empty());
        prop_assert_eq!(grid, before);
    }
}

#[test]
fn hard_mode_never_repeats_a_color_next_door() {
    let palette = Palette::default();
    assert_eq!(palette.len(), 6);
    for seed in 0..HARD_GRIDS {
        let mut rng = Pcg32::seed_from_u64(seed);
        let grid = GridGenerator::new(&mut rng)
            .generate(10, 8, &palette, 8, 3, FillMode::Hard)
            .unwrap();
        let violations = same_colored_neighbors(&grid);
        assert!(
            violations.is_empty(),
            "seed {}: {:?}\n{}",
            seed,
            violations,
            grid
        );
    }
}

#[test]
fn cascades_terminate_on_dense_grids() {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for seed in 0..200u64 {
            let config = LevelConfig {
                n_slice: MAX_DIM,
                n_layer: MAX_DIM,
                fill_height: MAX_DIM - 1,
                fill_mode: FillMode::Easy,
                seed: Some(seed),
                ..Default::default()
            };
            let mut session = Session::new(config).unwrap();
            for _ in 0..MAX_STRIKES {
                let slice = session.random_slice();
                let color = session.random_ball_color();
                if session.strike(slice, color).unwrap() == Strike::Blocked {
                    break;
                }
            }
        }
        tx.send(()).unwrap();
    });
    rx.recv_timeout(Duration::from_secs(60))
        .expect("cascade loop did not finish in time");
}

#[test]
fn uniform_ring_is_cleared_without_hanging() {
    // Every ring walk could circle forever here
    let column: &[u8] = &[1, 1];
    let columns = vec![column; MAX_DIM];
    let mut grid = Grid::from_columns(3, &columns);
    grid.set(Position::new(0, 2), ColorId(1));
    let changes = MatchEngine::new()
        .resolve(&mut grid, Position::new(0, 2))
        .unwrap();
    assert_eq!(changes.cleared, 2 * MAX_DIM + 1);
    assert_eq!(grid.filled(), 0);
}
