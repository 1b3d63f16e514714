//! Native demo driver
//!
//! Generates a level and fires random balls at it, printing the grid after
//! each strike.
//!
//! Usage: `ring-match [LEVEL.json] [STRIKES]`

use std::process::ExitCode;

use ring_match::{LevelConfig, Session, Strike};

const DEFAULT_STRIKES: usize = 20;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Ring Match (native) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match LevelConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => LevelConfig::default(),
    };
    let strikes = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_STRIKES);

    let mut session = match Session::new(config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Level generation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Initial grid (seed {}):\n{}", session.seed(), session.grid());

    for n in 1..=strikes {
        let slice = session.random_slice();
        let color = session.random_ball_color();
        match session.strike(slice, color) {
            Ok(Strike::Placed { position, changes }) => {
                println!(
                    "#{n}: color {color} -> {position}: {} cleared, {} cascades, {} cells redrawn",
                    changes.cleared,
                    changes.cascades,
                    changes.len()
                );
                if changes.cleared > 0 {
                    println!("{}", session.grid());
                }
            }
            Ok(Strike::Blocked) => {
                println!("#{n}: color {color} -> slice {slice} is full, game over");
                break;
            }
            Ok(Strike::Core) => println!("#{n}: color {color} -> slice {slice} hit the core"),
            Err(e) => {
                log::error!("Strike failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!("Final grid:\n{}", session.grid());
    ExitCode::SUCCESS
}
