//! Ring grid engine
//!
//! All puzzle logic lives here. This module is pure and synchronous:
//! - Seeded RNG only (generation)
//! - Stable iteration order (slice ascending, then layer)
//! - No rendering or platform dependencies
//!
//! A grid is mutated by exactly one `resolve` at a time; callers that receive
//! several strikes in the same frame must serialize them.

pub mod generator;
pub mod matcher;
pub mod state;

pub use generator::GridGenerator;
pub use matcher::{ChangeSet, Match, MatchEngine};
pub use state::{Grid, Landing, Position};
