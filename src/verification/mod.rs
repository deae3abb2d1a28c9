//! Invariant checks for partitions.
//!
//! Provides practical verification checks run before anything is written:
//!
//! - [`coverage`] - Every sample index is assigned or dropped exactly once
//! - [`balance`] - Client size floors and spreads

pub mod balance;
pub mod coverage;

pub use balance::{check_max_spread, check_min_size, size_spread};
pub use coverage::check_coverage;
