//! Mathematical primitives for fedsplit.
//!
//! Provides shared math utilities used by the partitioner and splitter:
//!
//! - [`dirichlet`] - Seeded Dirichlet sampling over client proportions
//! - [`allocation`] - Turning proportions and weights into integer sizes

pub mod allocation;
pub mod dirichlet;

pub use allocation::{even_chunk_sizes, largest_remainder, proportional_sizes};
pub use dirichlet::sample_dirichlet;
