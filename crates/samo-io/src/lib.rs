#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Chain coordinate files.
pub mod chain;

/// Alignment solution files.
pub mod solution;

pub use chain::{read_chain_file, write_chain_file, ChainFileError};
pub use solution::{read_solution, write_solution, SolutionError};
