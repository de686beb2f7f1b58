#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Alternating fit/match optimizer and its seeds.
pub mod alternating;

/// Threshold continuation wrapped around the alternating optimizer.
pub mod annealing;

/// Optimal correspondence for a fixed transform.
pub mod assignment;

/// Exact branch and bound search.
pub mod bnb;

/// Alignment configuration.
pub mod config;

/// Multiple alignment against a running consensus.
pub mod consensus;

/// Correspondence between two point sequences.
pub mod correspondence;

mod cost;

/// Error types for the alignment engine.
pub mod error;

/// Quality measures of a correspondence.
pub mod metrics;

/// Pairwise alignment entry points.
pub mod pair;

/// Alignment results.
pub mod result;

/// Point sequences.
pub mod sequence;

/// Order-preserving correspondence.
pub mod sequential;

/// Stored solutions.
pub mod solution;

pub use alternating::{seed_correspondences, AlternatingOptimizer};
pub use annealing::AnnealingScheduler;
pub use assignment::solve_correspondence;
pub use bnb::{BranchAndBound, SearchStats};
pub use config::AlignConfig;
pub use consensus::{ConsensusResult, MultiAlign};
pub use correspondence::Correspondence;
pub use error::AlignError;
pub use pair::{align, continue_align, PairAlign};
pub use result::AlignmentResult;
pub use samo_linalg::RigidTransform;
pub use sequence::{residue_code, PointSequence};
pub use sequential::solve_order_preserving;
pub use solution::Solution;
