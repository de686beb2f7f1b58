#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Fixed size 3x3 matrix and 3d vector helpers.
pub mod linalg;

/// Least squares rigid fitting of paired point sets.
pub mod rigid;

pub use rigid::{fit_rigid, fit_rigid_pairs, RigidFitError, RigidTransform};
