use samo_linalg::RigidTransform;

use crate::{error::AlignError, AlignmentResult, Correspondence};

/// A stored alignment: any combination of correspondence, translation and rotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    /// B-index per A-position, negative for unmatched.
    pub alignment: Option<Vec<i64>>,
    /// Translation of the transform.
    pub translation: Option<[f64; 3]>,
    /// Row-major rotation of the transform.
    pub rotation: Option<[[f64; 3]; 3]>,
}

impl Solution {
    /// A complete solution holding the correspondence and transform of `result`.
    pub fn from_result(result: &AlignmentResult) -> Self {
        Self {
            alignment: Some(result.correspondence.to_indices()),
            translation: Some(result.transform.translation),
            rotation: Some(result.transform.rotation),
        }
    }

    /// The stored transform, when both of its parts are present.
    pub fn transform(&self) -> Option<RigidTransform> {
        Some(RigidTransform::new(self.rotation?, self.translation?))
    }

    /// The stored correspondence checked against a B sequence of length `len_b`.
    pub fn correspondence(&self, len_b: usize) -> Option<Result<Correspondence, AlignError>> {
        self.alignment
            .as_deref()
            .map(|indices| Correspondence::from_indices(indices, len_b))
    }
}
