//! Rigid alignment of paired point sets (Kabsch).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::linalg::{det_mat33, mat33_mul_vec3, matmul33};

/// Singular values below this bound are treated as zero when fixing a reflection.
pub const DEGENERATE_SINGULAR_VALUE: f64 = 1e-6;

/// Error type for rigid fitting.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RigidFitError {
    /// Source and destination arrays must have the same length
    #[error("Source ({0}) and destination ({1}) arrays must have the same length")]
    MismatchedLengths(usize, usize),

    /// No point pairs were given
    #[error("Cannot fit a rigid transform to an empty set of point pairs")]
    EmptyCorrespondence,

    /// The best orthogonal fit is a reflection that cannot be turned into a rotation
    #[error("Degenerate point configuration, smallest singular value {smallest_singular_value}")]
    DegenerateFit {
        /// Smallest singular value of the cross-covariance matrix.
        smallest_singular_value: f64,
    },
}

/// A rotation followed by a translation, `y = R * x + t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Row-major 3x3 rotation matrix.
    pub rotation: [[f64; 3]; 3],
    /// Translation vector.
    pub translation: [f64; 3],
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// Create a transform from a rotation and a translation.
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }

    /// Rotation by `angle` radians about `axis`, followed by `translation`.
    ///
    /// The axis does not need to be normalized. Returns `None` for a zero axis.
    pub fn from_axis_angle(axis: &[f64; 3], angle: f64, translation: [f64; 3]) -> Option<Self> {
        let norm = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        if norm < 1e-12 {
            return None;
        }
        let [x, y, z] = axis.map(|v| v / norm);

        // Rodrigues: R = I + sin(angle) K + (1 - cos(angle)) K^2
        let k = [[0.0, -z, y], [z, 0.0, -x], [-y, x, 0.0]];
        let k2 = matmul33(&k, &k);
        let (sin, cos) = angle.sin_cos();

        let mut rotation = Self::identity().rotation;
        for (i, row) in rotation.iter_mut().enumerate() {
            for (j, val) in row.iter_mut().enumerate() {
                *val += sin * k[i][j] + (1.0 - cos) * k2[i][j];
            }
        }
        Some(Self::new(rotation, translation))
    }

    /// Apply the transform to a single point.
    #[inline]
    pub fn apply(&self, point: &[f64; 3]) -> [f64; 3] {
        let p = mat33_mul_vec3(&self.rotation, point);
        [
            p[0] + self.translation[0],
            p[1] + self.translation[1],
            p[2] + self.translation[2],
        ]
    }

    /// Apply the transform to every point of a slice.
    pub fn apply_all(&self, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        points.iter().map(|p| self.apply(p)).collect()
    }
}

/// Fit the rotation and translation that maps `points_src` onto `points_dst`
/// in the least squares sense.
///
/// # Arguments
///
/// * `points_src` - Source points.
/// * `points_dst` - Destination points, paired by index with the source.
///
/// # Returns
///
/// The transform `dst = R * src + t`.
pub fn fit_rigid(
    points_src: &[[f64; 3]],
    points_dst: &[[f64; 3]],
) -> Result<RigidTransform, RigidFitError> {
    if points_src.len() != points_dst.len() {
        return Err(RigidFitError::MismatchedLengths(
            points_src.len(),
            points_dst.len(),
        ));
    }
    fit_rigid_pairs(points_src.iter().copied().zip(points_dst.iter().copied()))
}

/// Fit a rigid transform to an iterator of `(src, dst)` point pairs.
///
/// The algorithm:
/// 1. Accumulate the centroids and the cross-covariance H = Σ (a - ā)(b - b̄)^T
/// 2. Compute the SVD H = U * S * V^T
/// 3. R = V * U^T
/// 4. If det(R) < 0 negate the column of V paired with the smallest singular
///    value. This is only sound when that singular value is (numerically) zero,
///    i.e. the points are coplanar; otherwise the fit fails.
/// 5. t = b̄ - R * ā
///
/// For more details, see: Arun, K., Huang, T. S., and Blostein, S. D.
/// "Least-squares fitting of two 3-D point sets." IEEE PAMI, 1987.
pub fn fit_rigid_pairs<I>(pairs: I) -> Result<RigidTransform, RigidFitError>
where
    I: IntoIterator<Item = ([f64; 3], [f64; 3])>,
{
    let mut n = 0usize;
    let mut sum_src = [0.0f64; 3];
    let mut sum_dst = [0.0f64; 3];
    let mut cross = [[0.0f64; 3]; 3];

    for (src, dst) in pairs {
        for i in 0..3 {
            sum_src[i] += src[i];
            sum_dst[i] += dst[i];
            for j in 0..3 {
                cross[i][j] += src[i] * dst[j];
            }
        }
        n += 1;
    }

    if n == 0 {
        return Err(RigidFitError::EmptyCorrespondence);
    }

    let weight = n as f64;
    let centroid_src = sum_src.map(|v| v / weight);
    let centroid_dst = sum_dst.map(|v| v / weight);

    // H_ij = Σ src_i * dst_j - n * c_src_i * c_dst_j
    let h = faer::Mat::<f64>::from_fn(3, 3, |i, j| {
        cross[i][j] - centroid_src[i] * centroid_dst[j] * weight
    });

    let svd = h.svd();
    let u = svd.u();
    let s = svd.s_diagonal();
    let mut v = [[0.0f64; 3]; 3];
    for (i, row) in v.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = svd.v().read(i, j);
        }
    }

    let compose = |v: &[[f64; 3]; 3]| {
        let mut r = [[0.0f64; 3]; 3];
        for (i, row) in r.iter_mut().enumerate() {
            for (j, val) in row.iter_mut().enumerate() {
                *val = (0..3).map(|k| v[i][k] * u.read(j, k)).sum();
            }
        }
        r
    };

    let mut rotation = compose(&v);

    if det_mat33(&rotation) < 0.0 {
        let (min_index, min_value) = (0..3)
            .map(|k| (k, s.read(k)))
            .fold((0, f64::INFINITY), |acc, (k, sv)| {
                if sv < acc.1 {
                    (k, sv)
                } else {
                    acc
                }
            });

        if min_value > DEGENERATE_SINGULAR_VALUE {
            log::debug!(
                "Degenerate case, reflection with singular values ({}, {}, {})",
                s.read(0),
                s.read(1),
                s.read(2)
            );
            return Err(RigidFitError::DegenerateFit {
                smallest_singular_value: min_value,
            });
        }

        for row in v.iter_mut() {
            row[min_index] = -row[min_index];
        }
        rotation = compose(&v);
    }

    let rotated = mat33_mul_vec3(&rotation, &centroid_src);
    let translation = [
        centroid_dst[0] - rotated[0],
        centroid_dst[1] - rotated[1],
        centroid_dst[2] - rotated[2],
    ];

    Ok(RigidTransform {
        rotation,
        translation,
    })
}
