/// Multiply two 3x3 matrices, `c = a * b`.
pub fn matmul33(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut c = [[0.0; 3]; 3];
    for (i, row) in c.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    c
}

/// Transpose of a 3x3 matrix.
pub fn transpose33(a: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    [
        [a[0][0], a[1][0], a[2][0]],
        [a[0][1], a[1][1], a[2][1]],
        [a[0][2], a[1][2], a[2][2]],
    ]
}

/// Determinant of a 3x3 matrix.
pub fn det_mat33(a: &[[f64; 3]; 3]) -> f64 {
    a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0])
}

/// Multiply a 3x3 matrix with a 3d vector, `y = a * x`.
#[inline]
pub fn mat33_mul_vec3(a: &[[f64; 3]; 3], x: &[f64; 3]) -> [f64; 3] {
    [
        a[0][0] * x[0] + a[0][1] * x[1] + a[0][2] * x[2],
        a[1][0] * x[0] + a[1][1] * x[1] + a[1][2] * x[2],
        a[2][0] * x[0] + a[2][1] * x[1] + a[2][2] * x[2],
    ]
}

/// Squared euclidean distance between two points.
#[inline]
pub fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Check that a matrix is a proper rotation: orthonormal with determinant +1.
pub fn is_rotation_matrix(r: &[[f64; 3]; 3], epsilon: f64) -> bool {
    let rtr = matmul33(&transpose33(r), r);
    for (i, row) in rtr.iter().enumerate() {
        for (j, val) in row.iter().enumerate() {
            let expected = if i == j { 1.0 } else { 0.0 };
            if (val - expected).abs() > epsilon {
                return false;
            }
        }
    }
    (det_mat33(r) - 1.0).abs() <= epsilon
}
