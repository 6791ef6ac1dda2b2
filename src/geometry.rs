//! Geometry helpers: parallelogram-to-affine solving and rounding

use crate::error::{EmfPlusError, EmfPlusResult};
use crate::types::{PointF, RectF, Transform};

type Matrix3 = [[f64; 3]; 3];

const SINGULAR_EPSILON: f64 = 1e-12;

/// Round to 10 decimal places, half away from zero.
///
/// Values too large to scale without losing precision are returned as-is.
pub fn round10(value: f64) -> f64 {
    let scaled = value * 1e10;
    if !scaled.is_finite() || scaled.abs() >= 9.0e15 {
        return value;
    }
    scaled.round() / 1e10
}

fn multiply(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

fn invert(m: &Matrix3) -> EmfPlusResult<Matrix3> {
    let cofactor = |r0: usize, r1: usize, c0: usize, c1: usize| m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0];

    let det = m[0][0] * cofactor(1, 2, 1, 2) - m[0][1] * cofactor(1, 2, 0, 2) + m[0][2] * cofactor(1, 2, 0, 1);
    if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
        return Err(EmfPlusError::SingularMatrix(format!(
            "source triangle determinant {}",
            det
        )));
    }

    // adjugate (transposed cofactor matrix) divided by the determinant
    let adj = [
        [cofactor(1, 2, 1, 2), -cofactor(0, 2, 1, 2), cofactor(0, 1, 1, 2)],
        [-cofactor(1, 2, 0, 2), cofactor(0, 2, 0, 2), -cofactor(0, 1, 0, 2)],
        [cofactor(1, 2, 0, 1), -cofactor(0, 2, 0, 1), cofactor(0, 1, 0, 1)],
    ];
    let mut inv = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            inv[i][j] = adj[i][j] / det;
        }
    }
    Ok(inv)
}

/// Solve the affine transform mapping the source rectangle corners
/// (min,min), (max,min), (min,max) onto `dest[0]`, `dest[1]`, `dest[2]`.
///
/// `dest` is in the wire read order of a DrawImagePoints record. Every
/// coefficient is rounded to 10 decimal places.
pub fn parallelogram_transform(src: &RectF, dest: &[PointF; 3]) -> EmfPlusResult<Transform> {
    let para: Matrix3 = [
        [dest[0].x, dest[1].x, dest[2].x],
        [dest[0].y, dest[1].y, dest[2].y],
        [1.0, 1.0, 1.0],
    ];
    let rect: Matrix3 = [
        [src.min_x(), src.max_x(), src.min_x()],
        [src.min_y(), src.min_y(), src.max_y()],
        [1.0, 1.0, 1.0],
    ];
    let m = multiply(&para, &invert(&rect)?);
    Ok(Transform::new(
        round10(m[0][0]),
        round10(m[1][0]),
        round10(m[0][1]),
        round10(m[1][1]),
        round10(m[0][2]),
        round10(m[1][2]),
    ))
}
