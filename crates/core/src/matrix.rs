//! 2D affine transforms for PDF coordinate spaces.

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// A rectangle (x0, y0, x1, y1), bottom-left to top-right.
pub type Rect = (f64, f64, f64, f64);

/// A 6-element affine matrix (a, b, c, d, e, f) mapping (x, y) to
/// (ax + cy + e, bx + dy + f).
pub type Matrix = (f64, f64, f64, f64, f64, f64);

/// Identity transform.
pub const MATRIX_IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Composes two transforms; the result applies `inner` first, then `outer`.
pub fn mat_mul(inner: Matrix, outer: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = inner;
    let (a0, b0, c0, d0, e0, f0) = outer;
    (
        a0 * a1 + c0 * b1,
        b0 * a1 + d0 * b1,
        a0 * c1 + c0 * d1,
        b0 * c1 + d0 * d1,
        a0 * e1 + c0 * f1 + e0,
        b0 * e1 + d0 * f1 + f0,
    )
}

/// Prepends a translation by `v` to `m`.
pub fn mat_translate(m: Matrix, v: Point) -> Matrix {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a, b, c, d, x * a + y * c + e, x * b + y * d + f)
}

/// Applies `m` to a point.
pub fn mat_apply(m: Matrix, v: Point) -> Point {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a * x + c * y + e, b * x + d * y + f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_composition() {
        let m = (2.0, 0.0, 0.0, 3.0, 5.0, 7.0);
        assert_eq!(mat_mul(m, MATRIX_IDENTITY), m);
        assert_eq!(mat_mul(MATRIX_IDENTITY, m), m);
    }

    #[test]
    fn test_inner_applies_first() {
        // Scale by 2, then translate by (10, 0).
        let scale = (2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = (1.0, 0.0, 0.0, 1.0, 10.0, 0.0);
        let m = mat_mul(scale, shift);
        assert_eq!(mat_apply(m, (3.0, 4.0)), (16.0, 8.0));
    }

    #[test]
    fn test_translate_prepends() {
        let scale = (2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let m = mat_translate(scale, (5.0, 1.0));
        // (0, 0) under m lands where (5, 1) lands under scale.
        assert_eq!(mat_apply(m, (0.0, 0.0)), (10.0, 2.0));
    }

    #[test]
    fn test_apply_rotation() {
        // 90 degree counter-clockwise rotation.
        let rot = (0.0, 1.0, -1.0, 0.0, 0.0, 0.0);
        let (x, y) = mat_apply(rot, (1.0, 0.0));
        assert!((x - 0.0).abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
    }
}
