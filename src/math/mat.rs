use crate::Float;

use super::{cross, dot, normalize, to_radians};

/// A row-major 4x4 matrix. All of the transform directives mutate the
/// current matrix in place by multiplying the new transform onto the right,
/// matching how the transform stack composes with nested scopes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub rows: [[Float; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Mat4 {
        Mat4::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Builds a matrix from 16 values in row-major order.
    pub fn from_rows(v: [Float; 16]) -> Mat4 {
        Mat4 {
            rows: [
                [v[0], v[1], v[2], v[3]],
                [v[4], v[5], v[6], v[7]],
                [v[8], v[9], v[10], v[11]],
                [v[12], v[13], v[14], v[15]],
            ],
        }
    }

    /// Builds a matrix from 16 values in column-major order, as provided by
    /// the `Transform` and `ConcatTransform` directives.
    pub fn from_columns(v: [Float; 16]) -> Mat4 {
        Mat4 {
            rows: [
                [v[0], v[4], v[8], v[12]],
                [v[1], v[5], v[9], v[13]],
                [v[2], v[6], v[10], v[14]],
                [v[3], v[7], v[11], v[15]],
            ],
        }
    }

    pub fn identity(&mut self) {
        *self = Mat4::IDENTITY;
    }

    pub fn translate(&mut self, v: [Float; 3]) {
        for row in self.rows.iter_mut() {
            row[3] += row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
        }
    }

    pub fn scale(&mut self, v: [Float; 3]) {
        for row in self.rows.iter_mut() {
            row[0] *= v[0];
            row[1] *= v[1];
            row[2] *= v[2];
        }
    }

    /// Axis-angle rotation; the angle is in degrees and the axis is
    /// normalized before use.
    pub fn rotate(&mut self, angle_degrees: Float, axis: [Float; 3]) {
        let angle = to_radians(angle_degrees);
        let c = angle.cos();
        let s = angle.sin();
        let u = normalize(axis);

        let b = [
            [
                u[0] * u[0] * (1.0 - c) + c,
                u[0] * u[1] * (1.0 - c) - u[2] * s,
                u[0] * u[2] * (1.0 - c) + u[1] * s,
            ],
            [
                u[1] * u[0] * (1.0 - c) + u[2] * s,
                u[1] * u[1] * (1.0 - c) + c,
                u[1] * u[2] * (1.0 - c) - u[0] * s,
            ],
            [
                u[2] * u[0] * (1.0 - c) - u[1] * s,
                u[2] * u[1] * (1.0 - c) + u[0] * s,
                u[2] * u[2] * (1.0 - c) + c,
            ],
        ];

        let a = self.rows;
        for i in 0..4 {
            for j in 0..3 {
                self.rows[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
    }

    /// Right-multiplies the inverse of a camera-to-world matrix built from
    /// the eye position, target point, and up vector.
    pub fn look_at(&mut self, eye: [Float; 3], target: [Float; 3], up: [Float; 3]) {
        let pos = eye;
        let dir = normalize([
            target[0] - eye[0],
            target[1] - eye[1],
            target[2] - eye[2],
        ]);
        let right = normalize(cross(normalize(up), dir));
        let new_up = cross(dir, right);

        // The camera-to-world matrix has columns (right, new_up, dir, pos);
        // its inverse has those vectors as rows with the translation
        // projected onto each.
        let b = [
            [right[0], right[1], right[2], -dot(right, pos)],
            [new_up[0], new_up[1], new_up[2], -dot(new_up, pos)],
            [dir[0], dir[1], dir[2], -dot(dir, pos)],
            [0.0, 0.0, 0.0, 1.0],
        ];

        self.concat(&Mat4 { rows: b });
    }

    /// Right-multiplies `other` onto this matrix.
    pub fn concat(&mut self, other: &Mat4) {
        let a = self.rows;
        let b = other.rows;
        for i in 0..4 {
            for j in 0..4 {
                self.rows[i][j] =
                    a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j] + a[i][3] * b[3][j];
            }
        }
    }

    /// Inverts the matrix by Gauss-Jordan elimination with partial
    /// pivoting. Returns `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Mat4> {
        let mut a = self.rows;
        let mut inv = Mat4::IDENTITY.rows;

        for col in 0..4 {
            let mut pivot = col;
            for row in (col + 1)..4 {
                if a[row][col].abs() > a[pivot][col].abs() {
                    pivot = row;
                }
            }
            if a[pivot][col] == 0.0 {
                return None;
            }
            a.swap(col, pivot);
            inv.swap(col, pivot);

            let scale = 1.0 / a[col][col];
            for j in 0..4 {
                a[col][j] *= scale;
                inv[col][j] *= scale;
            }

            for row in 0..4 {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..4 {
                    a[row][j] -= factor * a[col][j];
                    inv[row][j] -= factor * inv[col][j];
                }
            }
        }

        Some(Mat4 { rows: inv })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn assert_mat_eq(a: &Mat4, b: &Mat4, epsilon: Float) {
        for i in 0..4 {
            for j in 0..4 {
                assert_abs_diff_eq!(a.rows[i][j], b.rows[i][j], epsilon = epsilon);
            }
        }
    }

    #[test]
    fn translate_zero_is_identity() {
        let mut m = Mat4::IDENTITY;
        m.translate([0.0, 0.0, 0.0]);
        assert_mat_eq(&m, &Mat4::IDENTITY, 0.0);
    }

    #[test]
    fn translate_composes_with_scale() {
        let mut m = Mat4::IDENTITY;
        m.scale([2.0, 2.0, 2.0]);
        m.translate([1.0, 0.0, 0.0]);
        // Scale applied first in world space: the point (1, 0, 0) maps to
        // (2 * (1 + 1), 0, 0).
        assert_abs_diff_eq!(m.rows[0][3], 2.0);
        assert_abs_diff_eq!(m.rows[0][0], 2.0);
    }

    #[test]
    fn rotate_quarter_turn_about_z() {
        let mut m = Mat4::IDENTITY;
        m.rotate(90.0, [0.0, 0.0, 1.0]);
        // Column 0 is the image of the x axis.
        assert_abs_diff_eq!(m.rows[0][0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m.rows[1][0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m.rows[2][0], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn rotate_normalizes_axis() {
        let mut a = Mat4::IDENTITY;
        a.rotate(30.0, [0.0, 0.0, 10.0]);
        let mut b = Mat4::IDENTITY;
        b.rotate(30.0, [0.0, 0.0, 1.0]);
        assert_mat_eq(&a, &b, 1e-6);
    }

    #[test]
    fn look_at_orthonormal_rotation() {
        let mut m = Mat4::IDENTITY;
        m.look_at([1.0, 2.0, 3.0], [1.0, 2.0, 4.0], [0.0, 1.0, 0.0]);
        let r = &m.rows;
        for i in 0..3 {
            let row = [r[i][0], r[i][1], r[i][2]];
            assert_abs_diff_eq!(dot(row, row), 1.0, epsilon = 1e-5);
            for j in (i + 1)..3 {
                let other = [r[j][0], r[j][1], r[j][2]];
                assert_abs_diff_eq!(dot(row, other), 0.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn inverse_round_trip() {
        let mut m = Mat4::IDENTITY;
        m.translate([1.0, -2.0, 0.5]);
        m.rotate(40.0, [1.0, 1.0, 0.0]);
        m.scale([2.0, 3.0, 4.0]);
        let inv = m.inverse().unwrap();
        let mut product = m;
        product.concat(&inv);
        assert_mat_eq(&product, &Mat4::IDENTITY, 1e-5);
    }

    #[test]
    fn inverse_of_singular_is_none() {
        let mut m = Mat4::IDENTITY;
        m.scale([0.0, 1.0, 1.0]);
        assert!(m.inverse().is_none());
    }

    #[test]
    fn column_major_load_transposes() {
        let mut v = [0.0; 16];
        for (i, value) in v.iter_mut().enumerate() {
            *value = i as Float;
        }
        let m = Mat4::from_columns(v);
        assert_eq!(m.rows[0], [0.0, 4.0, 8.0, 12.0]);
        assert_eq!(m.rows[3], [3.0, 7.0, 11.0, 15.0]);
    }
}
