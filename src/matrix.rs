pub mod stack;

pub use stack::MatrixStack;

use cgmath::{Matrix4 as Mat4, Vector3 as Vec3};
use std::ops::Mul;

/// 4x4 仿射变换矩阵，列主序存储：第 r 行第 c 列位于 `c * 4 + r`。
/// 采用列向量约定 `p' = M * p`，平移量位于下标 12、13、14。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4(pub [f32; 16]);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    #[rustfmt::skip]
    pub const IDENTITY: Matrix4 = Matrix4([
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// 标准矩阵乘法 `self * other`。不满足交换律：
    /// 右乘的 `other` 在 `self` 已经建立的局部坐标系中生效。
    pub fn multiply(&self, other: &Matrix4) -> Matrix4 {
        let a = &self.0;
        let b = &other.0;
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a[k * 4 + row] * b[col * 4 + k];
                }
                out[col * 4 + row] = sum;
            }
        }
        Matrix4(out)
    }

    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.0[12] = x;
        m.0[13] = y;
        m.0[14] = z;
        m
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.0[0] = x;
        m.0[5] = y;
        m.0[10] = z;
        m
    }

    pub fn rotate_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::IDENTITY;
        m.0[5] = c;
        m.0[6] = s;
        m.0[9] = -s;
        m.0[10] = c;
        m
    }

    pub fn rotate_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::IDENTITY;
        m.0[0] = c;
        m.0[2] = -s;
        m.0[8] = s;
        m.0[10] = c;
        m
    }

    pub fn rotate_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::IDENTITY;
        m.0[0] = c;
        m.0[1] = s;
        m.0[4] = -s;
        m.0[5] = c;
        m
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[col * 4 + row]
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.0
    }

    // w 取 1，不做透视除法
    pub fn transform_point(&self, p: Vec3<f32>) -> Vec3<f32> {
        let m = &self.0;
        Vec3::new(
            m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12],
            m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13],
            m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14],
        )
    }

    pub fn approx_eq(&self, other: &Matrix4, eps: f32) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        self.multiply(&rhs)
    }
}

impl From<Matrix4> for Mat4<f32> {
    #[rustfmt::skip]
    fn from(m: Matrix4) -> Self {
        let a = m.as_array();
        // cgmath 同样是列主序，按列依次传入即可
        Mat4::new(
            a[0],  a[1],  a[2],  a[3],
            a[4],  a[5],  a[6],  a[7],
            a[8],  a[9],  a[10], a[11],
            a[12], a[13], a[14], a[15],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, Transform};
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    fn close(a: Vec3<f32>, b: Vec3<f32>) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS && (a.z - b.z).abs() < EPS
    }

    fn sample() -> Matrix4 {
        Matrix4::translate(0.3, -1.2, 2.0)
            * Matrix4::rotate_y(0.7)
            * Matrix4::rotate_x(-0.4)
            * Matrix4::scale(1.5, 0.5, 2.0)
    }

    #[test]
    fn identity_is_neutral_on_both_sides() {
        let m = sample();
        assert!(m.multiply(&Matrix4::identity()).approx_eq(&m, EPS));
        assert!(Matrix4::identity().multiply(&m).approx_eq(&m, EPS));
    }

    #[test]
    fn multiply_is_associative() {
        let a = Matrix4::rotate_z(0.3) * Matrix4::translate(1.0, 2.0, 3.0);
        let b = Matrix4::scale(2.0, 0.5, 1.0) * Matrix4::rotate_x(1.1);
        let c = Matrix4::translate(-0.5, 0.0, 4.0) * Matrix4::rotate_y(-0.8);
        let left = (a * b) * c;
        let right = a * (b * c);
        assert!(left.approx_eq(&right, 1e-4));
    }

    #[test]
    fn multiply_is_not_commutative() {
        let t = Matrix4::translate(1.0, 0.0, 0.0);
        let s = Matrix4::scale(2.0, 2.0, 2.0);
        assert!(!(t * s).approx_eq(&(s * t), EPS));
    }

    #[test]
    fn translate_then_scale_applies_scale_locally() {
        let m = Matrix4::translate(1.0, 0.0, 0.0) * Matrix4::scale(2.0, 2.0, 2.0);
        let p = m.transform_point(Vec3::new(0.5, 0.5, 0.5));
        assert!(close(p, Vec3::new(2.0, 1.0, 1.0)));
    }

    #[test]
    fn rotations_follow_right_hand_rule() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        let z = Vec3::new(0.0, 0.0, 1.0);
        assert!(close(Matrix4::rotate_z(FRAC_PI_2).transform_point(x), y));
        assert!(close(Matrix4::rotate_x(FRAC_PI_2).transform_point(y), z));
        assert!(close(Matrix4::rotate_y(FRAC_PI_2).transform_point(z), x));
    }

    #[test]
    fn cgmath_conversion_keeps_layout() {
        let m = sample();
        let cg: Mat4<f32> = m.into();
        let p = Vec3::new(0.25, -0.5, 1.0);
        let ours = m.transform_point(p);
        let theirs = cg.transform_point(Point3::new(p.x, p.y, p.z));
        assert!(close(ours, Vec3::new(theirs.x, theirs.y, theirs.z)));
        assert_eq!(m.get(0, 3), 0.3);
        assert_eq!(m.as_array()[12], m.get(0, 3));
    }
}
