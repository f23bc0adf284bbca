//! Mathematical utilities: rotation vectors, skew matrices, element triads

use nalgebra::{DVector, Matrix3, Matrix6, Rotation3, UnitQuaternion, Vector3, Vector6};

pub type Mat3 = Matrix3<f64>;
pub type Mat6 = Matrix6<f64>;
pub type Vec3 = Vector3<f64>;
pub type Vec6 = Vector6<f64>;
pub type DVec = DVector<f64>;
pub type Quat = UnitQuaternion<f64>;

/// Below this rotation angle the tangent operator uses its series expansion
const SMALL_ANGLE: f64 = 1e-8;

/// Skew-symmetric (cross product) matrix of `v`, so that `skew(a) * b == a x b`
#[rustfmt::skip]
pub fn skew(v: &Vec3) -> Mat3 {
    Mat3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Normalized copy of `v`, or `None` for a (numerically) zero vector
pub fn unit_vector(v: &Vec3) -> Option<Vec3> {
    v.try_normalize(1e-12)
}

/// Rotation matrix from a Cartesian rotation vector (CRV)
pub fn crv2rotation(psi: &Vec3) -> Mat3 {
    Rotation3::from_scaled_axis(*psi).into_inner()
}

/// Cartesian rotation vector of an orthonormal rotation matrix
pub fn rotation2crv(rot: &Mat3) -> Vec3 {
    Rotation3::from_matrix_unchecked(*rot).scaled_axis()
}

/// Tangent operator `T(psi)` of the rotation vector
///
/// `T = I + (cos|psi| - 1)/|psi|^2 * skew(psi) + (1 - sin|psi|/|psi|)/|psi|^2 * skew(psi)^2`
pub fn crv2tan(psi: &Vec3) -> Mat3 {
    let norm = psi.norm();
    let psi_skew = skew(psi);
    if norm < SMALL_ANGLE {
        return Mat3::identity() - 0.5 * psi_skew + (1.0 / 6.0) * psi_skew * psi_skew;
    }
    let norm2 = norm * norm;
    Mat3::identity()
        + (norm.cos() - 1.0) / norm2 * psi_skew
        + (1.0 - norm.sin() / norm) / norm2 * psi_skew * psi_skew
}

/// Inverse of the transposed tangent operator, `T(psi)^-T`
///
/// Returns `None` at the singular angles `|psi| = 2*k*pi`, k > 0.
pub fn crv2invtant(psi: &Vec3) -> Option<Mat3> {
    crv2tan(psi).transpose().try_inverse()
}

/// Quaternion from roll, pitch and yaw angles (radians)
pub fn euler2quat(euler: &Vec3) -> Quat {
    Quat::from_euler_angles(euler.x, euler.y, euler.z)
}

/// Quaternion from `[w, x, y, z]` components, normalized
pub fn quat_from_array(q: &[f64; 4]) -> Quat {
    Quat::from_quaternion(nalgebra::Quaternion::new(q[0], q[1], q[2], q[3]))
}

/// Local beam triad `[tangent | normal | binormal]` (as matrix columns)
///
/// The tangent lies along `chord`. The normal is the part of `preferred`
/// orthogonal to the chord, and the pair (normal, binormal) is then rotated
/// by `twist` about the tangent. Returns `None` when the chord has zero
/// length or `preferred` is parallel to it.
pub fn element_triad(chord: &Vec3, preferred: &Vec3, twist: f64) -> Option<Mat3> {
    let tangent = unit_vector(chord)?;
    let normal = unit_vector(&(preferred - preferred.dot(&tangent) * tangent))?;
    let binormal = tangent.cross(&normal);

    let (sin, cos) = twist.sin_cos();
    let normal_tw = cos * normal + sin * binormal;
    let binormal_tw = cos * binormal - sin * normal;

    Some(Mat3::from_columns(&[tangent, normal_tw, binormal_tw]))
}
