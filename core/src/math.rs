//! Math type aliases and the local transform type used by scene nodes.

pub use nalgebra;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// Use [`quat_from_array`] or `Quaternion::new(w, x, y, z)` to construct.
pub type Quat = nalgebra::Quaternion<f32>;

/// Create a quaternion from a `[x, y, z, w]` array.
pub fn quat_from_array(a: [f32; 4]) -> Quat {
    nalgebra::Quaternion::new(a[3], a[0], a[1], a[2])
}

/// Build a 4x4 TRS matrix from translation, rotation (quaternion), and scale.
pub fn mat4_from_translation_rotation_scale(
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
) -> Mat4 {
    let r = nalgebra::UnitQuaternion::new_unchecked(rotation);
    let rm = r.to_rotation_matrix();
    let rm = rm.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Local transform of a scene node.
///
/// Holds decomposed translation/rotation/scale plus an optional raw matrix
/// override. Setters may be called in any combination; the matrix, when set,
/// replaces the composed TRS result because it is applied last in the
/// interchange field order.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    matrix: Option<Mat4>,
}

impl Transform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            matrix: None,
        }
    }

    /// Set the translation component.
    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    /// Set the rotation component (xyzw quaternion).
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Set the scale component.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Set a raw matrix override. Wins over the composed TRS result.
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = Some(matrix);
    }

    /// Get the translation component.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Get the rotation component.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Get the scale component.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Get the raw matrix override, if one was set.
    pub fn matrix_override(&self) -> Option<&Mat4> {
        self.matrix.as_ref()
    }

    /// Compute the local matrix.
    ///
    /// Returns the matrix override when present, otherwise composes
    /// translation * rotation * scale.
    pub fn local_matrix(&self) -> Mat4 {
        match self.matrix {
            Some(m) => m,
            None => mat4_from_translation_rotation_scale(
                self.translation,
                self.rotation,
                self.scale,
            ),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_local_matrix() {
        let t = Transform::identity();
        assert_eq!(t.local_matrix(), Mat4::identity());
    }

    #[test]
    fn translation_lands_in_last_column() {
        let mut t = Transform::identity();
        t.set_translation(Vec3::new(1.0, 2.0, 3.0));
        let m = t.local_matrix();
        assert_eq!(m[(0, 3)], 1.0);
        assert_eq!(m[(1, 3)], 2.0);
        assert_eq!(m[(2, 3)], 3.0);
    }

    #[test]
    fn scale_lands_on_diagonal() {
        let mut t = Transform::identity();
        t.set_scale(Vec3::new(2.0, 3.0, 4.0));
        let m = t.local_matrix();
        assert_eq!(m[(0, 0)], 2.0);
        assert_eq!(m[(1, 1)], 3.0);
        assert_eq!(m[(2, 2)], 4.0);
    }

    #[test]
    fn matrix_override_wins_over_trs() {
        let mut t = Transform::identity();
        t.set_translation(Vec3::new(5.0, 0.0, 0.0));
        let raw = Mat4::new_translation(&Vec3::new(-1.0, -1.0, -1.0));
        t.set_matrix(raw);
        assert_eq!(t.local_matrix(), raw);
    }

    #[test]
    fn quat_array_round_trip() {
        let q = quat_from_array([0.0, 0.707, 0.0, 0.707]);
        assert_eq!(q.coords.x, 0.0);
        assert_eq!(q.coords.y, 0.707);
        assert_eq!(q.w, 0.707);
    }
}
