use glam::Vec2;

/// 2D vector helpers the kernel needs beyond what `glam::Vec2` names.
///
/// Orientation is carried as a unit axis vector, never an angle. `Vec2::rotate`
/// (complex multiply) takes local coordinates to world; [`Vec2Ext::unrotate`]
/// is its inverse and takes world offsets into an axis' local frame.
pub trait Vec2Ext {
    /// Rotate by the conjugate of `op`: `(x·op.x + y·op.y, op.x·y − x·op.y)`.
    fn unrotate(self, op: Vec2) -> Vec2;

    /// Swap components, i.e. reflect about the line `y = x`.
    fn reflect_diagonal(self) -> Vec2;

    /// Unit vector in the same direction. Must not be called on a zero vector.
    fn unit(self) -> Vec2;

    /// Unit vector in the same direction, or `fallback` when the length is zero.
    fn unit_or(self, fallback: Vec2) -> Vec2;

    /// Rotation operator that turns `from` into `to` when applied with `Vec2::rotate`.
    fn rotation_to(self, to: Vec2) -> Vec2;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn unrotate(self, op: Vec2) -> Vec2 {
        Vec2::new(self.x * op.x + self.y * op.y, op.x * self.y - self.x * op.y)
    }

    #[inline]
    fn reflect_diagonal(self) -> Vec2 {
        Vec2::new(self.y, self.x)
    }

    #[inline]
    fn unit(self) -> Vec2 {
        let len = self.length();
        debug_assert!(len > 0.0, "normalizing a zero-length vector");
        self / len
    }

    #[inline]
    fn unit_or(self, fallback: Vec2) -> Vec2 {
        let len2 = self.length_squared();
        if len2 > 0.0 { self / len2.sqrt() } else { fallback }
    }

    #[inline]
    fn rotation_to(self, to: Vec2) -> Vec2 {
        to.unrotate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn test_unrotate_inverts_rotate() {
        let op = Vec2::from_angle(0.7);
        let v = Vec2::new(3.0, -2.0);
        let back = op.rotate(v).unrotate(op);
        assert_abs_diff_eq!(back.x, v.x, epsilon = 1e-5);
        assert_abs_diff_eq!(back.y, v.y, epsilon = 1e-5);
    }

    #[test]
    fn test_unrotate_quarter_turn() {
        // World +Y seen from a frame whose x axis points along +Y is local +X.
        let local = Vec2::Y.unrotate(Vec2::from_angle(FRAC_PI_2));
        assert_abs_diff_eq!(local.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(local.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_to() {
        let from = Vec2::from_angle(0.3);
        let to = Vec2::from_angle(1.1);
        let op = from.rotation_to(to);
        let r = op.rotate(from);
        assert_abs_diff_eq!(r.x, to.x, epsilon = 1e-5);
        assert_abs_diff_eq!(r.y, to.y, epsilon = 1e-5);
    }

    #[test]
    fn test_unit_or_zero() {
        assert_eq!(Vec2::ZERO.unit_or(Vec2::X), Vec2::X);
        let u = Vec2::new(3.0, 4.0).unit_or(Vec2::X);
        assert_abs_diff_eq!(u.length(), 1.0, epsilon = 1e-6);
        assert_eq!(Vec2::new(1.0, 2.0).reflect_diagonal(), Vec2::new(2.0, 1.0));
    }
}
