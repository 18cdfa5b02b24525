//! Pairwise attraction and magnitude clamping

use ultraviolet::Vec2;

/// Separations below this are treated as this, so the inverse-square term
/// stays bounded when bodies overlap.
pub const MIN_DISTANCE: f32 = 0.5;

/// Acceleration pulling a body at `from` toward a body of mass `mass` at `to`:
/// `g * m * normalize(to - from) / max(|to - from|, MIN_DISTANCE)^2`.
///
/// Coincident bodies have no direction between them and contribute nothing.
pub fn attraction(g: f32, from: Vec2, to: Vec2, mass: f32) -> Vec2 {
    let r = to - from;
    let len = r.mag();
    if len <= f32::EPSILON {
        return Vec2::zero();
    }
    let d = len.max(MIN_DISTANCE);
    (r / len) * (g * mass / (d * d))
}

/// Scales `v` down to `max` if it is longer, keeping its direction.
pub fn clamp_magnitude(v: Vec2, max: f32) -> Vec2 {
    let len = v.mag();
    if len > max {
        v * (max / len)
    } else {
        v
    }
}

/// `1 / (1 + mass)^2`: heavier bodies respond less to the same force.
pub fn mass_factor(mass: f32) -> f32 {
    1.0 / ((1.0 + mass) * (1.0 + mass))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limits_length() {
        let v = clamp_magnitude(Vec2::new(100.0, 0.0), 10.0);
        assert!((v.mag() - 10.0).abs() < 1e-5);
        assert!((v.x - 10.0).abs() < 1e-5);

        let v = clamp_magnitude(Vec2::new(0.0, 50.0), 100.0);
        assert_eq!(v, Vec2::new(0.0, 50.0));
    }

    #[test]
    fn attraction_points_toward_other_body() {
        let a = attraction(1.0, Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0), 2.0);
        assert!(a.x > 0.0);
        assert_eq!(a.y, 0.0);
        // g * m / d^2 = 1 * 2 / 4
        assert!((a.mag() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn attraction_is_inverse_square() {
        let near = attraction(1.0, Vec2::zero(), Vec2::new(2.0, 0.0), 1.0);
        let far = attraction(1.0, Vec2::zero(), Vec2::new(4.0, 0.0), 1.0);
        assert!((near.mag() / far.mag() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn distance_floor_bounds_close_encounters() {
        let close = attraction(1.0, Vec2::zero(), Vec2::new(1e-3, 0.0), 1.0);
        // 1 / 0.5^2
        assert!((close.mag() - 4.0).abs() < 1e-4);

        let same = attraction(1.0, Vec2::zero(), Vec2::zero(), 1.0);
        assert_eq!(same, Vec2::zero());
    }
}
