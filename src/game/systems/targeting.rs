//! Lead prediction for UFO gunners
//!
//! Solves for the time `t` at which a shot fired now at speed `s` meets a target
//! moving with constant velocity. Working in the frame where the target moves
//! along +x, `|p + v·t| = s·t` becomes `a·t² + b·t + c = 0` with
//! `a = s² − v²`, `b = −2·p.x·v`, `c = −|p|²`.

use crate::util::vec2::Vec2;

/// Below this `|a|` the quadratic is treated as linear
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Intercept time for a target whose velocity lies along +x with speed `v`.
/// `None` when no non-negative intercept exists.
pub fn intercept_time_scalar(p: Vec2, v: f32, s: f32) -> Option<f32> {
    if !(s > 0.0) {
        return None;
    }
    let a = s * s - v * v;
    let b = -2.0 * p.x * v;
    let c = -(p.x * p.x + p.y * p.y);

    if a.abs() <= DEGENERATE_EPSILON * s * s {
        return linear_root(b, c);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let r = discriminant.sqrt();
    let t1 = (-b - r) / (2.0 * a);
    let t2 = (-b + r) / (2.0 * a);
    match (t1 >= 0.0, t2 >= 0.0) {
        (true, true) => Some(t1.min(t2)),
        (false, false) => None,
        _ => Some(t1.max(t2)),
    }
}

/// `b·t + c = 0`, non-negative roots only
fn linear_root(b: f32, c: f32) -> Option<f32> {
    if b == 0.0 {
        return (c == 0.0).then_some(0.0);
    }
    let t = -c / b;
    (t >= 0.0 && t.is_finite()).then_some(t)
}

/// Intercept time for relative position `p` and target velocity `v`
pub fn intercept_time(p: Vec2, v: Vec2, s: f32) -> Option<f32> {
    intercept_time_scalar(p.rotate(-v.angle()), v.length(), s)
}

/// Angle to fire at so the shot meets the target
pub fn firing_angle(p: Vec2, v: Vec2, s: f32) -> Option<f32> {
    let t = intercept_time(p, v, s)?;
    Some((p + v * t).angle())
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: f32 = 400.0;

    #[test]
    fn test_head_on_at_shot_speed() {
        let t = intercept_time(Vec2::new(100.0, 0.0), Vec2::new(-S, 0.0), S).unwrap();
        assert!(t.is_finite());
        assert!(t >= 0.0);
        assert!((t - 100.0 / (2.0 * S)).abs() < 1e-4);
    }

    #[test]
    fn test_receding_faster_than_shot() {
        assert!(intercept_time(Vec2::new(100.0, 0.0), Vec2::new(2.0 * S, 0.0), S).is_none());
    }

    #[test]
    fn test_stationary_target() {
        let p = Vec2::new(30.0, 40.0);
        let t = intercept_time(p, Vec2::ZERO, 10.0).unwrap();
        assert!((t - 5.0).abs() < 1e-4);
        let angle = firing_angle(p, Vec2::ZERO, 10.0).unwrap();
        assert!((angle - p.angle()).abs() < 1e-5);
    }

    #[test]
    fn test_crossing_target_is_hit() {
        let p = Vec2::new(200.0, 0.0);
        let v = Vec2::new(0.0, 150.0);
        let t = intercept_time(p, v, S).unwrap();
        let angle = firing_angle(p, v, S).unwrap();
        let shot = Vec2::from_angle(angle) * S * t;
        let target = p + v * t;
        assert!(shot.approx_eq(target, 1e-2));
        assert!(angle > 0.0, "must lead upward");
    }

    #[test]
    fn test_equal_speed_receding_has_no_solution() {
        // a == 0, target running straight away at shot speed
        assert!(intercept_time(Vec2::new(100.0, 0.0), Vec2::new(S, 0.0), S).is_none());
    }

    #[test]
    fn test_equal_speed_crossing_is_linear() {
        let p = Vec2::new(0.0, 100.0);
        let v = Vec2::new(S, 0.0);
        let t = intercept_time(p, v, S);
        // Moving perpendicular at equal speed: b == 0 and c != 0
        assert!(t.is_none());
    }

    #[test]
    fn test_non_positive_shot_speed() {
        assert!(intercept_time(Vec2::new(10.0, 0.0), Vec2::ZERO, 0.0).is_none());
        assert!(intercept_time(Vec2::new(10.0, 0.0), Vec2::ZERO, -5.0).is_none());
    }

    #[test]
    fn test_scalar_mixed_roots_picks_non_negative() {
        // Target behind us moving away slower than the shot
        let t = intercept_time_scalar(Vec2::new(-100.0, 0.0), 100.0, S).unwrap();
        assert!(t >= 0.0);
        assert!((t - 100.0 / (S + 100.0)).abs() < 1e-4);
    }
}
