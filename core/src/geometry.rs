//! Planar math shared by the world and the combat systems.
//!
//! Angles are expressed in degrees and grow clockwise in screen space, matching
//! `atan2(dy, dx)` with the y axis pointing down the grid.

use glam::Vec2;

/// Computes the damage multiplier applied to a single hit.
///
/// The distance term decays linearly from one at the turret to zero at
/// `range`; a `range` of zero or less disables it. Every enemy already hit by
/// the same discharge further divides the result by `1 + 0.5 * hits`. The
/// multiplier is clamped into `[0, 1]` regardless of the inputs.
#[must_use]
pub fn damage_falloff(distance_sq: f32, range: f32, hits: u32) -> f32 {
    let distance_term = if range <= 0.0 {
        1.0
    } else {
        1.0 - distance_sq / (range * range)
    };
    let distance_term = if distance_term.is_nan() {
        0.0
    } else {
        distance_term.clamp(0.0, 1.0)
    };

    let pierce_term = 1.0 / (1.0 + 0.5 * hits as f32);
    (distance_term * pierce_term).clamp(0.0, 1.0)
}

/// Wraps an angle into `[0, 360)`.
#[must_use]
pub fn normalise_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }

    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation that carries `from` onto `to`, in `(-180, 180]`.
#[must_use]
pub fn signed_angle_delta(from: f32, to: f32) -> f32 {
    let delta = normalise_angle(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Absolute angular separation between two headings, in `[0, 180]`.
#[must_use]
pub fn angle_difference(from: f32, to: f32) -> f32 {
    signed_angle_delta(from, to).abs()
}

/// Steps `current` toward `target` by at most `max_delta` degrees.
///
/// Rotation follows the shorter arc and snaps onto the target once it lies
/// within a single step. The result is always normalised.
#[must_use]
pub fn move_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = signed_angle_delta(current, target);
    if delta.abs() < max_delta {
        return normalise_angle(target);
    }

    if delta > 0.0 {
        normalise_angle(current + max_delta)
    } else {
        normalise_angle(current - max_delta)
    }
}

/// Heading in degrees of the ray that starts at `from` and passes through `to`.
#[must_use]
pub fn heading_degrees(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    normalise_angle(delta.y.atan2(delta.x).to_degrees())
}

/// Unit vector pointing along the provided heading.
#[must_use]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}

/// Velocity of magnitude `speed` pointing from `from` toward `to`.
///
/// Coincident points yield a zero velocity instead of a non-finite one.
#[must_use]
pub fn velocity_towards(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

/// Predicts where a projectile fired now from `shooter` meets a moving target.
///
/// Solves `|target + velocity * t - shooter| = projectile_speed * t` for the
/// smallest positive `t`. When the quadratic is degenerate or has no positive
/// root the target's current position is returned, so callers always receive
/// a finite aim point for finite inputs.
#[must_use]
pub fn intercept_point(
    shooter: Vec2,
    target: Vec2,
    target_velocity: Vec2,
    projectile_speed: f32,
) -> Vec2 {
    let to_target = target - shooter;
    let a = target_velocity.length_squared() - projectile_speed * projectile_speed;
    let b = 2.0 * to_target.dot(target_velocity);
    let c = to_target.length_squared();
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 || a.abs() < 1.0e-4 {
        return target;
    }

    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);
    let time = if t1 > 0.0 {
        t1
    } else if t2 > 0.0 {
        t2
    } else {
        return target;
    };

    let aim = target + target_velocity * time;
    if aim.is_finite() {
        aim
    } else {
        target
    }
}

/// Reports whether two circles touch or overlap.
#[must_use]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) <= reach * reach
}

/// Reports whether a circle touches the segment between `start` and `end`.
#[must_use]
pub fn circle_intersects_segment(center: Vec2, radius: f32, start: Vec2, end: Vec2) -> bool {
    let segment = end - start;
    let length_sq = segment.length_squared();
    let closest = if length_sq <= f32::EPSILON {
        start
    } else {
        let t = ((center - start).dot(segment) / length_sq).clamp(0.0, 1.0);
        start + segment * t
    };
    center.distance_squared(closest) <= radius * radius
}

/// Linear interpolation between `from` and `to`.
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
