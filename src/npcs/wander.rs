use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use super::AmbientWalker;
use crate::shared::*;

/// How far a walker turns after bumping into something.
pub const BUMP_TURN_DEGREES: f32 = 46.0;
/// Fraction of the remaining turn closed per second.
pub const TURN_RATE: f32 = 2.0;

// ─────────────────────────────────────────────────────────────────────────────
// Steering math
// ─────────────────────────────────────────────────────────────────────────────

/// Uniform random point in the disc of `range` around `home`.
pub fn random_point_near(rng: &mut impl Rng, home: Vec2, range: f32) -> Vec2 {
    if range <= 0.0 {
        return home;
    }
    let angle = rng.gen_range(0.0..TAU);
    let radius = range * rng.gen_range(0.0_f32..=1.0).sqrt();
    home + Vec2::from_angle(angle) * radius
}

/// Wraps an angle into (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Turns `current` towards `desired` along the shorter arc by fraction `t`.
pub fn steer_heading(current: f32, desired: f32, t: f32) -> f32 {
    let diff = wrap_angle(desired - current);
    wrap_angle(current + diff * t.clamp(0.0, 1.0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Walkers head for a random point near home, picking a new one every
/// `change_interval` seconds, and turn away from obstacles they walk into.
pub fn wander_walkers(
    time: Res<Time>,
    mut walkers: Query<(&mut AmbientWalker, &mut Transform), Without<Obstacle>>,
    obstacles: Query<(&Transform, &HitRegion), With<Obstacle>>,
) {
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();

    for (mut walker, mut transform) in &mut walkers {
        walker.retarget.tick(time.delta());
        if walker.retarget.just_finished() {
            walker.target = random_point_near(&mut rng, walker.home, walker.walk_range);
        }

        let position = transform.translation.truncate();
        let to_target = walker.target - position;
        if to_target.length_squared() > 1.0 {
            let desired = to_target.to_angle();
            walker.heading = steer_heading(walker.heading, desired, dt * TURN_RATE);
        }

        let next = position + Vec2::from_angle(walker.heading) * walker.speed * dt;
        let blocked = obstacles
            .iter()
            .filter(|(_, region)| region.enabled)
            .any(|(obstacle, region)| region.rect_at(obstacle.translation.truncate()).contains(next));

        if blocked {
            if !walker.bumping {
                walker.bumping = true;
                walker.heading = wrap_angle(walker.heading + BUMP_TURN_DEGREES.to_radians());
                walker.target = random_point_near(&mut rng, walker.home, walker.walk_range);
            }
            continue;
        }
        walker.bumping = false;

        transform.translation.x = next.x;
        transform.translation.y = next.y;
        transform.rotation = Quat::from_rotation_z(walker.heading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_points_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let home = Vec2::new(100.0, -50.0);
        for _ in 0..200 {
            let p = random_point_near(&mut rng, home, 150.0);
            assert!(p.distance(home) <= 150.0 + 1e-3);
        }
        assert_eq!(random_point_near(&mut rng, home, 0.0), home);
    }

    #[test]
    fn test_steer_takes_the_short_way_round() {
        let current = 170f32.to_radians();
        let desired = -170f32.to_radians();
        let halfway = steer_heading(current, desired, 0.5);
        // Crossing PI, not sweeping back through zero.
        assert!(halfway.abs() > 175f32.to_radians());
    }

    #[test]
    fn test_steer_full_turn_lands_on_target() {
        let h = steer_heading(0.0, 1.0, 1.0);
        assert!((h - 1.0).abs() < 1e-5);
        assert!((steer_heading(0.0, 1.0, 5.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-5);
    }
}
