//! Frame-stepped tweens for UI slides and world-space moves.
//!
//! A tween lives as a component on the entity it animates. Inserting a new
//! one replaces the in-flight tween, which is how animations are cancelled.

use bevy::prelude::*;

// ═══════════════════════════════════════════════════════════════════════
// TWEEN MATH
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    SmoothStep,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: Vec2,
    pub to: Vec2,
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: Vec2, to: Vec2, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            easing,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(self.duration.max(0.0));
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        self.easing.apply(self.elapsed / self.duration)
    }

    pub fn value(&self) -> Vec2 {
        self.from.lerp(self.to, self.progress())
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Slides an absolutely positioned UI node. `x` drives `left`, `y` drives `bottom`.
///
/// A finished slide stays on the entity, settled, until the next one is
/// inserted over it.
#[derive(Component, Debug, Clone, Copy)]
pub struct UiSlide {
    pub tween: Tween,
    /// Hide the node once it has arrived.
    pub hide_on_finish: bool,
    settled: bool,
}

impl UiSlide {
    pub fn new(tween: Tween, hide_on_finish: bool) -> Self {
        Self {
            tween,
            hide_on_finish,
            settled: false,
        }
    }

    pub fn settled(&self) -> bool {
        self.settled
    }
}

/// Moves a world entity on the XY plane and turns it about Z.
#[derive(Component, Debug, Clone, Copy)]
pub struct WorldMove {
    pub tween: Tween,
    pub rotation_from: f32,
    pub rotation_to: f32,
    settled: bool,
}

impl WorldMove {
    pub fn to(from: &Transform, target: Vec2, target_rotation: f32, duration: f32) -> Self {
        let (_, _, rotation_from) = from.rotation.to_euler(EulerRot::XYZ);
        Self {
            tween: Tween::new(from.translation.truncate(), target, duration, Easing::SmoothStep),
            rotation_from,
            rotation_to: target_rotation,
            settled: false,
        }
    }

    pub fn settled(&self) -> bool {
        self.settled
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN & SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Tweens advance here. Anything that inserts tweens runs after this set,
/// so a replacement is never overwritten by the one it replaced.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TweenSet;

pub struct TweenPlugin;

impl Plugin for TweenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (advance_ui_slides, advance_world_moves).in_set(TweenSet),
        );
    }
}

pub fn advance_ui_slides(
    time: Res<Time>,
    mut query: Query<(&mut UiSlide, &mut Node, &mut Visibility)>,
) {
    let dt = time.delta_secs();
    for (mut slide, mut node, mut visibility) in &mut query {
        if slide.settled {
            continue;
        }
        slide.tween.advance(dt);
        let pos = slide.tween.value();
        node.left = Val::Px(pos.x);
        node.bottom = Val::Px(pos.y);

        if slide.tween.finished() {
            if slide.hide_on_finish {
                *visibility = Visibility::Hidden;
            }
            slide.settled = true;
        }
    }
}

pub fn advance_world_moves(time: Res<Time>, mut query: Query<(&mut WorldMove, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut motion, mut transform) in &mut query {
        if motion.settled {
            continue;
        }
        motion.tween.advance(dt);
        let pos = motion.tween.value();
        transform.translation.x = pos.x;
        transform.translation.y = pos.y;

        let t = motion.tween.progress();
        let angle = motion.rotation_from + (motion.rotation_to - motion.rotation_from) * t;
        transform.rotation = Quat::from_rotation_z(angle);

        if motion.tween.finished() {
            motion.settled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints_and_midpoint() {
        assert_eq!(Easing::SmoothStep.apply(0.0), 0.0);
        assert_eq!(Easing::SmoothStep.apply(1.0), 1.0);
        assert!((Easing::SmoothStep.apply(0.5) - 0.5).abs() < 1e-6);
        assert!(Easing::SmoothStep.apply(0.25) < 0.25);
    }

    #[test]
    fn test_tween_clamps_at_duration() {
        let mut tween = Tween::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.5, Easing::Linear);
        tween.advance(0.25);
        assert!(!tween.finished());
        assert!((tween.value().x - 5.0).abs() < 1e-4);

        tween.advance(10.0);
        assert!(tween.finished());
        assert_eq!(tween.value(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_zero_duration_jumps_to_end() {
        let mut tween = Tween::new(Vec2::ZERO, Vec2::ONE, 0.0, Easing::SmoothStep);
        assert_eq!(tween.value(), Vec2::ONE);
        tween.advance(0.016);
        assert!(tween.finished());
    }

    fn slide_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            std::time::Duration::from_millis(100),
        ));
        app.add_plugins(TweenPlugin);
        app
    }

    #[test]
    fn test_replacement_slide_survives_finishing_one() {
        let mut app = slide_app();
        let hide = Tween::new(Vec2::ZERO, Vec2::new(0.0, -100.0), 0.1, Easing::Linear);
        let entity = app
            .world_mut()
            .spawn((Node::default(), Visibility::Visible, UiSlide::new(hide, true)))
            .id();
        app.update();
        app.update();

        // Shown again right as the hide lands.
        let show = Tween::new(Vec2::new(0.0, -100.0), Vec2::new(0.0, 24.0), 0.3, Easing::Linear);
        app.world_mut()
            .entity_mut(entity)
            .insert((UiSlide::new(show, false), Visibility::Visible));
        for _ in 0..5 {
            app.update();
        }

        let world = app.world();
        assert_eq!(world.get::<Visibility>(entity), Some(&Visibility::Visible));
        assert_eq!(world.get::<Node>(entity).map(|n| n.bottom), Some(Val::Px(24.0)));
        assert!(world.get::<UiSlide>(entity).is_some_and(|s| s.settled()));
    }

    #[test]
    fn test_settled_move_stops_writing_transform() {
        let mut app = slide_app();
        let start = Transform::from_xyz(0.0, 0.0, 1.0);
        let entity = app
            .world_mut()
            .spawn((start, WorldMove::to(&start, Vec2::new(10.0, 0.0), 0.0, 0.1)))
            .id();
        for _ in 0..3 {
            app.update();
        }
        app.world_mut().get_mut::<Transform>(entity).unwrap().translation.x = -5.0;
        app.update();

        let world = app.world();
        assert!(world.get::<WorldMove>(entity).is_some_and(|m| m.settled()));
        assert_eq!(world.get::<Transform>(entity).unwrap().translation.x, -5.0);
    }
}
