use bevy::prelude::*;

/// Full-screen black fade. The UI overlay mirrors `alpha` every frame.
#[derive(Resource, Debug, Clone)]
pub struct ScreenFade {
    /// Current opacity 0.0 (transparent) to 1.0 (opaque black)
    pub alpha: f32,
    pub target_alpha: f32,
    /// Alpha units per second
    pub speed: f32,
    /// Whether a fade is actively running
    pub active: bool,
}

impl Default for ScreenFade {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            target_alpha: 0.0,
            speed: 3.0,
            active: false,
        }
    }
}

impl ScreenFade {
    /// Snap to `from`, then move towards `to` over `secs`.
    pub fn start(&mut self, from: f32, to: f32, secs: f32) {
        self.alpha = from.clamp(0.0, 1.0);
        self.target_alpha = to.clamp(0.0, 1.0);
        self.speed = if secs > 0.0 {
            (self.target_alpha - self.alpha).abs() / secs
        } else {
            f32::INFINITY
        };
        self.active = true;
    }

    /// Sets the alpha directly and stops any running fade.
    pub fn hold(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.target_alpha = self.alpha;
        self.active = false;
    }

    pub fn step(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        let diff = self.target_alpha - self.alpha;
        let delta = self.speed * dt;
        if diff.abs() <= delta {
            self.alpha = self.target_alpha;
            self.active = false;
        } else {
            self.alpha += diff.signum() * delta;
        }
    }
}

pub fn advance_fade(time: Res<Time>, mut fade: ResMut<ScreenFade>) {
    if fade.active {
        fade.step(time.delta_secs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_reaches_target_and_stops() {
        let mut fade = ScreenFade::default();
        fade.start(1.0, 0.0, 0.5);
        fade.step(0.25);
        assert!((fade.alpha - 0.5).abs() < 1e-4);
        fade.step(0.5);
        assert_eq!(fade.alpha, 0.0);
        assert!(!fade.active);
    }

    #[test]
    fn test_instant_fade() {
        let mut fade = ScreenFade::default();
        fade.start(0.0, 1.0, 0.0);
        fade.step(0.001);
        assert_eq!(fade.alpha, 1.0);
    }
}
