//! Time-based value transitions.
//!
//! An [`Animation`] lives in the widget state store under the owning widget's
//! id, so a fade started in one frame keeps running in the following ones
//! without the widget holding anything itself.

/// Easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Fast start, slow settle: `1 - 2^(-10t)`.
    #[default]
    ExponentialOut,
    /// Slow start, fast finish: `2^(10(t-1))`.
    ExponentialIn,
    /// Jump straight to the target.
    Instant,
}

impl Easing {
    /// Maps linear progress `t` (clamped to 0-1) through the curve.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::ExponentialOut if t >= 1.0 => 1.0,
            Self::ExponentialOut => 1.0 - 2.0_f32.powf(-10.0 * t),
            Self::ExponentialIn if t <= 0.0 => 0.0,
            Self::ExponentialIn => 2.0_f32.powf(10.0 * (t - 1.0)),
            Self::Instant => 1.0,
        }
    }
}

/// A scalar moving towards a target over a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    start: f32,
    current: f32,
    target: f32,
    /// Linear progress, 0-1.
    progress: f32,
    /// Seconds for a full transition.
    duration: f32,
    easing: Easing,
}

impl Animation {
    /// Duration used by the built-in hover fades.
    pub const HOVER_FADE: f32 = 0.10;

    /// Creates an animation resting at `value`.
    #[must_use]
    pub fn new(value: f32, duration: f32, easing: Easing) -> Self {
        Self {
            start: value,
            current: value,
            target: value,
            progress: 1.0,
            duration,
            easing,
        }
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Target the animation is moving to.
    #[must_use]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Returns true once the target is reached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Retargets, restarting from the current value if the target changed.
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() > f32::EPSILON {
            self.start = self.current;
            self.target = target;
            self.progress = 0.0;
        }
    }

    /// Jumps to `value` without transition.
    pub fn set_immediate(&mut self, value: f32) {
        *self = Self::new(value, self.duration, self.easing);
    }

    /// Advances by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.is_complete() {
            return;
        }
        self.progress = if self.duration > 0.0 {
            (self.progress + dt / self.duration).min(1.0)
        } else {
            1.0
        };
        self.current = if self.is_complete() {
            self.target
        } else {
            self.start + (self.target - self.start) * self.easing.apply(self.progress)
        };
    }

    /// Retargets, advances and returns the new value.
    pub fn tick(&mut self, target: f32, dt: f32) -> f32 {
        self.set_target(target);
        self.update(dt);
        self.current
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(0.0, Self::HOVER_FADE, Easing::ExponentialOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_out_front_loads() {
        assert!(Easing::ExponentialOut.apply(0.3) > 0.8);
        assert!(Easing::ExponentialIn.apply(0.3) < 0.05);
        assert!((Easing::Linear.apply(2.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_animation_reaches_target() {
        let mut anim = Animation::new(0.0, 0.15, Easing::ExponentialOut);
        anim.set_target(100.0);
        for _ in 0..20 {
            anim.update(0.016);
        }
        assert!((anim.value() - 100.0).abs() < 0.01);
        assert!(anim.is_complete());
    }

    #[test]
    fn test_retarget_starts_from_current() {
        let mut anim = Animation::new(0.0, 1.0, Easing::Linear);
        anim.tick(1.0, 0.5);
        assert!((anim.value() - 0.5).abs() < 1e-4);

        anim.tick(0.0, 0.5);
        assert!((anim.value() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let mut anim = Animation::new(0.0, 0.0, Easing::ExponentialOut);
        assert!((anim.tick(1.0, 0.001) - 1.0).abs() < f32::EPSILON);
    }
}
