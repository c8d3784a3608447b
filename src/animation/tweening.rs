use super::interpolation::{EasingFunction, Interpolatable};
use instant::{Duration, Instant};

/// A tween between two values, driven by an external clock.
///
/// The host's animation-frame callback passes the frame time to
/// [`Tween::value_at`]; the tween itself never reads the wall clock, so a
/// replacement tween always starts from a fresh interpolation.
#[derive(Debug, Clone)]
pub struct Tween<T: Interpolatable + Clone> {
    /// Starting value
    pub from: T,
    /// Ending value
    pub to: T,
    /// Animation duration
    pub duration: Duration,
    /// Easing function to use
    pub easing: EasingFunction,
    /// When the animation started
    start_time: Instant,
}

impl<T: Interpolatable + Clone> Tween<T> {
    /// Create a tween starting at `start_time`
    pub fn new(from: T, to: T, duration: Duration, easing: EasingFunction, start_time: Instant) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            start_time,
        }
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Raw progress (0.0 to 1.0) at `now`
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start_time);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Eased value at `now`
    pub fn value_at(&self, now: Instant) -> T {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to.clone();
        }
        self.from.lerp(&self.to, self.easing.apply(progress))
    }

    /// Check if the animation is finished at `now`
    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_progress() {
        let start = Instant::now();
        let tween = Tween::new(0.0, 100.0, Duration::from_millis(1000), EasingFunction::Linear, start);

        assert_eq!(tween.progress(start), 0.0);
        assert!((tween.progress(start + Duration::from_millis(250)) - 0.25).abs() < 1e-9);
        assert!((tween.value_at(start + Duration::from_millis(500)) - 50.0).abs() < 1e-9);
        assert!(!tween.is_finished(start + Duration::from_millis(999)));
        assert!(tween.is_finished(start + Duration::from_millis(1000)));
    }

    #[test]
    fn test_tween_lands_exactly_on_target() {
        let start = Instant::now();
        let tween = Tween::new(3.0, -7.5, Duration::from_millis(10), EasingFunction::EaseOutCubic, start);
        assert_eq!(tween.value_at(start + Duration::from_secs(5)), -7.5);
    }

    #[test]
    fn test_tween_eased_value() {
        let start = Instant::now();
        let tween = Tween::new(0.0, 8.0, Duration::from_millis(1000), EasingFunction::EaseOutCubic, start);
        // ease-out cubic at t = 0.5 is 0.875
        assert!((tween.value_at(start + Duration::from_millis(500)) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_is_immediately_finished() {
        let start = Instant::now();
        let tween = Tween::new(1.0, 2.0, Duration::ZERO, EasingFunction::Linear, start);
        assert!(tween.is_finished(start));
        assert_eq!(tween.value_at(start), 2.0);
    }
}
