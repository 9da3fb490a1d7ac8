use std::{f32::consts::TAU, time::Duration};

use serde::{Deserialize, Serialize};

/// Monotonic session clock advanced by the frame source.
///
/// Time never moves backwards; a stale timestamp leaves the clock unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameClock {
    now: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.now = Duration::ZERO;
    }

    pub fn advance(&mut self, delta: Duration) {
        self.now += delta;
    }

    pub fn advance_to(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.now.as_secs_f32()
    }
}

/// Cancel-and-reschedule timer: fires once after a quiet period with no
/// further calls to [`Debouncer::schedule`].
#[derive(Debug, Clone, PartialEq)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Arms the timer, replacing any pending deadline.
    pub fn schedule(&mut self, now: Duration) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Easing curves available to tweens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ease {
    Linear,
    /// Quadratic deceleration.
    Power1Out,
    /// Exponentially decaying sine that overshoots and settles.
    ElasticOut { amplitude: f32, period: f32 },
}

impl Ease {
    /// Maps normalised progress in `[0, 1]` to eased progress. The elastic
    /// curve leaves `[0, 1]` in between but starts at 0 and ends at 1.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::ElasticOut { amplitude, period } => {
                if t >= 1.0 {
                    return 1.0;
                }
                let amplitude_scale = amplitude.max(1.0);
                let period = period / amplitude.min(1.0);
                let phase = period / TAU * (1.0 / amplitude_scale).asin();
                let frequency = TAU / period;
                amplitude_scale * 2f32.powf(-10.0 * t) * ((t - phase) * frequency).sin() + 1.0
            }
        }
    }
}

/// A single scalar transition between two values over a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    started_at: Duration,
    duration: Duration,
    ease: Ease,
}

impl Tween {
    pub fn new(from: f32, to: f32, started_at: Duration, duration: Duration, ease: Ease) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
            ease,
        }
    }

    pub fn destination(&self) -> f32 {
        self.to
    }

    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn value_at(&self, now: Duration) -> f32 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.ease.apply(progress)
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut clock = FrameClock::new();
        clock.advance_to(ms(200));
        clock.advance_to(ms(100));
        assert_eq!(clock.now(), ms(200));
        clock.advance(ms(50));
        assert!((clock.elapsed_seconds() - 0.25).abs() < 1e-6);
        clock.reset();
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn debouncer_fires_once_after_quiet_period() {
        let mut debounce = Debouncer::new(ms(100));
        debounce.schedule(ms(0));
        assert!(!debounce.poll(ms(99)));
        assert!(debounce.poll(ms(100)));
        assert!(!debounce.poll(ms(500)));
    }

    #[test]
    fn rescheduling_pushes_the_deadline() {
        let mut debounce = Debouncer::new(ms(100));
        debounce.schedule(ms(0));
        debounce.schedule(ms(80));
        assert!(!debounce.poll(ms(120)));
        assert!(debounce.poll(ms(180)));
    }

    #[test]
    fn cancelled_debouncer_stays_silent() {
        let mut debounce = Debouncer::new(ms(100));
        debounce.schedule(ms(0));
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert!(!debounce.poll(ms(1_000)));
    }

    #[test]
    fn elastic_out_starts_and_ends_on_target() {
        let ease = Ease::ElasticOut {
            amplitude: 1.0,
            period: 1.0,
        };
        assert!(ease.apply(0.0).abs() < 1e-6);
        assert_eq!(ease.apply(1.0), 1.0);
        // overshoots before settling
        let peak = (1..100)
            .map(|step| ease.apply(step as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn power1_out_decelerates() {
        let ease = Ease::Power1Out;
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(0.5), 0.75);
        assert_eq!(ease.apply(1.0), 1.0);
    }

    #[test]
    fn tween_lands_exactly_on_destination() {
        let tween = Tween::new(237.0, 200.0, ms(100), ms(500), Ease::Linear);
        assert_eq!(tween.value_at(ms(0)), 237.0);
        assert!((tween.value_at(ms(350)) - 218.5).abs() < 1e-3);
        assert_eq!(tween.value_at(ms(600)), tween.destination());
        assert_eq!(tween.destination(), 200.0);
        assert!(tween.is_finished(ms(600)));
        assert!(!tween.is_finished(ms(599)));
    }

    #[test]
    fn ease_config_round_trips_through_json() {
        let ease: Ease =
            serde_json::from_str(r#"{ "kind": "elastic_out", "amplitude": 1.0, "period": 0.5 }"#)
                .unwrap();
        assert_eq!(
            ease,
            Ease::ElasticOut {
                amplitude: 1.0,
                period: 0.5
            }
        );
    }
}
