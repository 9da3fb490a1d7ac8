use serde::{Deserialize, Serialize};

use crate::{mapping::lerp, CarouselError, Result};

/// The damped virtual scroll value shared by the input path and both visual
/// layers.
///
/// Input writes `target` only. The render loop is the only caller of
/// [`ScrollState::tick`], which advances `current`, `last` and `speed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    ease: f32,
    pub current: f32,
    pub target: f32,
    pub last: f32,
    pub speed: f32,
}

impl ScrollState {
    /// Creates a state at rest at the origin. `ease` must lie in `(0, 1]`.
    pub fn new(ease: f32) -> Result<Self> {
        if !(ease > 0.0 && ease <= 1.0) {
            return Err(CarouselError::invalid_config(format!(
                "scroll ease must lie in (0, 1], got {ease}"
            )));
        }
        Ok(Self {
            ease,
            current: 0.0,
            target: 0.0,
            last: 0.0,
            speed: 0.0,
        })
    }

    /// Moves `current` a fixed fraction of the way towards `target`, then
    /// records the per-tick delta in `speed`.
    pub fn tick(&mut self) {
        self.current = lerp(self.current, self.target, self.ease);
        self.speed = self.current - self.last;
        self.last = self.current;
    }

    /// Adds `delta` to the target position.
    pub fn nudge(&mut self, delta: f32) {
        self.target += delta;
    }

    /// Distance still to be covered by the damping.
    pub fn lag(&self) -> f32 {
        self.target - self.current
    }

    pub fn is_settled(&self, epsilon: f32) -> bool {
        self.lag().abs() <= epsilon && self.speed.abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn rejects_invalid_ease() {
        assert!(ScrollState::new(0.0).is_err());
        assert!(ScrollState::new(-0.5).is_err());
        assert!(ScrollState::new(1.01).is_err());
        assert!(ScrollState::new(f32::NAN).is_err());
        assert!(ScrollState::new(1.0).is_ok());
    }

    #[test]
    fn speed_matches_delta_of_each_tick() {
        let mut state = ScrollState::new(0.1).unwrap();
        state.target = 500.0;
        for _ in 0..20 {
            let before = state.last;
            state.tick();
            assert_eq!(state.speed, state.current - before);
            assert_eq!(state.last, state.current);
        }
    }

    #[test]
    fn first_tick_closes_ten_percent() {
        let mut state = ScrollState::new(0.1).unwrap();
        state.target = -200.0;
        state.tick();
        assert!((state.current + 20.0).abs() < 1e-4);
        assert!((state.speed + 20.0).abs() < 1e-4);
    }

    #[test]
    fn equilibrium_is_idempotent() {
        let mut state = ScrollState::new(0.1).unwrap();
        state.target = 300.0;
        state.current = 300.0;
        state.last = 300.0;
        state.tick();
        let snapshot = state.clone();
        for _ in 0..10 {
            state.tick();
            assert_eq!(state, snapshot);
        }
        assert_eq!(state.speed, 0.0);
    }

    #[test]
    fn converges_within_epsilon() {
        let mut state = ScrollState::new(0.1).unwrap();
        state.nudge(1_000.0);
        for _ in 0..400 {
            state.tick();
        }
        assert!(state.is_settled(1e-3));
    }

    proptest! {
        #[test]
        fn damping_never_overshoots_and_contracts(
            target in -100_000.0f32..100_000.0,
            ease in 0.01f32..=1.0,
            ticks in 1usize..200,
        ) {
            let mut state = ScrollState::new(ease).unwrap();
            state.target = target;
            let initial_gap = target.abs();
            let mut previous_gap = initial_gap;
            for n in 1..=ticks {
                state.tick();
                let gap = (state.target - state.current).abs();
                let ulp = target.abs() * f32::EPSILON;
                prop_assert!(gap <= previous_gap + ulp);
                prop_assert!(state.current.abs() <= target.abs() + ulp);
                let bound = initial_gap * (1.0 - ease).powi(n as i32);
                prop_assert!(gap <= bound + initial_gap * 1e-4 + 1e-3);
                previous_gap = gap;
            }
        }
    }
}
