//! Gesture handling: wheel and drag input move the scroll target, and a
//! debounced settle check eases the target onto the nearest slide.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    config::InputConfig,
    scroll::ScrollState,
    timeline::{Debouncer, Ease, Tween},
};

/// One finger on a touch surface, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

/// Raw pointer payload as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "device", rename_all = "snake_case")]
pub enum PointerInput {
    Mouse { x: f32, y: f32 },
    Touch { touches: Vec<TouchPoint> },
}

impl PointerInput {
    /// Collapses the device-specific payload to one position. Touch input uses
    /// the first contact; a touch event without contacts has no position.
    pub fn normalize(&self) -> Option<PointerPosition> {
        match self {
            PointerInput::Mouse { x, y } => Some(PointerPosition { x: *x, y: *y }),
            PointerInput::Touch { touches } => touches
                .first()
                .map(|touch| PointerPosition {
                    x: touch.x,
                    y: touch.y,
                }),
        }
    }
}

/// Canonical pointer position in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

/// Input events consumed by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Wheel { delta_y: f32 },
    PointerDown { pointer: PointerInput },
    PointerMove { pointer: PointerInput },
    PointerUp,
}

/// Result of a settle check: where the target is being eased to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleOutcome {
    pub index: usize,
    pub snapped: f32,
    pub destination: f32,
}

/// Nearest slide boundary for `target`, keeping the sign of the target.
pub fn settle_target(target: f32, pitch: f32) -> SettleOutcome {
    let index = (target.abs() / pitch).round() as usize;
    let snapped = pitch * index as f32;
    let destination = if target < 0.0 { -snapped } else { snapped };
    SettleOutcome {
        index,
        snapped,
        destination,
    }
}

/// Converts gestures into writes to [`ScrollState::target`].
#[derive(Debug, Clone)]
pub struct InputController {
    wheel_sensitivity: f32,
    drag_sensitivity: f32,
    snap_duration: Duration,
    snap_ease: Ease,
    dragging: bool,
    touch_start: f32,
    settle: Debouncer,
    snap: Option<Tween>,
    settle_count: u64,
}

impl InputController {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            wheel_sensitivity: config.wheel_sensitivity,
            drag_sensitivity: config.drag_sensitivity,
            snap_duration: config.snap_duration(),
            snap_ease: config.snap_ease,
            dragging: false,
            touch_start: 0.0,
            settle: Debouncer::new(config.settle_quiet()),
            snap: None,
            settle_count: 0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_snapping(&self) -> bool {
        self.snap.is_some()
    }

    pub fn settle_pending(&self) -> bool {
        self.settle.is_pending()
    }

    /// Number of settle checks fired since construction.
    pub fn settle_count(&self) -> u64 {
        self.settle_count
    }

    /// Dispatches one event. Returns the new dragging state when it changed.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        now: Duration,
        scroll: &mut ScrollState,
    ) -> Option<bool> {
        match event {
            InputEvent::Wheel { delta_y } => {
                self.on_wheel(*delta_y, now, scroll);
                None
            }
            InputEvent::PointerDown { pointer } => {
                let position = pointer.normalize()?;
                self.on_pointer_down(position.y)
            }
            InputEvent::PointerMove { pointer } => {
                if let Some(position) = pointer.normalize() {
                    self.on_pointer_move(position.y, now, scroll);
                }
                None
            }
            InputEvent::PointerUp => self.on_pointer_up(now),
        }
    }

    pub fn on_wheel(&mut self, delta_y: f32, now: Duration, scroll: &mut ScrollState) {
        self.snap = None;
        scroll.nudge(-delta_y * self.wheel_sensitivity);
        self.settle.schedule(now);
    }

    pub fn on_pointer_down(&mut self, y: f32) -> Option<bool> {
        self.snap = None;
        self.touch_start = y;
        let changed = !self.dragging;
        self.dragging = true;
        changed.then_some(true)
    }

    /// Applies a drag step. Moves without a preceding pointer down are ignored.
    pub fn on_pointer_move(&mut self, y: f32, now: Duration, scroll: &mut ScrollState) -> bool {
        if !self.dragging {
            return false;
        }
        scroll.nudge((y - self.touch_start) * self.drag_sensitivity);
        self.touch_start = y;
        self.settle.schedule(now);
        true
    }

    pub fn on_pointer_up(&mut self, now: Duration) -> Option<bool> {
        let changed = self.dragging;
        self.dragging = false;
        self.settle.schedule(now);
        changed.then_some(false)
    }

    /// Runs the settle check once input has been quiet long enough and
    /// advances any running snap tween. Called once per frame before the
    /// scroll state is ticked.
    ///
    /// The check is held back while a drag is in progress; releasing the
    /// pointer re-arms it.
    pub fn update(
        &mut self,
        now: Duration,
        scroll: &mut ScrollState,
        pitch: f32,
    ) -> Option<SettleOutcome> {
        let mut fired = None;
        if !self.dragging && self.settle.poll(now) {
            let outcome = settle_target(scroll.target, pitch);
            tracing::debug!(
                target = scroll.target,
                index = outcome.index,
                destination = outcome.destination,
                "settling onto slide"
            );
            self.snap = Some(Tween::new(
                scroll.target,
                outcome.destination,
                now,
                self.snap_duration,
                self.snap_ease,
            ));
            self.settle_count += 1;
            fired = Some(outcome);
        }

        if let Some(tween) = &self.snap {
            scroll.target = tween.value_at(now);
            if tween.is_finished(now) {
                self.snap = None;
            }
        }

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn controller() -> (InputController, ScrollState) {
        (
            InputController::new(&InputConfig::default()),
            ScrollState::new(0.1).unwrap(),
        )
    }

    fn mouse(y: f32) -> PointerInput {
        PointerInput::Mouse { x: 10.0, y }
    }

    #[test]
    fn touch_without_contacts_has_no_position() {
        let empty = PointerInput::Touch { touches: vec![] };
        assert_eq!(empty.normalize(), None);

        let touch = PointerInput::Touch {
            touches: vec![TouchPoint { x: 1.0, y: 0.0 }, TouchPoint { x: 5.0, y: 9.0 }],
        };
        assert_eq!(touch.normalize(), Some(PointerPosition { x: 1.0, y: 0.0 }));
    }

    #[test]
    fn wheel_moves_target_against_delta() {
        let (mut input, mut scroll) = controller();
        input.handle(&InputEvent::Wheel { delta_y: 50.0 }, ms(0), &mut scroll);
        assert_eq!(scroll.target, -100.0);
        assert_eq!(scroll.current, 0.0);
        assert!(input.settle_pending());
    }

    #[test]
    fn settle_fires_once_after_quiet_period() {
        let (mut input, mut scroll) = controller();
        input.on_wheel(50.0, ms(0), &mut scroll);

        let mut fired = 0;
        for frame in 0..60 {
            if input.update(ms(frame * 16), &mut scroll, 300.0).is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert_eq!(input.settle_count(), 1);
    }

    #[test]
    fn continued_input_defers_the_settle() {
        let (mut input, mut scroll) = controller();
        for step in 0..10 {
            input.on_wheel(5.0, ms(step * 50), &mut scroll);
            assert!(input.update(ms(step * 50), &mut scroll, 100.0).is_none());
        }
        assert!(input.update(ms(540), &mut scroll, 100.0).is_none());
        assert!(input.update(ms(550), &mut scroll, 100.0).is_some());
    }

    #[test]
    fn snap_rounds_to_nearest_slide() {
        let outcome = settle_target(237.0, 100.0);
        assert_eq!(outcome.index, 2);
        assert_eq!(outcome.snapped, 200.0);
        assert_eq!(outcome.destination, 200.0);

        let negative = settle_target(-260.0, 100.0);
        assert_eq!(negative.index, 3);
        assert_eq!(negative.destination, -300.0);

        let origin = settle_target(0.0, 100.0);
        assert_eq!(origin.index, 0);
        assert_eq!(origin.destination, 0.0);
        assert!(origin.destination.is_sign_positive());
    }

    #[test]
    fn snap_tween_eases_target_onto_boundary() {
        let (mut input, mut scroll) = controller();
        scroll.target = 237.0;
        input.on_pointer_up(ms(0));

        let outcome = input.update(ms(100), &mut scroll, 100.0).unwrap();
        assert_eq!(outcome.destination, 200.0);
        assert!(input.is_snapping());

        input.update(ms(350), &mut scroll, 100.0);
        assert_ne!(scroll.target, 237.0);

        input.update(ms(600), &mut scroll, 100.0);
        assert_eq!(scroll.target, 200.0);
        assert!(!input.is_snapping());
    }

    #[test]
    fn drag_accumulates_scaled_deltas() {
        let (mut input, mut scroll) = controller();
        assert_eq!(
            input.handle(&InputEvent::PointerDown { pointer: mouse(100.0) }, ms(0), &mut scroll),
            Some(true)
        );
        input.handle(&InputEvent::PointerMove { pointer: mouse(110.0) }, ms(16), &mut scroll);
        input.handle(&InputEvent::PointerMove { pointer: mouse(105.0) }, ms(32), &mut scroll);
        assert_eq!(scroll.target, 20.0);
        assert_eq!(
            input.handle(&InputEvent::PointerUp, ms(48), &mut scroll),
            Some(false)
        );
        assert!(!input.is_dragging());
    }

    #[test]
    fn moves_without_drag_leave_target_alone() {
        let (mut input, mut scroll) = controller();
        assert!(!input.on_pointer_move(300.0, ms(0), &mut scroll));
        assert_eq!(scroll.target, 0.0);
        assert!(!input.settle_pending());
    }

    #[test]
    fn settle_waits_for_release() {
        let (mut input, mut scroll) = controller();
        input.on_pointer_down(0.0);
        input.on_pointer_move(30.0, ms(0), &mut scroll);
        assert!(input.update(ms(500), &mut scroll, 100.0).is_none());

        input.on_pointer_up(ms(500));
        assert!(input.update(ms(550), &mut scroll, 100.0).is_none());
        let outcome = input.update(ms(600), &mut scroll, 100.0).unwrap();
        assert_eq!(outcome.destination, 100.0);
    }

    #[test]
    fn new_gesture_cancels_running_snap() {
        let (mut input, mut scroll) = controller();
        scroll.target = 160.0;
        input.on_pointer_up(ms(0));
        input.update(ms(100), &mut scroll, 100.0);
        assert!(input.is_snapping());

        input.on_wheel(10.0, ms(120), &mut scroll);
        assert!(!input.is_snapping());
        let target = scroll.target;
        input.update(ms(130), &mut scroll, 100.0);
        assert_eq!(scroll.target, target);
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: InputEvent = serde_json::from_str(
            r#"{ "type": "pointer_down", "pointer": { "device": "touch", "touches": [ { "x": 3.0, "y": 4.0 } ] } }"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InputEvent::PointerDown {
                pointer: PointerInput::Touch {
                    touches: vec![TouchPoint { x: 3.0, y: 4.0 }]
                }
            }
        );
    }
}
