use std::{collections::VecDeque, path::Path, time::Duration};

use carousel_core::{InputEvent, PointerInput, Result, SessionEvent};
use serde::Deserialize;

/// One timed step of a replayed input script.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    Event {
        event: SessionEvent,
    },
    /// Relayouts the simulated document, then re-measures the session.
    Resize {
        width: f32,
        height: f32,
        slide_height: f32,
        #[serde(default = "default_pixel_ratio")]
        pixel_ratio: f32,
    },
}

fn default_pixel_ratio() -> f32 {
    1.0
}

/// Timed actions replayed against a headless session, in timestamp order.
#[derive(Debug, Default)]
pub struct InputScript {
    steps: VecDeque<ScriptStep>,
}

impl InputScript {
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|step| step.at_ms);
        Self {
            steps: steps.into(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let steps: Vec<ScriptStep> = serde_json::from_str(&raw)?;
        Ok(Self::new(steps))
    }

    /// A wheel flick, a short drag and a hover, spread over two seconds.
    pub fn demo() -> Self {
        let event = |at_ms, event: SessionEvent| ScriptStep {
            at_ms,
            action: ScriptAction::Event { event },
        };
        let mouse = |y| PointerInput::Mouse { x: 720.0, y };

        let mut steps = vec![
            event(100, InputEvent::Wheel { delta_y: 120.0 }.into()),
            event(140, InputEvent::Wheel { delta_y: 80.0 }.into()),
            event(900, InputEvent::PointerDown { pointer: mouse(500.0) }.into()),
        ];
        for (offset, y) in [460.0, 420.0, 390.0, 370.0].into_iter().enumerate() {
            steps.push(event(
                916 + offset as u64 * 16,
                InputEvent::PointerMove { pointer: mouse(y) }.into(),
            ));
        }
        steps.push(event(980, InputEvent::PointerUp.into()));
        steps.push(event(
            1_500,
            SessionEvent::Hover {
                slide: 0,
                entered: true,
            },
        ));
        steps.push(event(
            2_000,
            SessionEvent::Hover {
                slide: 0,
                entered: false,
            },
        ));
        Self::new(steps)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Removes and returns every step due at or before `now`.
    pub fn drain_due(&mut self, now: Duration) -> Vec<ScriptStep> {
        let now_ms = now.as_millis();
        let mut due = Vec::new();
        while self
            .steps
            .front()
            .is_some_and(|step| u128::from(step.at_ms) <= now_ms)
        {
            if let Some(step) = self.steps.pop_front() {
                due.push(step);
            }
        }
        due
    }
}
