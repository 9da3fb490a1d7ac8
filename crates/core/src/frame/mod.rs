//! Frame scheduling: where frame timestamps come from, and the loop that
//! drives a session with them.

use std::{
    cell::Cell,
    rc::Rc,
    thread,
    time::{Duration, Instant},
};

use crate::{
    dom::DocumentSurface,
    render::Renderer,
    session::{CarouselSession, FrameReport},
    CarouselError, Result,
};

/// Supplies the timestamp of each frame, measured from the start of the
/// session. `None` ends the loop.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Duration>;
}

/// Virtual clock that advances by a fixed interval without waiting.
#[derive(Debug, Clone)]
pub struct FixedStepFrames {
    interval: Duration,
    next: Duration,
    remaining: Option<u64>,
}

impl FixedStepFrames {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: interval,
            remaining: None,
        }
    }

    /// Stops after `frames` timestamps.
    pub fn limited(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }
}

impl FrameSource for FixedStepFrames {
    fn next_frame(&mut self) -> Option<Duration> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let now = self.next;
        self.next += self.interval;
        Some(now)
    }
}

/// Wall-clock source that sleeps until each frame deadline.
#[derive(Debug, Clone)]
pub struct PacedFrames {
    inner: FixedStepFrames,
    started: Option<Instant>,
}

impl PacedFrames {
    pub fn new(interval: Duration) -> Self {
        Self {
            inner: FixedStepFrames::new(interval),
            started: None,
        }
    }

    pub fn limited(mut self, frames: u64) -> Self {
        self.inner = self.inner.limited(frames);
        self
    }
}

impl FrameSource for PacedFrames {
    fn next_frame(&mut self) -> Option<Duration> {
        let deadline = self.inner.next_frame()?;
        let started = *self.started.get_or_insert_with(Instant::now);
        let elapsed = started.elapsed();
        if deadline > elapsed {
            thread::sleep(deadline - elapsed);
        }
        Some(started.elapsed())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
    Cancelled,
}

/// Shared control over a [`RenderLoop`]. Clones refer to the same loop, so a
/// handle can be moved into the per-frame callback.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    state: Rc<Cell<LoopState>>,
}

impl LoopHandle {
    fn new() -> Self {
        Self {
            state: Rc::new(Cell::new(LoopState::Idle)),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    /// Marks the loop as running. A cancelled loop cannot be restarted.
    pub fn start(&self) -> Result<()> {
        if self.state() == LoopState::Cancelled {
            return Err(CarouselError::LoopCancelled);
        }
        self.state.set(LoopState::Running);
        Ok(())
    }

    /// Pauses after the current frame; the loop may be started again.
    pub fn stop(&self) {
        if self.state() == LoopState::Running {
            self.state.set(LoopState::Stopped);
        }
    }

    /// Ends the loop for good.
    pub fn cancel(&self) {
        self.state.set(LoopState::Cancelled);
    }
}

/// Aggregate of the frames produced by one [`RenderLoop::run`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopSummary {
    pub frames: u64,
    pub settles: u64,
    pub last: Option<FrameReport>,
}

impl LoopSummary {
    fn record(&mut self, report: FrameReport) {
        self.frames += 1;
        if report.settled {
            self.settles += 1;
        }
        self.last = Some(report);
    }
}

/// Drives a session with timestamps from a [`FrameSource`].
#[derive(Debug)]
pub struct RenderLoop {
    handle: LoopHandle,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            handle: LoopHandle::new(),
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Runs until the source is exhausted or the handle is stopped or
    /// cancelled. `before_frame` runs ahead of every frame and is where hosts
    /// deliver queued events.
    pub fn run<S, R, F>(
        &mut self,
        session: &mut CarouselSession<S, R>,
        source: &mut dyn FrameSource,
        mut before_frame: F,
    ) -> Result<LoopSummary>
    where
        S: DocumentSurface,
        R: Renderer,
        F: FnMut(&mut CarouselSession<S, R>, Duration),
    {
        self.handle.start()?;
        let mut summary = LoopSummary::default();

        while self.handle.is_running() {
            let Some(now) = source.next_frame() else {
                self.handle.stop();
                break;
            };
            before_frame(&mut *session, now);
            if !self.handle.is_running() {
                break;
            }
            match session.frame(now) {
                Ok(report) => summary.record(report),
                Err(err) => {
                    self.handle.stop();
                    return Err(err);
                }
            }
        }

        tracing::debug!(frames = summary.frames, state = ?self.handle.state(), "render loop exited");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::AssetStore,
        config::CarouselConfig,
        dom::{SimulatedDocument, Viewport},
        input::InputEvent,
        render::RenderGraph,
        scene::SceneDescriptor,
    };

    fn session() -> CarouselSession<SimulatedDocument, RenderGraph> {
        let scene = SceneDescriptor::demo(4);
        let mut assets = AssetStore::new();
        assets.register_scene(&scene);
        for slide in &scene.slides {
            assets.mark_decoded(&slide.image, 800, 600).unwrap();
        }
        let document = SimulatedDocument::new(Viewport::new(1000.0, 700.0), 4, 300.0, 400.0);
        CarouselSession::init(
            CarouselConfig::default(),
            &scene,
            &assets,
            document,
            RenderGraph::new(),
        )
        .unwrap()
    }

    #[test]
    fn fixed_step_source_counts_frames() {
        let mut source = FixedStepFrames::new(Duration::from_millis(10)).limited(3);
        assert_eq!(source.next_frame(), Some(Duration::from_millis(10)));
        assert_eq!(source.next_frame(), Some(Duration::from_millis(20)));
        assert_eq!(source.next_frame(), Some(Duration::from_millis(30)));
        assert_eq!(source.next_frame(), None);
    }

    #[test]
    fn runs_until_source_is_exhausted() {
        let mut session = session();
        let mut render_loop = RenderLoop::new();
        let mut source = FixedStepFrames::new(Duration::from_millis(16)).limited(100);

        let summary = render_loop
            .run(&mut session, &mut source, |session, now| {
                if now == Duration::from_millis(16) {
                    session.handle_event(&InputEvent::Wheel { delta_y: 40.0 }.into(), now);
                }
            })
            .unwrap();

        assert_eq!(summary.frames, 100);
        assert_eq!(summary.settles, 1);
        assert_eq!(session.renderer().frames_rendered(), 100);
        assert_eq!(render_loop.handle().state(), LoopState::Stopped);
    }

    #[test]
    fn stop_pauses_and_start_resumes() {
        let mut session = session();
        let mut render_loop = RenderLoop::new();
        let handle = render_loop.handle();
        let mut source = FixedStepFrames::new(Duration::from_millis(16));

        let mut seen = 0;
        let summary = render_loop
            .run(&mut session, &mut source, |_, _| {
                seen += 1;
                if seen == 11 {
                    handle.stop();
                }
            })
            .unwrap();
        assert_eq!(summary.frames, 10);

        let handle = render_loop.handle();
        let summary = render_loop
            .run(&mut session, &mut source, |_, _| handle.stop())
            .unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(session.frames_rendered(), 10);
    }

    #[test]
    fn cancelled_loop_refuses_to_run() {
        let mut session = session();
        let mut render_loop = RenderLoop::new();
        render_loop.handle().cancel();

        let mut source = FixedStepFrames::new(Duration::from_millis(16)).limited(5);
        let err = render_loop
            .run(&mut session, &mut source, |_, _| {})
            .unwrap_err();
        assert!(matches!(err, CarouselError::LoopCancelled));
        assert_eq!(session.frames_rendered(), 0);
    }

    #[test]
    fn paced_source_waits_for_deadlines() {
        let mut source = PacedFrames::new(Duration::from_millis(5)).limited(2);
        let first = source.next_frame().unwrap();
        let second = source.next_frame().unwrap();
        assert!(first >= Duration::from_millis(5));
        assert!(second >= Duration::from_millis(10));
        assert_eq!(source.next_frame(), None);
    }
}
