//! The top-level carousel object: owns the scroll state, both visual layers
//! and the collaborators they draw on.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    assets::AssetStore,
    config::CarouselConfig,
    dom::{self, DocumentSurface, DomLayer},
    input::{InputController, InputEvent},
    mesh::MeshLayer,
    render::{Camera, FrameSnapshot, Renderer},
    scene::SceneDescriptor,
    scroll::ScrollState,
    timeline::FrameClock,
    wrap::WrapBand,
    CarouselError, Result,
};

/// Host events delivered between frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Input { event: InputEvent },
    Hover { slide: usize, entered: bool },
}

impl From<InputEvent> for SessionEvent {
    fn from(event: InputEvent) -> Self {
        SessionEvent::Input { event }
    }
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: u64,
    pub current: f32,
    pub target: f32,
    pub speed: f32,
    pub active_index: usize,
    pub settled: bool,
}

/// A running carousel bound to one document and one renderer.
#[derive(Debug)]
pub struct CarouselSession<S, R> {
    config: CarouselConfig,
    surface: S,
    renderer: R,
    scroll: ScrollState,
    input: InputController,
    dom: DomLayer,
    mesh: MeshLayer,
    band: WrapBand,
    camera: Camera,
    clock: FrameClock,
    frame: u64,
    active_index: usize,
}

impl<S: DocumentSurface, R: Renderer> CarouselSession<S, R> {
    /// Builds the session once every slide image has decoded.
    ///
    /// Fails when images are still pending, when the document and scene
    /// disagree on the slide count, or when the measured pitch is degenerate.
    pub fn init(
        config: CarouselConfig,
        scene: &SceneDescriptor,
        assets: &AssetStore,
        surface: S,
        mut renderer: R,
    ) -> Result<Self> {
        config.validate()?;
        let images = assets.resolve_scene_assets(scene)?;
        if surface.slide_count() != scene.len() {
            return Err(CarouselError::invalid_config(format!(
                "document has {} slide(s) but scene `{}` describes {}",
                surface.slide_count(),
                scene.name,
                scene.len()
            )));
        }

        let band = dom::measure(&surface, config.layout.slide_padding).band(config.layout.min_pitch)?;
        let scroll = ScrollState::new(config.scroll.ease)?;

        let planes = scene.planes(&images, config.mesh.plane_segments);
        renderer.build_scene(&planes)?;
        let viewport = surface.viewport();
        let camera = Camera::for_viewport(viewport, config.mesh.perspective);
        renderer.resize(viewport, &camera);

        let mut session = Self {
            input: InputController::new(&config.input),
            dom: DomLayer::new(&config.layout, scene.len()),
            mesh: MeshLayer::new(&config.mesh, &planes),
            config,
            surface,
            renderer,
            scroll,
            band,
            camera,
            clock: FrameClock::new(),
            frame: 0,
            active_index: 0,
        };
        session
            .dom
            .update(0.0, &session.band, &mut session.surface, Duration::ZERO);

        tracing::info!(
            scene = %scene.name,
            slides = scene.len(),
            pitch = band.pitch,
            wrap_length = band.wrap_length,
            "carousel session initialised"
        );
        Ok(session)
    }

    /// Applies one host event. Handlers only touch the scroll target, the
    /// pointer sample and the hover tilt; the next frame observes the result.
    pub fn handle_event(&mut self, event: &SessionEvent, now: Duration) {
        self.clock.advance_to(now);
        let now = self.clock.now();
        match event {
            SessionEvent::Input { event } => {
                if let InputEvent::PointerMove { pointer } = event {
                    if let Some(position) = pointer.normalize() {
                        self.mesh.record_pointer(position, self.surface.viewport());
                    }
                }
                if let Some(dragging) = self.input.handle(event, now, &mut self.scroll) {
                    self.surface.set_dragging(dragging);
                }
            }
            SessionEvent::Hover { slide, entered } => self.dom.hover(*slide, *entered, now),
        }
    }

    /// Re-measures the document after a viewport change. The latest call wins.
    pub fn resize(&mut self) {
        let metrics = dom::measure(&self.surface, self.config.layout.slide_padding);
        match metrics.band_floored(self.config.layout.min_pitch) {
            Some(band) => self.band = band,
            None => tracing::warn!(?metrics, "container collapsed, keeping previous wrap band"),
        }
        let viewport = self.surface.viewport();
        self.camera = Camera::for_viewport(viewport, self.config.mesh.perspective);
        self.renderer.resize(viewport, &self.camera);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            pitch = self.band.pitch,
            "viewport resized"
        );
    }

    /// Advances the session by one frame: settle and snap, one scroll tick,
    /// document layer, mesh layer, one draw.
    ///
    /// A failed draw still consumes the frame number, since the scroll and
    /// document state have already moved on.
    pub fn frame(&mut self, now: Duration) -> Result<FrameReport> {
        self.clock.advance_to(now);
        let now = self.clock.now();
        let frame = self.frame;
        self.frame += 1;

        let settled = self.input.update(now, &mut self.scroll, self.band.pitch);
        self.scroll.tick();

        self.dom
            .update(self.scroll.current, &self.band, &mut self.surface, now);
        let elapsed = self.clock.elapsed_seconds();
        let units = self.mesh.update(&self.scroll, &self.surface, elapsed);

        let snapshot = FrameSnapshot {
            frame,
            elapsed,
            units,
        };
        self.renderer.render(&snapshot)?;

        let active_index = self
            .band
            .active_index(self.scroll.current, self.surface.slide_count());
        if active_index != self.active_index {
            tracing::debug!(from = self.active_index, to = active_index, "active slide changed");
            self.active_index = active_index;
        }

        let report = FrameReport {
            frame,
            current: self.scroll.current,
            target: self.scroll.target,
            speed: self.scroll.speed,
            active_index,
            settled: settled.is_some(),
        };
        tracing::trace!(?report, "frame");
        Ok(report)
    }

    /// Ends the session and hands the collaborators back to the host.
    pub fn teardown(self) -> (S, R) {
        tracing::info!(frames = self.frame, "carousel session torn down");
        (self.surface, self.renderer)
    }
}

impl<S, R> CarouselSession<S, R> {
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn mesh(&self) -> &MeshLayer {
        &self.mesh
    }

    pub fn band(&self) -> WrapBand {
        self.band
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for hosts that relayout the document before calling
    /// [`CarouselSession::resize`].
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }
}
