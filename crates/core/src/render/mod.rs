use serde::{Deserialize, Serialize};

use crate::{dom::Viewport, mesh::UnitSnapshot, scene::PlaneDescriptor, CarouselError, Result};

/// Perspective camera placed so that one world unit equals one CSS pixel on
/// the `z = 0` plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl Camera {
    pub fn for_viewport(viewport: Viewport, perspective: f32) -> Self {
        let fov = 2.0 * (viewport.height * 0.5 / perspective).atan();
        Self {
            fov_degrees: fov.to_degrees(),
            aspect: viewport.aspect_ratio(),
            near: 1.0,
            far: perspective,
            distance: perspective,
        }
    }
}

/// Everything drawn in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub elapsed: f32,
    pub units: Vec<UnitSnapshot>,
}

/// Rendering backend abstraction. Implementations own the scene graph,
/// shaders and drawing surface.
pub trait Renderer {
    /// Registers the planes once, before the first frame.
    fn build_scene(&mut self, planes: &[PlaneDescriptor]) -> Result<()>;
    /// Updates projection, drawing buffer size and pixel ratio.
    fn resize(&mut self, viewport: Viewport, camera: &Camera);
    /// Draws the whole scene once.
    fn render(&mut self, frame: &FrameSnapshot) -> Result<()>;
}

/// Headless renderer that keeps the registered planes and the most recent
/// frame. Backs the command line driver and the tests.
#[derive(Debug, Default)]
pub struct RenderGraph {
    planes: Vec<PlaneDescriptor>,
    camera: Option<Camera>,
    drawing_buffer: (u32, u32),
    last_frame: Option<FrameSnapshot>,
    frames_rendered: u64,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planes(&self) -> &[PlaneDescriptor] {
        &self.planes
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Physical size of the drawing buffer after pixel ratio scaling.
    pub fn drawing_buffer(&self) -> (u32, u32) {
        self.drawing_buffer
    }

    pub fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.last_frame.as_ref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl Renderer for RenderGraph {
    fn build_scene(&mut self, planes: &[PlaneDescriptor]) -> Result<()> {
        if planes.is_empty() {
            return Err(CarouselError::Render("scene has no planes".to_string()));
        }
        self.planes = planes.to_vec();
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport, camera: &Camera) {
        self.camera = Some(*camera);
        self.drawing_buffer = (
            (viewport.width * viewport.pixel_ratio).round().max(0.0) as u32,
            (viewport.height * viewport.pixel_ratio).round().max(0.0) as u32,
        );
    }

    fn render(&mut self, frame: &FrameSnapshot) -> Result<()> {
        if frame.units.len() != self.planes.len() {
            return Err(CarouselError::Render(format!(
                "frame carries {} unit(s) for {} plane(s)",
                frame.units.len(),
                self.planes.len()
            )));
        }
        tracing::trace!(frame = frame.frame, units = frame.units.len(), "draw");
        self.last_frame = Some(frame.clone());
        self.frames_rendered += 1;
        Ok(())
    }
}
