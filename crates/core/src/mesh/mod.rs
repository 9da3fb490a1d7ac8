//! Per-slide image planes whose transforms follow the live document layout
//! and whose shader inputs are derived from scroll momentum and pointer
//! motion.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    config::MeshConfig,
    dom::{DocumentSurface, Rect, Viewport},
    input::PointerPosition,
    mapping::RangeMapping,
    scene::{PlaneDescriptor, TextureId},
    scroll::ScrollState,
};

/// Damped pointer state in normalised screen space (`y` grows upwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerSample {
    pub current: Vec2,
    pub follow: Vec2,
    pub prev: Vec2,
    pub speed: f32,
    pub target_speed: f32,
}

impl PointerSample {
    /// Records a raw pointer position given in client pixels.
    pub fn record(&mut self, position: PointerPosition, viewport: Viewport) {
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return;
        }
        self.current = Vec2::new(
            position.x / viewport.width,
            1.0 - position.y / viewport.height,
        );
    }

    /// One damping step: measures the distance moved since the previous
    /// step and eases `target_speed` and `follow` towards the raw values.
    pub fn damp(&mut self, factor: f32) {
        self.speed = self.prev.distance(self.current);
        self.target_speed -= factor * (self.target_speed - self.speed);
        self.follow -= factor * (self.follow - self.current);
        self.prev = self.current;
    }

    pub fn velocity(&self, cap: f32) -> f32 {
        self.target_speed.min(cap)
    }

    /// Lets hover ripples fade out when the pointer stops producing events.
    pub fn decay(&mut self, factor: f32) {
        self.target_speed *= factor;
    }
}

/// World transform of one plane: centred viewport pixels, scale in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaneTransform {
    pub position: Vec3,
    pub scale: Vec2,
}

impl PlaneTransform {
    /// Converts a client-space box into a transform centred on the viewport.
    pub fn from_rect(rect: Rect, viewport: Viewport) -> Self {
        let x = rect.left - viewport.width * 0.5 + rect.width * 0.5;
        let y = -rect.top + viewport.height * 0.5 - rect.height * 0.5;
        Self {
            position: Vec3::new(x, y, 0.0),
            scale: Vec2::new(rect.width, rect.height),
        }
    }
}

/// Immutable uniform set handed to the renderer for one plane and frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneUniforms {
    pub texture: TextureId,
    pub offset: Vec2,
    pub alpha: f32,
    pub time: f32,
    pub plane_size: Vec2,
    pub image_size: Vec2,
    pub viewport_size: Vec2,
    pub zoom: f32,
    pub parallax: f32,
    pub strength: f32,
    pub pointer: Vec2,
    pub pointer_velocity: f32,
    pub pointer_aspect: Vec2,
}

/// Everything the renderer needs to draw one plane this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub slide: usize,
    pub transform: PlaneTransform,
    pub uniforms: PlaneUniforms,
}

/// Per-frame values shared by every unit.
#[derive(Debug, Clone, Copy)]
struct FrameInputs {
    current: f32,
    velocity: f32,
    elapsed: f32,
    viewport: Viewport,
    pointer: Vec2,
    pointer_velocity: f32,
}

/// One plane bound to the image of one slide.
#[derive(Debug, Clone)]
pub struct VisualUnit {
    slide: usize,
    texture: TextureId,
    image_size: Vec2,
    transform: PlaneTransform,
}

impl VisualUnit {
    pub fn new(plane: &PlaneDescriptor) -> Self {
        Self {
            slide: plane.slide,
            texture: plane.texture,
            image_size: plane.image_size,
            transform: PlaneTransform::default(),
        }
    }

    fn update<S: DocumentSurface + ?Sized>(
        &mut self,
        inputs: &FrameInputs,
        parallax: &RangeMapping,
        zoom: f32,
        parallax_scroll_divisor: f32,
        surface: &S,
    ) -> UnitSnapshot {
        // Without geometry the plane keeps its last known transform.
        if let Some(rect) = surface.image_bounds(self.slide) {
            self.transform = PlaneTransform::from_rect(rect, inputs.viewport);
        }

        let height = inputs.viewport.height.max(1.0);
        let position_in_viewport =
            (self.transform.position.y - inputs.current / parallax_scroll_divisor) / height;

        let viewport_size = Vec2::new(inputs.viewport.width, inputs.viewport.height);
        let pointer_aspect = if inputs.viewport.width > 0.0 {
            Vec2::new(1.0, inputs.viewport.height / inputs.viewport.width)
        } else {
            Vec2::ONE
        };

        UnitSnapshot {
            slide: self.slide,
            transform: self.transform,
            uniforms: PlaneUniforms {
                texture: self.texture,
                offset: Vec2::new(0.0, -inputs.velocity),
                alpha: 1.0,
                time: inputs.elapsed,
                plane_size: self.transform.scale,
                image_size: self.image_size,
                viewport_size,
                zoom,
                parallax: parallax.apply(position_in_viewport),
                strength: inputs.velocity.abs(),
                pointer: inputs.pointer,
                pointer_velocity: inputs.pointer_velocity,
                pointer_aspect,
            },
        }
    }
}

/// Owns every visual unit and the shared pointer sample.
#[derive(Debug, Clone)]
pub struct MeshLayer {
    units: Vec<VisualUnit>,
    pointer: PointerSample,
    parallax: RangeMapping,
    velocity_scale: f32,
    parallax_scroll_divisor: f32,
    pointer_damping: f32,
    pointer_decay: f32,
    pointer_velocity_cap: f32,
    zoom: f32,
}

impl MeshLayer {
    pub fn new(config: &MeshConfig, planes: &[PlaneDescriptor]) -> Self {
        Self {
            units: planes.iter().map(VisualUnit::new).collect(),
            pointer: PointerSample::default(),
            parallax: RangeMapping::new(config.parallax_domain, config.parallax_range),
            velocity_scale: config.velocity_scale,
            parallax_scroll_divisor: if config.parallax_scroll_divisor != 0.0 {
                config.parallax_scroll_divisor
            } else {
                1.0
            },
            pointer_damping: config.pointer_damping,
            pointer_decay: config.pointer_decay,
            pointer_velocity_cap: config.pointer_velocity_cap,
            zoom: config.zoom,
        }
    }

    pub fn pointer(&self) -> &PointerSample {
        &self.pointer
    }

    pub fn record_pointer(&mut self, position: PointerPosition, viewport: Viewport) {
        self.pointer.record(position, viewport);
    }

    /// Re-derives every unit from the already ticked scroll state and the
    /// current layout. The pointer sample is damped once per frame.
    pub fn update<S: DocumentSurface + ?Sized>(
        &mut self,
        scroll: &ScrollState,
        surface: &S,
        elapsed: f32,
    ) -> Vec<UnitSnapshot> {
        self.pointer.damp(self.pointer_damping);
        let inputs = FrameInputs {
            current: scroll.current,
            velocity: (scroll.target - scroll.current) * self.velocity_scale,
            elapsed,
            viewport: surface.viewport(),
            pointer: self.pointer.follow,
            pointer_velocity: self.pointer.velocity(self.pointer_velocity_cap),
        };
        self.pointer.decay(self.pointer_decay);

        let (parallax, zoom, divisor) = (self.parallax, self.zoom, self.parallax_scroll_divisor);
        self.units
            .iter_mut()
            .map(|unit| unit.update(&inputs, &parallax, zoom, divisor, surface))
            .collect()
    }
}
