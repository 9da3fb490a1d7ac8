//! Document-side collaborator boundary and the layer that positions slide and
//! title elements on it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    config::LayoutConfig,
    timeline::{Ease, Tween},
    wrap::{SlideMetrics, WrapBand},
};

/// Axis-aligned box in client pixels, origin at the top-left of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Visible window size and device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Addressable elements the layer displaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Slide(usize),
    Title(usize),
}

/// The document the carousel lives in. Queries are synchronous and reflect
/// the layout at call time; writes to elements that no longer exist must be
/// ignored by the implementation.
pub trait DocumentSurface {
    fn viewport(&self) -> Viewport;
    fn container_height(&self) -> f32;
    fn slide_count(&self) -> usize;
    fn title_count(&self) -> usize;
    /// Height of the first slide, `None` before it has been laid out.
    fn slide_height(&self) -> Option<f32>;
    /// Live bounds of the image inside slide `index`.
    fn image_bounds(&self, index: usize) -> Option<Rect>;
    fn set_translate_y(&mut self, element: ElementRef, y: f32);
    fn set_rotation(&mut self, slide: usize, degrees: f32);
    fn set_dragging(&mut self, dragging: bool);
}

/// Reads the slide geometry the wrap band is derived from.
pub fn measure<S: DocumentSurface + ?Sized>(surface: &S, slide_padding: f32) -> SlideMetrics {
    SlideMetrics {
        container_height: surface.container_height(),
        slide_height: surface.slide_height().unwrap_or(0.0),
        slide_padding,
        slide_count: surface.slide_count(),
    }
}

/// Applies wrapped positions to slides and titles, and animates the hover
/// tilt of individual slides.
#[derive(Debug, Clone)]
pub struct DomLayer {
    tilt_degrees: f32,
    tilt_duration: Duration,
    rotations: Vec<f32>,
    tilts: Vec<Option<Tween>>,
}

impl DomLayer {
    pub fn new(config: &LayoutConfig, slide_count: usize) -> Self {
        Self {
            tilt_degrees: config.hover_tilt_degrees,
            tilt_duration: Duration::from_millis(config.hover_tilt_ms),
            rotations: vec![0.0; slide_count],
            tilts: vec![None; slide_count],
        }
    }

    pub fn rotation(&self, slide: usize) -> Option<f32> {
        self.rotations.get(slide).copied()
    }

    /// Starts tilting a slide towards its hover or rest angle.
    pub fn hover(&mut self, slide: usize, entered: bool, now: Duration) {
        let (Some(rotation), Some(tilt)) = (self.rotations.get(slide), self.tilts.get_mut(slide))
        else {
            return;
        };
        let to = if entered { self.tilt_degrees } else { 0.0 };
        *tilt = Some(Tween::new(
            *rotation,
            to,
            now,
            self.tilt_duration,
            Ease::Power1Out,
        ));
    }

    /// Positions every slide, then every title, from the same scroll value.
    pub fn update<S: DocumentSurface + ?Sized>(
        &mut self,
        current: f32,
        band: &WrapBand,
        surface: &mut S,
        now: Duration,
    ) {
        for index in 0..surface.slide_count() {
            let y = band.project(index, current);
            surface.set_translate_y(ElementRef::Slide(index), y);
        }
        for index in 0..surface.title_count() {
            let y = band.project(index, current);
            surface.set_translate_y(ElementRef::Title(index), y);
        }

        for (slide, (tilt, rotation)) in self
            .tilts
            .iter_mut()
            .zip(self.rotations.iter_mut())
            .enumerate()
        {
            let Some(tween) = tilt.as_ref() else { continue };
            *rotation = tween.value_at(now);
            surface.set_rotation(slide, *rotation);
            if tween.is_finished(now) {
                *tilt = None;
            }
        }
    }
}

/// In-memory document with slides stacked at the top of a container and
/// displaced by the layer's translations. Used by the headless driver.
#[derive(Debug, Clone)]
pub struct SimulatedDocument {
    viewport: Viewport,
    container: Rect,
    slide_height: f32,
    image_width: f32,
    slides: Vec<SimulatedElement>,
    titles: Vec<SimulatedElement>,
    dragging: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulatedElement {
    pub translate_y: f32,
    pub rotation: f32,
    pub removed: bool,
}

impl SimulatedDocument {
    /// Lays out `slide_count` slides and titles, horizontally centred in the
    /// viewport with the container spanning its full height.
    pub fn new(viewport: Viewport, slide_count: usize, slide_height: f32, image_width: f32) -> Self {
        Self {
            viewport,
            container: Rect {
                left: 0.0,
                top: 0.0,
                width: viewport.width,
                height: viewport.height,
            },
            slide_height,
            image_width,
            slides: vec![SimulatedElement::default(); slide_count],
            titles: vec![SimulatedElement::default(); slide_count],
            dragging: false,
        }
    }

    pub fn resize(&mut self, viewport: Viewport, slide_height: f32) {
        self.viewport = viewport;
        self.container.width = viewport.width;
        self.container.height = viewport.height;
        self.slide_height = slide_height;
    }

    pub fn remove_slide(&mut self, index: usize) {
        if let Some(slide) = self.slides.get_mut(index) {
            slide.removed = true;
        }
    }

    pub fn slide(&self, index: usize) -> Option<&SimulatedElement> {
        self.slides.get(index)
    }

    pub fn title(&self, index: usize) -> Option<&SimulatedElement> {
        self.titles.get(index)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn element_mut(&mut self, element: ElementRef) -> Option<&mut SimulatedElement> {
        let slot = match element {
            ElementRef::Slide(index) => self.slides.get_mut(index),
            ElementRef::Title(index) => self.titles.get_mut(index),
        }?;
        (!slot.removed).then_some(slot)
    }
}

impl DocumentSurface for SimulatedDocument {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn container_height(&self) -> f32 {
        self.container.height
    }

    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn title_count(&self) -> usize {
        self.titles.len()
    }

    fn slide_height(&self) -> Option<f32> {
        self.slides.first().map(|_| self.slide_height)
    }

    fn image_bounds(&self, index: usize) -> Option<Rect> {
        let slide = self.slides.get(index)?;
        if slide.removed {
            return None;
        }
        Some(Rect {
            left: self.container.left + (self.container.width - self.image_width) * 0.5,
            top: self.container.top + slide.translate_y,
            width: self.image_width,
            height: self.slide_height,
        })
    }

    fn set_translate_y(&mut self, element: ElementRef, y: f32) {
        if let Some(slot) = self.element_mut(element) {
            slot.translate_y = y;
        }
    }

    fn set_rotation(&mut self, slide: usize, degrees: f32) {
        if let Some(slot) = self.element_mut(ElementRef::Slide(slide)) {
            slot.rotation = degrees;
        }
    }

    fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }
}
