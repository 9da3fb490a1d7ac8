use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{assets::ImageAsset, CarouselError, Result};

/// Handle the renderer uses to bind a slide's texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDescriptor {
    pub title: String,
    /// Source of the slide image, also the key into the asset store.
    pub image: String,
}

/// Declarative description of the carousel content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub name: String,
    pub slides: Vec<SlideDescriptor>,
}

impl SceneDescriptor {
    /// A scene with `count` numbered slides.
    pub fn demo(count: usize) -> Self {
        Self {
            name: "Demo Carousel".to_string(),
            slides: (0..count)
                .map(|index| SlideDescriptor {
                    title: format!("Slide {:02}", index + 1),
                    image: format!("images/slide-{:02}.jpg", index + 1),
                })
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let scene: Self = serde_json::from_str(json)?;
        if scene.slides.is_empty() {
            return Err(CarouselError::invalid_config(format!(
                "scene `{}` has no slides",
                scene.name
            )));
        }
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Builds one plane per slide. `images` must be the resolved assets in
    /// slide order.
    pub fn planes(&self, images: &[ImageAsset], segments: u32) -> Vec<PlaneDescriptor> {
        self.slides
            .iter()
            .zip(images)
            .enumerate()
            .map(|(slide, (descriptor, image))| PlaneDescriptor {
                slide,
                texture: TextureId(slide),
                source: descriptor.image.clone(),
                image_size: Vec2::new(image.natural_width as f32, image.natural_height as f32),
                segments,
                double_sided: true,
                transparent: true,
            })
            .collect()
    }
}

/// A textured, subdivided plane registered with the renderer once at startup.
/// Textures are sampled linearly without mipmaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneDescriptor {
    pub slide: usize,
    pub texture: TextureId,
    pub source: String,
    pub image_size: Vec2,
    pub segments: u32,
    pub double_sided: bool,
    pub transparent: bool,
}
