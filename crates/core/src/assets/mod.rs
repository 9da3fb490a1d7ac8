use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{scene::SceneDescriptor, CarouselError, Result};

/// A slide image with its intrinsic pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub src: String,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageAsset {
    pub fn decoded(src: impl Into<String>, natural_width: u32, natural_height: u32) -> Self {
        Self {
            src: src.into(),
            natural_width,
            natural_height,
        }
    }
}

#[derive(Debug, Clone)]
struct ImageEntry {
    asset: ImageAsset,
    decoded: bool,
}

/// Registry for all images referenced by the scene, tracking which ones have
/// finished decoding.
#[derive(Debug, Default)]
pub struct AssetStore {
    images: HashMap<String, ImageEntry>,
    ready_announced: bool,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an image that has not been decoded yet.
    pub fn register(&mut self, src: impl Into<String>) {
        let src = src.into();
        self.images.entry(src.clone()).or_insert_with(|| ImageEntry {
            asset: ImageAsset::decoded(src, 0, 0),
            decoded: false,
        });
    }

    /// Registers every image a scene refers to.
    pub fn register_scene(&mut self, scene: &SceneDescriptor) {
        for slide in &scene.slides {
            self.register(slide.image.as_str());
        }
    }

    pub fn mark_decoded(&mut self, src: &str, natural_width: u32, natural_height: u32) -> Result<()> {
        let entry = self
            .images
            .get_mut(src)
            .ok_or_else(|| CarouselError::UnknownAsset(src.to_string()))?;
        entry.asset.natural_width = natural_width;
        entry.asset.natural_height = natural_height;
        entry.decoded = true;
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.images.values().filter(|entry| !entry.decoded).count()
    }

    pub fn is_ready(&self) -> bool {
        !self.images.is_empty() && self.pending() == 0
    }

    /// One-shot readiness signal: `true` the first time every registered
    /// image has decoded, `false` before and after.
    pub fn poll_ready(&mut self) -> bool {
        if self.ready_announced || !self.is_ready() {
            return false;
        }
        self.ready_announced = true;
        tracing::info!(images = self.images.len(), "images loaded");
        true
    }

    /// Returns the decoded assets for every slide, in slide order.
    pub fn resolve_scene_assets(&self, scene: &SceneDescriptor) -> Result<Vec<ImageAsset>> {
        let mut resolved = Vec::with_capacity(scene.slides.len());
        let mut pending = 0;
        for slide in &scene.slides {
            let entry = self
                .images
                .get(&slide.image)
                .ok_or_else(|| CarouselError::UnknownAsset(slide.image.clone()))?;
            if entry.decoded {
                resolved.push(entry.asset.clone());
            } else {
                pending += 1;
            }
        }
        if pending > 0 {
            return Err(CarouselError::AssetsPending { pending });
        }
        Ok(resolved)
    }
}
