//! Core library for the infinite carousel.
//!
//! A single damped scroll value drives two independently rendered layers: a
//! document layer that displaces slide and title elements, and a mesh layer
//! that feeds per-slide image planes to a renderer. Both layers fold slide
//! positions through the same wrap projection so they never disagree, and the
//! render loop advances the scroll state exactly once per frame before either
//! of them reads it.

pub mod assets;
pub mod config;
pub mod dom;
pub mod error;
pub mod frame;
pub mod input;
pub mod mapping;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod scroll;
pub mod session;
pub mod timeline;
pub mod wrap;

pub use assets::{AssetStore, ImageAsset};
pub use config::{CarouselConfig, FrameConfig, InputConfig, LayoutConfig, MeshConfig, ScrollConfig};
pub use dom::{DocumentSurface, DomLayer, ElementRef, Rect, SimulatedDocument, Viewport};
pub use error::{CarouselError, Result};
pub use frame::{FixedStepFrames, FrameSource, LoopHandle, LoopState, LoopSummary, PacedFrames, RenderLoop};
pub use input::{InputController, InputEvent, PointerInput, PointerPosition, SettleOutcome, TouchPoint};
pub use mesh::{MeshLayer, PlaneTransform, PlaneUniforms, PointerSample, UnitSnapshot, VisualUnit};
pub use render::{Camera, FrameSnapshot, RenderGraph, Renderer};
pub use scene::{PlaneDescriptor, SceneDescriptor, SlideDescriptor, TextureId};
pub use scroll::ScrollState;
pub use session::{CarouselSession, FrameReport, SessionEvent};
pub use timeline::{Debouncer, Ease, FrameClock, Tween};
pub use wrap::{project, SlideMetrics, WrapBand};
