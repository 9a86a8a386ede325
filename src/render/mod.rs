//! Software rendering
//!
//! Uses SDF (Signed Distance Fields) coverage for every shape, drawn into a
//! CPU raster the headless job hands straight to its sink.

pub mod assets;
pub mod frame;
pub mod scene_renderer;

pub use assets::{AssetResolver, FsAssetResolver, MemoryAssetResolver, cue_source};
pub use frame::Frame;
pub use scene_renderer::SceneRenderer;
