//! External asset resolution
//!
//! Images and sounds are referenced by string in the configuration. A
//! resolver turns a reference into pixels (or a playable source); failures
//! are reported as `AssetLoad` and the caller decides how to recover.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use image::RgbaImage;

use crate::audio::CueSource;
use crate::error::{SimError, SimResult};

pub trait AssetResolver: Send + Sync {
    /// Decode an image reference
    fn resolve_image(&self, reference: &str) -> SimResult<RgbaImage>;

    /// Check a sound reference, returning the form the encoder should receive
    fn resolve_sound(&self, reference: &str) -> SimResult<String>;
}

/// Resolves references as paths relative to a root directory
#[derive(Debug, Clone)]
pub struct FsAssetResolver {
    root: PathBuf,
}

impl FsAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }
}

impl AssetResolver for FsAssetResolver {
    fn resolve_image(&self, reference: &str) -> SimResult<RgbaImage> {
        let img = image::open(self.path(reference)).map_err(|e| SimError::AssetLoad {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;
        Ok(img.to_rgba8())
    }

    fn resolve_sound(&self, reference: &str) -> SimResult<String> {
        let path = self.path(reference);
        if path.is_file() {
            Ok(path.to_string_lossy().into_owned())
        } else {
            Err(SimError::AssetLoad {
                reference: reference.to_string(),
                reason: format!("{} is not a file", path.display()),
            })
        }
    }
}

/// Assets registered up front, for embedding callers and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetResolver {
    images: HashMap<String, RgbaImage>,
    sounds: HashSet<String>,
}

impl MemoryAssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, reference: impl Into<String>, image: RgbaImage) -> Self {
        self.images.insert(reference.into(), image);
        self
    }

    pub fn with_sound(mut self, reference: impl Into<String>) -> Self {
        self.sounds.insert(reference.into());
        self
    }
}

impl AssetResolver for MemoryAssetResolver {
    fn resolve_image(&self, reference: &str) -> SimResult<RgbaImage> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| SimError::AssetLoad {
                reference: reference.to_string(),
                reason: "not registered".to_string(),
            })
    }

    fn resolve_sound(&self, reference: &str) -> SimResult<String> {
        if self.sounds.contains(reference) {
            Ok(reference.to_string())
        } else {
            Err(SimError::AssetLoad {
                reference: reference.to_string(),
                reason: "not registered".to_string(),
            })
        }
    }
}

/// Resolve an optional sound reference, degrading to silence on failure
pub fn cue_source(resolver: &dyn AssetResolver, reference: Option<&str>) -> CueSource {
    let Some(reference) = reference else {
        return CueSource::Silent;
    };
    match resolver.resolve_sound(reference) {
        Ok(source) => CueSource::Asset(source),
        Err(e) => {
            log::warn!("sound unavailable, cues will be silent: {e}");
            CueSource::Silent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_resolver() {
        let resolver = MemoryAssetResolver::new()
            .with_image("ball.png", RgbaImage::new(3, 3))
            .with_sound("hit.wav");
        assert_eq!(resolver.resolve_image("ball.png").unwrap().width(), 3);
        assert!(matches!(
            resolver.resolve_image("nope.png"),
            Err(SimError::AssetLoad { .. })
        ));
        assert_eq!(
            cue_source(&resolver, Some("hit.wav")),
            CueSource::Asset("hit.wav".into())
        );
    }

    #[test]
    fn test_missing_sound_is_silent() {
        let resolver = MemoryAssetResolver::new();
        assert_eq!(cue_source(&resolver, Some("gone.wav")), CueSource::Silent);
        assert_eq!(cue_source(&resolver, None), CueSource::Silent);
    }

    #[test]
    fn test_fs_resolver_missing_file() {
        let resolver = FsAssetResolver::new("/nonexistent-asset-root");
        let err = resolver.resolve_image("ball.png").unwrap_err();
        assert!(matches!(err, SimError::AssetLoad { ref reference, .. } if reference == "ball.png"));
        assert!(resolver.resolve_sound("hit.wav").is_err());
    }
}
