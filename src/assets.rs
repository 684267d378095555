//! Best-effort image loading.
//!
//! Each image is resolved once at startup into [`Asset::Loaded`] or
//! [`Asset::Fallback`]. Drawing code branches on that and never retries the
//! load; a missing image just means a flat background, a circle for the bird
//! and no logo.

use std::path::Path;

use image::RgbaImage;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::render::Rgb;

/// Decoded RGBA image plus a global opacity.
#[derive(Debug, Clone)]
pub struct Sprite {
    image: RgbaImage,
    opacity: u8,
}

impl Sprite {
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|source| Error::Asset {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image,
            opacity: 255,
        }
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color and effective alpha (pixel alpha × sprite opacity) at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> (Rgb, u8) {
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        let alpha = (a as u16 * self.opacity as u16 / 255) as u8;
        (Rgb(r, g, b), alpha)
    }
}

#[derive(Debug, Clone)]
pub enum Asset {
    Loaded(Sprite),
    Fallback,
}

impl Asset {
    /// Load `path`, logging and falling back on any failure.
    pub fn load_or_fallback(label: &str, path: &Path) -> Self {
        match Sprite::load(path) {
            Ok(sprite) => {
                info!(asset = label, path = %path.display(), "loaded image");
                Asset::Loaded(sprite)
            }
            Err(e) => {
                warn!(asset = label, error = %e, "image unavailable, using fallback");
                Asset::Fallback
            }
        }
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        match self {
            Asset::Loaded(sprite) => Some(sprite),
            Asset::Fallback => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Asset::Loaded(_))
    }
}

#[derive(Debug, Clone)]
pub struct AssetSet {
    pub background: Asset,
    pub bird: Asset,
    pub logo: Asset,
}

impl AssetSet {
    pub fn load(config: &Config) -> Self {
        let assets = &config.assets;
        let load = |label, name: &str| Asset::load_or_fallback(label, &config.asset_path(name));
        let logo = match load("logo", &assets.logo) {
            Asset::Loaded(sprite) => Asset::Loaded(sprite.with_opacity(assets.logo_alpha)),
            Asset::Fallback => Asset::Fallback,
        };
        Self {
            background: load("background", &assets.background),
            bird: load("bird", &assets.bird),
            logo,
        }
    }

    /// Everything drawn as primitives.
    pub fn fallback() -> Self {
        Self {
            background: Asset::Fallback,
            bird: Asset::Fallback,
            logo: Asset::Fallback,
        }
    }
}
