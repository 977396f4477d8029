use ab_glyph::FontArc;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{FontConfig, WatermarkError};

static BUILTIN_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static BUILTIN_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Result of looking up a font: either a configured file or the embedded face.
#[derive(Clone)]
pub enum FontHandle {
    Loaded { font: FontArc, path: PathBuf },
    DefaultFallback { font: FontArc },
}

impl FontHandle {
    pub fn font(&self) -> &FontArc {
        match self {
            FontHandle::Loaded { font, .. } => font,
            FontHandle::DefaultFallback { font } => font,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FontHandle::DefaultFallback { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            FontHandle::Loaded { path, .. } => path.display().to_string(),
            FontHandle::DefaultFallback { .. } => "built-in DejaVu Sans".to_string(),
        }
    }
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FontHandle").field(&self.describe()).finish()
    }
}

fn load_font_file(path: &Path) -> Option<FontArc> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!("Font {:?} not readable: {}", path, e);
            return None;
        }
    };

    match FontArc::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(_) => {
            warn!("Font file {:?} could not be parsed, ignoring it", path);
            None
        }
    }
}

/// Try each candidate in order, falling back to the embedded face.
pub fn lookup_font(
    candidates: &[PathBuf],
    builtin: &'static [u8],
) -> Result<FontHandle, WatermarkError> {
    for path in candidates {
        if let Some(font) = load_font_file(path) {
            debug!("Using font {:?}", path);
            return Ok(FontHandle::Loaded {
                font,
                path: path.clone(),
            });
        }
    }

    if !candidates.is_empty() {
        warn!(
            "None of the configured fonts could be loaded ({}), using built-in font",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let font = FontArc::try_from_slice(builtin)
        .map_err(|e| WatermarkError::FontUnavailable(e.to_string()))?;
    Ok(FontHandle::DefaultFallback { font })
}

/// The faces used to draw the band.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub title: FontHandle,
    pub body: FontHandle,
}

impl FontSet {
    pub fn load(config: &FontConfig) -> Result<Self, WatermarkError> {
        Ok(Self {
            title: lookup_font(&config.title, BUILTIN_BOLD)?,
            body: lookup_font(&config.body, BUILTIN_REGULAR)?,
        })
    }

    /// Only the embedded faces, ignoring any configuration.
    pub fn builtin() -> Result<Self, WatermarkError> {
        Self::load(&FontConfig {
            title: Vec::new(),
            body: Vec::new(),
        })
    }
}
