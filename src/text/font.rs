use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{PosterError, PosterResult};

/// Weight used for headlines.
pub const WEIGHT_BLACK: u16 = 900;
/// Weight used for badges and captions.
pub const WEIGHT_BOLD: u16 = 700;

/// A font request: weight, slant and pixel size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    /// CSS-style numeric weight.
    pub weight: u16,
    /// Italic face requested.
    pub italic: bool,
    /// Size in canvas pixels.
    pub size_px: f32,
}

impl FontSpec {
    /// Upright black (900) weight, the headline face.
    pub fn black(size_px: f32) -> Self {
        Self {
            weight: WEIGHT_BLACK,
            italic: false,
            size_px,
        }
    }

    /// Italic black (900) weight.
    pub fn black_italic(size_px: f32) -> Self {
        Self {
            weight: WEIGHT_BLACK,
            italic: true,
            size_px,
        }
    }

    /// Upright bold (700) weight.
    pub fn bold(size_px: f32) -> Self {
        Self {
            weight: WEIGHT_BOLD,
            italic: false,
            size_px,
        }
    }
}

/// Raw bytes of one font face plus the style it is registered for.
#[derive(Clone)]
pub struct FontFaceData {
    /// Weight this face serves.
    pub weight: u16,
    /// Whether this face serves italic requests.
    pub italic: bool,
    /// TrueType/OpenType bytes.
    pub bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FontFaceData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFaceData")
            .field("weight", &self.weight)
            .field("italic", &self.italic)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

/// The faces available to the parley-backed typesetter.
#[derive(Clone, Debug, Default)]
pub struct FontSet {
    faces: Vec<FontFaceData>,
}

impl FontSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a face from bytes already in memory.
    pub fn with_face(mut self, weight: u16, italic: bool, bytes: Vec<u8>) -> Self {
        self.faces.push(FontFaceData {
            weight,
            italic,
            bytes: Arc::new(bytes),
        });
        self
    }

    /// Add a face read from a font file.
    pub fn with_face_file(
        self,
        weight: u16,
        italic: bool,
        path: impl AsRef<Path>,
    ) -> PosterResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        Ok(self.with_face(weight, italic, bytes))
    }

    /// Registered faces in insertion order.
    pub fn faces(&self) -> &[FontFaceData] {
        &self.faces
    }

    /// Return `true` when no face is registered.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Index of the face that best serves `spec`.
    ///
    /// Slant must match when possible; among candidates the closest weight wins and ties go to
    /// the earlier face.
    pub fn best_face_index(&self, spec: &FontSpec) -> PosterResult<usize> {
        if self.faces.is_empty() {
            return Err(PosterError::config("font set has no faces"));
        }
        let same_slant = self.faces.iter().any(|f| f.italic == spec.italic);
        let best = self
            .faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !same_slant || f.italic == spec.italic)
            .min_by_key(|(_, f)| f.weight.abs_diff(spec.weight))
            .map(|(i, _)| i);
        best.ok_or_else(|| PosterError::config("font set has no usable face"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
