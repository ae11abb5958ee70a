//! Engine configuration, template preferences and the date source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assets::{STANDARD_MARK_URI, WHITE_MARK_URI};
use crate::encode::jpeg::OutputFormat;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::templates::{Palette, TemplateId};
use crate::text::font::{FontSet, WEIGHT_BLACK, WEIGHT_BOLD};

/// Preference key holding the user's default template.
pub const TEMPLATE_PREFERENCE_KEY: &str = "kt-post-template";

/// Engine-wide settings, usually loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Brand marks, caption city and colors.
    pub brand: BrandConfig,

    /// Font files for the parley typesetter.
    pub fonts: FontConfig,

    /// Output container and quality.
    pub output: OutputFormat,

    /// Template used when a render does not name one.
    pub default_template: TemplateId,
}

/// Brand furniture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandConfig {
    /// Image source of the standard mark.
    pub standard_mark: String,

    /// Image source of the white mark used by modern-center.
    pub white_mark: String,

    /// City printed in the modern-center caption.
    pub city: String,

    /// Category badge fill, `#rrggbb`.
    pub badge_color: String,

    /// minimal-top accent bar fill, `#rrggbb`.
    pub accent_color: String,
}

/// Font files; any subset may be given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Upright weight-900 face for headlines.
    pub black: Option<PathBuf>,

    /// Italic weight-900 face for minimal-top headlines.
    pub black_italic: Option<PathBuf>,

    /// Weight-700 face for badges and captions.
    pub bold: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            brand: BrandConfig::default(),
            fonts: FontConfig::default(),
            output: OutputFormat::default(),
            default_template: TemplateId::Classic,
        }
    }
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            standard_mark: STANDARD_MARK_URI.to_string(),
            white_mark: WHITE_MARK_URI.to_string(),
            city: "DUBAI".to_string(),
            badge_color: "#0070c0".to_string(),
            accent_color: "#e1b250".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file.
    ///
    /// Relative font paths and bare-path mark sources resolve against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let mut config = Self::from_json_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        tracing::debug!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Parse and validate JSON config text.
    pub fn from_json_str(content: &str) -> PosterResult<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| PosterError::config(format!("invalid engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check colors and output quality.
    pub fn validate(&self) -> PosterResult<()> {
        self.palette()?;
        if let OutputFormat::Jpeg { quality } = self.output {
            if !(quality > 0.0 && quality <= 1.0) {
                return Err(PosterError::config(format!(
                    "jpeg quality must be in (0, 1], got {quality}"
                )));
            }
        }
        if self.brand.standard_mark.trim().is_empty() || self.brand.white_mark.trim().is_empty() {
            return Err(PosterError::config("brand mark sources must not be empty"));
        }
        Ok(())
    }

    /// Template colors.
    pub fn palette(&self) -> PosterResult<Palette> {
        Ok(Palette {
            badge: Rgba8::from_hex(&self.brand.badge_color)?,
            accent: Rgba8::from_hex(&self.brand.accent_color)?,
            text: Rgba8::WHITE,
        })
    }

    /// Mark source for a template.
    pub fn mark_source(&self, template: TemplateId) -> &str {
        if template.uses_white_mark() {
            &self.brand.white_mark
        } else {
            &self.brand.standard_mark
        }
    }

    /// Faces for the parley typesetter, or `None` when no font file is configured.
    pub fn font_set(&self) -> PosterResult<Option<FontSet>> {
        let faces = [
            (WEIGHT_BLACK, false, &self.fonts.black),
            (WEIGHT_BLACK, true, &self.fonts.black_italic),
            (WEIGHT_BOLD, false, &self.fonts.bold),
        ];
        let mut set = FontSet::new();
        for (weight, italic, path) in faces {
            if let Some(path) = path {
                set = set.with_face_file(weight, italic, path)?;
            }
        }
        Ok((!set.is_empty()).then_some(set))
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.fonts.black,
            &mut self.fonts.black_italic,
            &mut self.fonts.bold,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        for source in [&mut self.brand.standard_mark, &mut self.brand.white_mark] {
            if is_bare_relative_path(source) {
                *source = base.join(&*source).to_string_lossy().into_owned();
            }
        }
    }
}

fn is_bare_relative_path(source: &str) -> bool {
    !source.contains(':') && Path::new(source).is_relative()
}

/// Read-only key-value store holding user preferences.
pub trait PreferenceStore {
    /// String value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;
}

/// Preferences kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Preferences read from a flat JSON object file.
#[derive(Debug, Clone, Default)]
pub struct JsonPreferenceFile {
    values: HashMap<String, serde_json::Value>,
}

impl JsonPreferenceFile {
    /// Load `path`; a missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no preferences file");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read preferences '{}'", path.display()))
                    .into());
            }
        };
        let values = serde_json::from_str(&content).map_err(|e| {
            PosterError::config(format!("invalid preferences '{}': {e}", path.display()))
        })?;
        Ok(Self { values })
    }
}

impl PreferenceStore for JsonPreferenceFile {
    fn get(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Pick the template for a render: explicit choice, else a valid stored default, else
/// `fallback`.
pub fn resolve_template(
    explicit: Option<TemplateId>,
    stored_default: Option<&str>,
    fallback: TemplateId,
) -> TemplateId {
    if let Some(t) = explicit {
        return t;
    }
    match stored_default.map(str::parse::<TemplateId>) {
        Some(Ok(t)) => t,
        Some(Err(_)) => {
            tracing::debug!(stored = ?stored_default, %fallback, "ignoring unknown stored template");
            fallback
        }
        None => fallback,
    }
}

/// Source of "today" for date captions.
pub trait Clock: Send + Sync {
    /// The current local date.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock date in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Always the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
