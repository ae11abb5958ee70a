use std::fmt;

/// Convenience result type used across ktpost.
pub type PosterResult<T> = Result<T, PosterError>;

/// Which of the two per-render assets failed to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetRole {
    /// The source photograph drawn with cover-fit.
    Background,
    /// The brand mark overlaid by the template.
    BrandMark,
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => f.write_str("background image"),
            Self::BrandMark => f.write_str("brand mark"),
        }
    }
}

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant aborts a render atomically: no partial poster is ever returned.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// Fetching or decoding the background or the brand mark failed.
    #[error("failed to load {role} '{uri}': {reason}")]
    AssetLoad {
        /// Which asset failed.
        role: AssetRole,
        /// The image source string as given by the caller.
        uri: String,
        /// Underlying cause, flattened to text.
        reason: String,
    },

    /// The drawing surface could not be acquired.
    #[error("surface error: {0}")]
    Surface(String),

    /// Final serialization of the raster failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::AssetLoad`] value.
    pub fn asset_load(role: AssetRole, uri: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::AssetLoad {
            role,
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`PosterError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`PosterError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PosterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The failed asset role, for [`PosterError::AssetLoad`] errors.
    pub fn asset_role(&self) -> Option<AssetRole> {
        match self {
            Self::AssetLoad { role, .. } => Some(*role),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
