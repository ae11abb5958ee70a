use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use base64::Engine as _;

use crate::foundation::error::{PosterError, PosterResult};

/// Where an image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// `http://` or `https://` URL.
    Remote(String),
    /// Payload embedded in a `data:` URI, already decoded.
    Inline {
        /// Declared media type, if any.
        mime: Option<String>,
        /// Decoded payload.
        bytes: Arc<Vec<u8>>,
    },
    /// `blob:` or `mem:` URI resolved through a [`BlobStore`].
    Memory(String),
    /// Local file, from a `file://` URI or a bare path.
    File(PathBuf),
}

impl ImageSource {
    /// Classify an image source string.
    ///
    /// HTML-escaped ampersands are unescaped first. Malformed `data:` URIs are rejected here;
    /// every other form is only checked when it is fetched.
    pub fn parse(raw: &str) -> PosterResult<Self> {
        let s = unescape_ampersands(raw.trim());
        if s.is_empty() {
            return Err(PosterError::validation("image source is empty"));
        }
        let lower = s.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Remote(s.into_owned()));
        }
        if lower.starts_with("data:") {
            return parse_data_uri(&s);
        }
        if lower.starts_with("blob:") || lower.starts_with("mem:") {
            return Ok(Self::Memory(s.into_owned()));
        }
        if let Some(path) = s.strip_prefix("file://") {
            let path = percent_encoding::percent_decode_str(path)
                .decode_utf8()
                .map_err(|e| PosterError::validation(format!("file uri is not utf-8: {e}")))?;
            return Ok(Self::File(PathBuf::from(path.into_owned())));
        }
        if lower.contains("://") {
            return Err(PosterError::validation(format!(
                "unsupported image source scheme in '{s}'"
            )));
        }
        Ok(Self::File(PathBuf::from(s.into_owned())))
    }

    /// Short label for logs; inline payloads are summarized rather than echoed.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote",
            Self::Inline { .. } => "inline",
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
        }
    }
}

/// Replace `&amp;` with `&`, as scraped article markup leaves it in image URLs.
pub fn unescape_ampersands(s: &str) -> Cow<'_, str> {
    if s.contains("&amp;") {
        Cow::Owned(s.replace("&amp;", "&"))
    } else {
        Cow::Borrowed(s)
    }
}

fn parse_data_uri(s: &str) -> PosterResult<ImageSource> {
    let rest = &s["data:".len()..];
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| PosterError::validation("data uri has no ',' separator"))?;

    let mut parts = meta.split(';');
    let mime = parts
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_ascii_lowercase);
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| PosterError::validation(format!("invalid base64 in data uri: {e}")))?
    } else {
        percent_encoding::percent_decode_str(payload).collect()
    };

    Ok(ImageSource::Inline {
        mime,
        bytes: Arc::new(bytes),
    })
}

/// Caller-owned registry backing `blob:` and `mem:` image sources.
///
/// Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct BlobStore {
    entries: Arc<RwLock<HashMap<String, Arc<Vec<u8>>>>>,
    next_id: Arc<AtomicU64>,
}

impl BlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under a fresh `mem:` URI and return it.
    pub fn insert(&self, bytes: Vec<u8>) -> PosterResult<String> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let uri = format!("mem:{id}");
        self.insert_named(&uri, bytes)?;
        Ok(uri)
    }

    /// Store `bytes` under an explicit `blob:` or `mem:` URI, replacing any previous entry.
    pub fn insert_named(&self, uri: &str, bytes: Vec<u8>) -> PosterResult<()> {
        if !matches!(ImageSource::parse(uri)?, ImageSource::Memory(_)) {
            return Err(PosterError::validation(format!(
                "'{uri}' is not a blob: or mem: uri"
            )));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PosterError::validation("blob store lock poisoned"))?;
        entries.insert(uri.to_string(), Arc::new(bytes));
        Ok(())
    }

    /// Bytes stored under `uri`.
    pub fn get(&self, uri: &str) -> Option<Arc<Vec<u8>>> {
        self.entries.read().ok()?.get(uri).cloned()
    }

    /// Drop the entry for `uri`, returning whether one existed.
    pub fn revoke(&self, uri: &str) -> bool {
        self.entries
            .write()
            .map(|mut e| e.remove(uri).is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
