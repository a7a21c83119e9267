//! Tracking of asynchronously loading textures.
//!
//! The hierarchy must not be built while any texture is still pending, so the
//! application requests every key up front and polls until the set settles.

use std::collections::BTreeMap;
use std::path::Path;

use crate::render::{RenderError, Renderer};

/// Load state of one texture as reported by the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureStatus {
    Pending,
    Ready,
    Failed(String),
}

/// Load state of every requested texture, keyed by catalog texture key.
#[derive(Clone, Debug, Default)]
pub struct TextureSet {
    entries: BTreeMap<String, TextureStatus>,
}

impl TextureSet {
    /// Ask the renderer to load each `(key, path)` pair.
    pub fn request<'a, R, I>(renderer: &mut R, textures: I) -> Result<Self, RenderError>
    where
        R: Renderer + ?Sized,
        I: IntoIterator<Item = (&'a str, &'a Path)>,
    {
        let mut entries = BTreeMap::new();
        for (key, path) in textures {
            renderer.load_texture(key, path)?;
            entries.insert(key.to_string(), TextureStatus::Pending);
        }
        log::debug!("Requested {} textures", entries.len());
        Ok(Self { entries })
    }

    /// A set whose keys are all already resolved.
    pub fn ready<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: keys
                .into_iter()
                .map(|k| (k.to_string(), TextureStatus::Ready))
                .collect(),
        }
    }

    /// Poll every pending texture once. Returns how many are still pending.
    pub fn poll<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> usize {
        let mut pending = 0;
        for (key, status) in self.entries.iter_mut() {
            if *status != TextureStatus::Pending {
                continue;
            }
            *status = renderer.poll_texture(key);
            match status {
                TextureStatus::Pending => pending += 1,
                TextureStatus::Ready => log::debug!("Texture '{key}' ready"),
                TextureStatus::Failed(reason) => log::warn!("Texture '{key}' failed: {reason}"),
            }
        }
        pending
    }

    /// True once no texture is pending.
    pub fn is_settled(&self) -> bool {
        self.entries.values().all(|s| *s != TextureStatus::Pending)
    }

    pub fn is_resolved(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(TextureStatus::Ready))
    }

    pub fn status(&self, key: &str) -> Option<&TextureStatus> {
        self.entries.get(key)
    }

    pub fn resolved_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, s)| **s == TextureStatus::Ready)
            .map(|(k, _)| k.as_str())
    }

    pub fn failed_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, s)| matches!(s, TextureStatus::Failed(_)))
            .map(|(k, _)| k.as_str())
    }
}
