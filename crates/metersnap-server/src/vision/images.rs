//! In-process image hosting for `imageRef` links.
//!
//! Photographs are kept for the process lifetime, like the readings that
//! point at them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use dashmap::DashMap;
use uuid::Uuid;

use super::VisionError;

/// One decoded photograph.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub bytes: Bytes,
    pub mime: &'static str,
}

impl StoredImage {
    /// Decode a base64 payload, optionally wrapped as a `data:` URL, and
    /// check that it is a known image format.
    pub fn decode(payload: &str) -> Result<Self, VisionError> {
        let raw = match payload.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => payload,
        };
        let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| VisionError::InvalidImage(format!("base64: {e}")))?;

        let kind = infer::get(&bytes)
            .filter(|k| k.matcher_type() == infer::MatcherType::Image)
            .ok_or_else(|| VisionError::InvalidImage("unrecognized image format".into()))?;

        Ok(Self {
            bytes: Bytes::from(bytes),
            mime: kind.mime_type(),
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

#[derive(Default)]
pub struct ImageStore {
    images: DashMap<Uuid, StoredImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self {
            images: DashMap::new(),
        }
    }

    pub fn put(&self, image: StoredImage) -> Uuid {
        let mut id = Uuid::new_v4();
        while self.images.contains_key(&id) {
            id = Uuid::new_v4();
        }
        self.images.insert(id, image);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<StoredImage> {
        self.images.get(id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
