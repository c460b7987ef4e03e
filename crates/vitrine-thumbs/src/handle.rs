//! Revocable in-memory image handles.
//!
//! An [`ImageHandle`] is what the gallery binds to an `<img>`-like widget: a
//! cheap cloneable URL. The bytes live in the [`ImageStore`] until revoked.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

const URL_PREFIX: &str = "blob:vitrine/";

/// Opaque reference to stored image bytes.
///
/// Clones share the same allocation; [`ptr_eq`](Self::ptr_eq) tells whether
/// two handles came from the same `create` call.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle(Arc<str>);

impl ImageHandle {
    pub fn url(&self) -> &str {
        &self.0
    }

    pub fn ptr_eq(&self, other: &ImageHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageHandle").field(&self.url()).finish()
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

#[derive(Debug)]
struct StoredImage {
    bytes: Arc<[u8]>,
    mime: &'static str,
}

/// Shared table of live image handles. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: Arc<Mutex<HashMap<Arc<str>, StoredImage>>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<Arc<str>, StoredImage>> {
        self.images.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `bytes` and returns a fresh handle to them.
    pub fn create(&self, bytes: Vec<u8>, mime: &'static str) -> ImageHandle {
        let url: Arc<str> = format!("{URL_PREFIX}{}", Uuid::new_v4()).into();
        self.table().insert(
            url.clone(),
            StoredImage {
                bytes: bytes.into(),
                mime,
            },
        );
        ImageHandle(url)
    }

    /// Bytes behind `handle`, or `None` once revoked.
    pub fn resolve(&self, handle: &ImageHandle) -> Option<Arc<[u8]>> {
        self.table().get(handle.url()).map(|img| img.bytes.clone())
    }

    pub fn mime(&self, handle: &ImageHandle) -> Option<&'static str> {
        self.table().get(handle.url()).map(|img| img.mime)
    }

    /// Frees the bytes. Returns whether the handle was live.
    pub fn revoke(&self, handle: &ImageHandle) -> bool {
        self.table().remove(handle.url()).is_some()
    }

    /// Frees every stored image; returns how many were live.
    pub fn revoke_all(&self) -> usize {
        let mut table = self.table();
        let n = table.len();
        table.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}
