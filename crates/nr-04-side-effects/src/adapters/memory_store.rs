//! In-Memory Object Store
//!
//! Implements `ObjectStore` with object ids derived from the payload hash.
//! Writing the same payload twice yields the same object, and the first
//! write's header stays with it.

use crate::domain::{ContainerId, ObjectHeader, ObjectId, SideEffectError};
use crate::ports::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct StoredObject {
    header: ObjectHeader,
    payload: Bytes,
}

/// Process-local object store.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<(ContainerId, ObjectId), StoredObject>>,
}

impl InMemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects held.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Store holds nothing?
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Header an object was written with.
    pub fn header(&self, container: &ContainerId, object: &ObjectId) -> Option<ObjectHeader> {
        self.objects
            .read()
            .get(&(*container, *object))
            .map(|o| o.header.clone())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, header: ObjectHeader, payload: Bytes) -> Result<ObjectId, SideEffectError> {
        let id = ObjectId::for_payload(&payload);
        self.objects
            .write()
            .entry((header.container, id))
            .or_insert(StoredObject { header, payload });
        Ok(id)
    }

    async fn get(
        &self,
        container: &ContainerId,
        object: &ObjectId,
    ) -> Result<Option<Bytes>, SideEffectError> {
        Ok(self
            .objects
            .read()
            .get(&(*container, *object))
            .map(|o| o.payload.clone()))
    }
}
