//! Registry of bound streams.
//!
//! One [`StreamHandle`] exists per [`StreamKey`]; every ledger bound to the same key shares it.
//! The registry is an ordinary value owned by the host application, not process-global state.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::stream::{open_stream, StreamKey, StreamSink};
use crate::history::handle::StreamHandle;

#[derive(Default)]
pub struct StreamRegistry {
    handles: Mutex<HashMap<StreamKey, Arc<StreamHandle>>>,
}

impl fmt::Debug for StreamRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<StreamKey> = self.lock().keys().cloned().collect();
        keys.sort();
        f.debug_struct("StreamRegistry").field("bound", &keys).finish()
    }
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<StreamKey, Arc<StreamHandle>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds `key`, opening its default sink on first use.
    pub fn bind(&self, key: StreamKey) -> Arc<StreamHandle> {
        let default_key = key.clone();
        self.bind_with(key, move || open_stream(&default_key))
    }

    /// Binds `key`, calling `open` only if the key is not bound yet.
    ///
    /// The sink returned by `open` is taken over by the handle: from then on it is written only
    /// through the handle, so every byte is recorded in the shared history.
    pub fn bind_with<F>(&self, key: StreamKey, open: F) -> Arc<StreamHandle>
    where
        F: FnOnce() -> StreamSink,
    {
        let mut handles = self.lock();
        if let Some(handle) = handles.get(&key) {
            return Arc::clone(handle);
        }

        tracing::debug!(stream = %key, "binding stream");
        let handle = Arc::new(StreamHandle::new(key.clone(), open()));
        handles.insert(key, Arc::clone(&handle));
        handle
    }

    pub fn get(&self, key: &StreamKey) -> Option<Arc<StreamHandle>> {
        self.lock().get(key).cloned()
    }

    pub fn is_bound(&self, key: &StreamKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Unbinds `key` and hands back the original sink.
    ///
    /// Handles still held elsewhere reject further output with `Released`; a later bind of the
    /// same key opens a fresh handle.
    pub fn release(&self, key: &StreamKey) -> Option<StreamSink> {
        let handle = self.lock().remove(key)?;
        tracing::debug!(stream = %key, "releasing stream");
        Some(handle.detach(Box::new(io::sink())))
    }
}
