//! Reusable scratch buffers and field maps
//!
//! Both pools are free lists backed by an unbounded `crossbeam_channel`, so
//! any number of threads can take and return items without further
//! coordination. A returned item is cleared but keeps its allocation.

use super::fields::Fields;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, LazyLock};

const INITIAL_BUFFER_CAPACITY: usize = 256;
const INITIAL_FIELDS_CAPACITY: usize = 6;

/// Source of render buffers for a logger.
pub trait BufferPool: Send + Sync {
    /// Take an empty buffer.
    fn get(&self) -> Vec<u8>;
    /// Give a buffer back. Its contents are discarded.
    fn put(&self, buf: Vec<u8>);
}

struct Recycler<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> Recycler<T> {
    fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    fn take(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    fn give(&self, item: T) {
        // Cannot be disconnected: we own the receiver.
        let _ = self.sender.send(item);
    }

    fn idle(&self) -> usize {
        self.receiver.len()
    }
}

/// Unbounded, thread-safe buffer pool.
pub struct SharedBufferPool {
    free: Recycler<Vec<u8>>,
}

impl SharedBufferPool {
    pub fn new() -> Self {
        Self {
            free: Recycler::new(),
        }
    }

    /// Number of buffers currently waiting to be reused.
    pub fn idle(&self) -> usize {
        self.free.idle()
    }
}

impl Default for SharedBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPool for SharedBufferPool {
    fn get(&self) -> Vec<u8> {
        self.free
            .take()
            .unwrap_or_else(|| Vec::with_capacity(INITIAL_BUFFER_CAPACITY))
    }

    fn put(&self, mut buf: Vec<u8>) {
        buf.clear();
        self.free.give(buf);
    }
}

static DEFAULT_BUFFER_POOL: LazyLock<Arc<SharedBufferPool>> =
    LazyLock::new(|| Arc::new(SharedBufferPool::new()));

/// The process-wide pool used by loggers without a private one.
pub fn default_buffer_pool() -> Arc<dyn BufferPool> {
    DEFAULT_BUFFER_POOL.clone()
}

/// Per-logger pool of field maps backing pooled entries.
pub(crate) struct EntryPool {
    free: Recycler<Fields>,
}

impl EntryPool {
    pub(crate) fn new() -> Self {
        Self {
            free: Recycler::new(),
        }
    }

    pub(crate) fn get(&self) -> Fields {
        self.free
            .take()
            .unwrap_or_else(|| Fields::with_capacity(INITIAL_FIELDS_CAPACITY))
    }

    pub(crate) fn put(&self, mut fields: Fields) {
        fields.clear();
        self.free.give(fields);
    }

    pub(crate) fn idle(&self) -> usize {
        self.free.idle()
    }
}
