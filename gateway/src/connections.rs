//! Registered set of open connections (C3 Connection Pool).
//!
//! The listener registers each accepted connection here before spawning its
//! handler task and the handler deregisters itself on exit, regardless of
//! whether it closed cleanly, errored, or was cancelled by shutdown.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    open: Mutex<HashSet<u64>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly accepted connection and returns its id.
    pub fn register(&self) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.open.lock().unwrap().insert(id);
        id
    }

    /// Deregisters a connection on exit.
    pub fn deregister(&self, id: u64) {
        self.open.lock().unwrap().remove(&id);
    }

    pub fn open_count(&self) -> usize {
        self.open.lock().unwrap().len()
    }
}
