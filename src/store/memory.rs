// src/store/memory.rs
// In-memory slot. Clones share the same cell, so a test can keep a handle
// and inspect what a component wrote.

use super::SlotStore;
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    cell: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.cell
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory slot poisoned"))
    }
}

impl SlotStore for MemorySlot {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.lock()? = Some(contents.to_string());
        Ok(())
    }

    fn delete(&self) -> io::Result<bool> {
        Ok(self.lock()?.take().is_some())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
