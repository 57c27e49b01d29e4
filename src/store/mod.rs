// src/store/mod.rs
// =============================================================================
// Single-slot persistence.
//
// The API key, the spam block state and similar records each live in exactly
// one slot: a writer replaces the whole value, a reader gets the whole value
// back. Components receive a `SlotStore` instead of a hard-coded path so tests
// can swap in `MemorySlot`.
//
// Submodules:
// - file: slot backed by one file on disk
// - memory: slot backed by a shared in-memory cell
// =============================================================================

mod file;
mod memory;

pub use file::FileSlot;
pub use memory::MemorySlot;

use std::io;

/// One persisted value with read/overwrite/delete semantics.
pub trait SlotStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been written yet.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replaces the stored value.
    fn write(&self, contents: &str) -> io::Result<()>;

    /// Removes the stored value. Returns whether something was removed.
    fn delete(&self) -> io::Result<bool>;

    /// Human-readable location, used in log messages.
    fn describe(&self) -> String;
}
