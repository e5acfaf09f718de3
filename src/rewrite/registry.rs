//! Registry of objects already rewritten in this run.

use crate::container::Address;
use rustc_hash::FxHashMap;

/// Maps the address an object had before rewriting to the address of its
/// replacement. One registry lives for a whole run, threaded through the
/// traversal by reference; it is never global state.
///
/// Recording a rewrite also maps the replacement to itself, so a hardlink
/// that already points at the rebuilt object resolves without being
/// mistaken for a stale one.
#[derive(Debug, Default)]
pub struct AddressRegistry {
    rewritten: FxHashMap<Address, Address>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the object formerly at `old` now lives at `new`.
    pub fn record(&mut self, old: Address, new: Address) {
        self.rewritten.insert(old, new);
        self.rewritten.insert(new, new);
    }

    /// Surviving address of a rewritten object, if `addr` was involved in
    /// a rewrite this run.
    pub fn lookup(&self, addr: Address) -> Option<Address> {
        self.rewritten.get(&addr).copied()
    }
}
