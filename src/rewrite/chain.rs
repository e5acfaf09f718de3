//! Ancestor tracking for cycle detection.

use crate::container::Address;

/// Addresses of the groups on the current depth-first path, root first.
///
/// Each recursion level owns its own extended copy, so the chain reflects
/// exactly one path and unwinds with it; sibling subtrees never see each
/// other's frames. Membership testing is O(depth), which is the chain
/// length, not the container size.
#[derive(Debug, Clone)]
pub struct AncestorChain {
    frames: Vec<Frame>,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    depth: u32,
    addr: Address,
}

impl AncestorChain {
    /// Chain containing only the root group.
    pub fn root(addr: Address) -> Self {
        Self {
            frames: vec![Frame { depth: 0, addr }],
        }
    }

    /// New chain extended by one child group.
    pub fn descend(&self, addr: Address) -> Self {
        let mut next = self.clone();
        next.frames.push(Frame {
            depth: self.depth() + 1,
            addr,
        });
        next
    }

    /// Whether `addr` is already on this path (descending into it again
    /// would loop).
    pub fn contains(&self, addr: Address) -> bool {
        self.frames.iter().any(|f| f.addr == addr)
    }

    pub fn depth(&self) -> u32 {
        self.frames.last().map(|f| f.depth).unwrap_or(0)
    }
}
