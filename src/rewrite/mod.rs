//! Traversal-and-rewrite engine.
//!
//! Walks the container namespace depth-first from the root, finds leaf
//! datasets with virtual (composite) storage, substitutes a source-path
//! prefix across each one's ordered mapping list and swaps the object for
//! a rebuilt copy, preserving its link name, metadata and hardlink
//! identity. Cycle detection ([`chain`]) keeps the walk finite; the
//! rewrite registry ([`registry`]) keeps shared objects rewritten exactly
//! once.

pub mod chain;
pub mod mapping;
pub mod probe;
pub mod registry;
pub mod replace;
mod walker;

use crate::container::{Container, ContainerResult};
use crate::{log, warn};

use chain::AncestorChain;
use registry::AddressRegistry;

/// The substitution a run performs.
#[derive(Debug, Clone)]
pub struct RewriteJob {
    pub from: String,
    pub to: String,
}

/// Counters accumulated over one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Groups visited (revisits through shared links count again).
    pub groups: usize,
    /// Datasets examined.
    pub datasets: usize,
    /// Datasets with virtual storage.
    pub composites: usize,
    /// Objects swapped for a rebuilt copy.
    pub rewritten: usize,
    /// Mapping entries whose source path changed.
    pub substitutions: usize,
    /// Hardlinks repointed at an object rewritten through another link.
    pub relinked: usize,
    /// Subtrees skipped because descending would loop.
    pub cycles: usize,
    /// Children skipped after a local failure.
    pub errors: usize,
}

impl RunStats {
    /// Human-readable completion summary.
    pub fn report(&self) {
        log!(
            "done";
            "visited {} groups, {} datasets ({} virtual)",
            self.groups, self.datasets, self.composites
        );
        log!(
            "done";
            "rewrote {} objects ({} source paths), repointed {} links",
            self.rewritten, self.substitutions, self.relinked
        );
        if self.cycles > 0 {
            warn!("done"; "skipped {} looping subtrees", self.cycles);
        }
        if self.errors > 0 {
            warn!("done"; "{} objects skipped after errors", self.errors);
        }
    }
}

/// Rewrite every virtual dataset reachable from the root whose mapping
/// list mentions `from`, replacing the first occurrence per mapping with
/// `to`. Mutates the in-memory store only; the caller decides when to
/// save.
///
/// Errors only on structural traversal failure; everything object-local
/// is reported, counted in [`RunStats::errors`] and skipped.
pub fn run(container: &mut Container, from: &str, to: &str) -> ContainerResult<RunStats> {
    let job = RewriteJob {
        from: from.to_owned(),
        to: to.to_owned(),
    };
    let root = container.root();
    let chain = AncestorChain::root(root);
    let mut registry = AddressRegistry::new();
    let mut stats = RunStats::default();
    walker::walk(container, root, &chain, &mut registry, &job, &mut stats)?;
    Ok(stats)
}
