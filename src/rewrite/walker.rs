//! Recursive namespace traversal.

use crate::container::{Address, Container, ContainerResult, Layout, ObjectKind};
use crate::{debug, error, log, warn};

use super::chain::AncestorChain;
use super::mapping::rewrite_mappings;
use super::probe::is_composite;
use super::registry::AddressRegistry;
use super::replace::replace_object;
use super::{RewriteJob, RunStats};

/// Visit every direct child of `group` once, in native link order.
///
/// Sub-groups recurse with a copy of `chain` extended by their address,
/// unless that address is already on the path (a loop, warned and
/// skipped). Datasets go through probe / registry / rewrite. Failures to
/// query or rewrite one child are reported and counted, then traversal
/// moves on to the next sibling; only a failed child enumeration is fatal
/// to the run.
pub(super) fn walk(
    container: &mut Container,
    group: Address,
    chain: &AncestorChain,
    registry: &mut AddressRegistry,
    job: &RewriteJob,
    stats: &mut RunStats,
) -> ContainerResult<()> {
    // Snapshot: links in this group may be deleted and recreated as their
    // targets are rewritten, but each original child is visited once.
    let links = container.links(group)?;

    for link in links {
        let kind = match container.object_kind(link.target) {
            Ok(kind) => kind,
            Err(e) => {
                error!("walk"; "cannot query `{}`: {e}", link.name);
                stats.errors += 1;
                continue;
            }
        };

        match kind {
            ObjectKind::Group => {
                debug!("walk"; "group `{}` at {}", link.name, link.target);
                stats.groups += 1;
                if chain.contains(link.target) {
                    warn!("walk"; "loop detected at `{}`, skipping subtree", link.name);
                    stats.cycles += 1;
                } else {
                    let chain = chain.descend(link.target);
                    walk(container, link.target, &chain, registry, job, stats)?;
                }
            }
            ObjectKind::Dataset => {
                debug!("walk"; "dataset `{}` at {}", link.name, link.target);
                stats.datasets += 1;
                if let Err(e) =
                    process_dataset(container, group, &link.name, link.target, registry, job, stats)
                {
                    error!("walk"; "`{}` skipped: {e}", link.name);
                    stats.errors += 1;
                }
            }
            ObjectKind::NamedType => {
                debug!("walk"; "named type `{}` at {}", link.name, link.target)
            }
            ObjectKind::Unknown => {
                debug!("walk"; "unknown object `{}` at {}", link.name, link.target)
            }
        }
    }

    Ok(())
}

/// Probe one dataset and, if it is composite, bring it up to date:
/// repoint the link when the object was already rewritten through another
/// link, otherwise substitute its mapping list and swap the object.
fn process_dataset(
    container: &mut Container,
    group: Address,
    name: &str,
    addr: Address,
    registry: &mut AddressRegistry,
    job: &RewriteJob,
    stats: &mut RunStats,
) -> anyhow::Result<()> {
    if !is_composite(container, addr)? {
        return Ok(());
    }
    stats.composites += 1;

    // An address seen by a rewrite already: this link is an alias of the
    // replaced object. Repoint it at the survivor instead of rewriting
    // twice.
    if let Some(survivor) = registry.lookup(addr) {
        if survivor == addr {
            // Already points at the rebuilt object (second visit through
            // a shared group); nothing to do.
            return Ok(());
        }
        container.delete_link(group, name)?;
        container.create_link(group, name, survivor)?;
        log!("walk"; "`{name}`: repointed to rewritten object at {survivor}");
        stats.relinked += 1;
        return Ok(());
    }

    let mappings = match container.layout(addr)? {
        Layout::Virtual { mappings } => mappings.as_slice(),
        // Not reachable past the probe; keep the guard rather than panic.
        _ => return Ok(()),
    };
    debug!("rewrite"; "`{name}`: {} mappings", mappings.len());

    let (rewritten, count) = rewrite_mappings(mappings, &job.from, &job.to);
    if crate::logger::is_verbose() {
        for (new, old) in rewritten.iter().zip(mappings) {
            if new.source_file == old.source_file {
                debug!("rewrite"; "    {old} (no substitution)");
            } else {
                debug!("rewrite"; "    {old} -> {new}");
            }
        }
    }
    if count == 0 {
        debug!("rewrite"; "`{name}`: nothing to substitute");
        return Ok(());
    }

    log!("rewrite"; "`{name}`: replacing {count} source paths");
    let new = replace_object(container, group, name, rewritten)?;
    registry.record(addr, new);
    stats.rewritten += 1;
    stats.substitutions += count;
    Ok(())
}
