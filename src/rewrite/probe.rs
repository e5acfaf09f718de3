//! Virtual-storage probe.

use crate::container::{Address, Container, ContainerResult};

/// Whether the dataset at `addr` uses virtual (composite) storage.
///
/// Read-only: inspects the storage layout and nothing else. Errors if the
/// address is dangling or does not name a dataset.
pub fn is_composite(container: &Container, addr: Address) -> ContainerResult<bool> {
    Ok(container.layout(addr)?.is_virtual())
}
