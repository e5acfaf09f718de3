//! Structural replacement of a virtual dataset.

use crate::container::{
    Address, Container, ContainerError, Layout, SourceMapping,
};
use crate::{debug, error};
use thiserror::Error;

/// Failures of the replacement protocol.
///
/// `Inspect` failures leave the container as it was (at worst with an
/// orphaned temporary link). `Unlink` and `Rename` failures leave the
/// object inconsistent and are reported as such by the caller.
#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("cannot stage replacement for `{name}`")]
    Inspect {
        name: String,
        #[source]
        source: ContainerError,
    },

    #[error("cannot unlink original `{name}`; replacement left at `{temp}`")]
    Unlink {
        name: String,
        temp: String,
        #[source]
        source: ContainerError,
    },

    #[error("cannot rename `{temp}` back to `{name}`")]
    Rename {
        name: String,
        temp: String,
        #[source]
        source: ContainerError,
    },
}

/// Swap the dataset linked as `name` in `group` for a rebuilt copy whose
/// virtual layout holds `mappings`. Only called once at least one mapping
/// changed.
///
/// The original is unlinked strictly after the replacement is fully built
/// and populated, so a failure part-way leaves the replacement orphaned
/// under its temporary name rather than losing data. Attribute-copy
/// failures are reported per attribute and do not stop the remaining
/// attributes or the swap.
///
/// Returns the replacement's address for registration.
pub fn replace_object(
    container: &mut Container,
    group: Address,
    name: &str,
    mappings: Vec<SourceMapping>,
) -> Result<Address, ReplaceError> {
    let inspect = |source| ReplaceError::Inspect {
        name: name.to_owned(),
        source,
    };

    // 1. Capture the original's element type and shape.
    let old = container.link_target(group, name).map_err(inspect)?;
    let (dtype, space) = container.dataset_meta(old).map_err(inspect)?;

    // 2. Build the replacement under a non-colliding temporary name.
    let temp = temp_name(container, group, name);
    let new = container
        .create_dataset(group, &temp, dtype, space, Layout::Virtual { mappings })
        .map_err(inspect)?;
    debug!("replace"; "`{name}`: staged replacement `{temp}` at {new}");

    // 3. Copy every attribute. One bad attribute does not stop the rest,
    //    it only leaves the replacement short that attribute.
    match container.attr_names(old) {
        Ok(names) => {
            for attr in names {
                let copied = container
                    .attr(old, &attr)
                    .and_then(|value| container.set_attr(new, &attr, value));
                if let Err(e) = copied {
                    error!("replace"; "`{name}`: attribute `{attr}` not copied: {e}");
                }
            }
        }
        Err(e) => error!("replace"; "`{name}`: attributes not enumerated: {e}"),
    }

    // 4. Unlink the original, only now that the replacement is complete.
    container
        .delete_link(group, name)
        .map_err(|source| ReplaceError::Unlink {
            name: name.to_owned(),
            temp: temp.clone(),
            source,
        })?;

    // 5. Move the replacement onto the original name.
    container
        .rename_link(group, &temp, name)
        .map_err(|source| ReplaceError::Rename {
            name: name.to_owned(),
            temp,
            source,
        })?;

    Ok(new)
}

/// First `.<name>.vdsmv.<n>` not taken in `group`.
fn temp_name(container: &Container, group: Address, name: &str) -> String {
    let mut n = 0u32;
    loop {
        let candidate = format!(".{name}.vdsmv.{n}");
        if !container.link_exists(group, &candidate) {
            return candidate;
        }
        n += 1;
    }
}
