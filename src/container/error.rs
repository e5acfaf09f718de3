//! Container error types.

use std::path::PathBuf;
use thiserror::Error;

use super::object::Address;

pub type ContainerResult<T> = Result<T, ContainerError>;

/// Errors raised by container primitives.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("`{0}` is not a container file (bad magic)")]
    BadMagic(PathBuf),

    #[error("container body decode error")]
    Decode(#[source] bincode::Error),

    #[error("container body encode error")]
    Encode(#[source] bincode::Error),

    #[error("container `{0}` has no root group")]
    MissingRoot(PathBuf),

    #[error("no object at address {0}")]
    NoSuchObject(Address),

    #[error("object at {0} is not a group")]
    NotAGroup(Address),

    #[error("object at {0} is not a dataset")]
    NotADataset(Address),

    #[error("no link `{name}` in group {group}")]
    NoSuchLink { group: Address, name: String },

    #[error("link `{name}` already exists in group {group}")]
    LinkExists { group: Address, name: String },

    #[error("no attribute `{name}` on object {addr}")]
    NoSuchAttribute { addr: Address, name: String },
}
