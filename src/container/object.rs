//! Object model: addresses, kinds, datatypes, attributes and links.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::layout::Layout;

/// Physical address of a stored object.
///
/// Allocated monotonically when an object is created and never reused
/// within the lifetime of a container file. Every link that aliases the
/// same object resolves to the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub u64);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Kind of a namespace entry, as reported to the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Group,
    Dataset,
    NamedType,
    /// Object kinds introduced by a newer format revision.
    Unknown,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Group => "group",
            ObjectKind::Dataset => "dataset",
            ObjectKind::NamedType => "named type",
            ObjectKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Element datatype of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Datatype {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

/// Logical extent of a dataset, one entry per dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataspace {
    pub dims: Vec<u64>,
}

impl Dataspace {
    pub fn new(dims: impl Into<Vec<u64>>) -> Self {
        Self { dims: dims.into() }
    }
}

/// Typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
    TextList(Vec<String>),
}

/// Named attribute attached to an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

/// Named reference from a group to an object.
///
/// Names are unique within one group but not globally; several links may
/// target the same address (hardlink aliasing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub target: Address,
}

/// Stored object payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum Object {
    Group {
        /// Child links in insertion order. Enumeration follows this order.
        links: Vec<Link>,
        attrs: Vec<Attribute>,
    },
    Dataset {
        dtype: Datatype,
        space: Dataspace,
        layout: Layout,
        attrs: Vec<Attribute>,
    },
    NamedType {
        dtype: Datatype,
        attrs: Vec<Attribute>,
    },
}

impl Object {
    pub(crate) fn empty_group() -> Self {
        Object::Group {
            links: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub(crate) fn kind(&self) -> ObjectKind {
        match self {
            Object::Group { .. } => ObjectKind::Group,
            Object::Dataset { .. } => ObjectKind::Dataset,
            Object::NamedType { .. } => ObjectKind::NamedType,
        }
    }

    pub(crate) fn attrs(&self) -> &[Attribute] {
        match self {
            Object::Group { attrs, .. }
            | Object::Dataset { attrs, .. }
            | Object::NamedType { attrs, .. } => attrs,
        }
    }

    pub(crate) fn attrs_mut(&mut self) -> &mut Vec<Attribute> {
        match self {
            Object::Group { attrs, .. }
            | Object::Dataset { attrs, .. }
            | Object::NamedType { attrs, .. } => attrs,
        }
    }
}
