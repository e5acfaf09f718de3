//! Dataset storage layouts, including virtual source-mapping lists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Region of a dataspace selected by one side of a virtual mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// The whole extent.
    All,
    /// Rectangular sub-region: per-dimension offset and length.
    Hyperslab { start: Vec<u64>, count: Vec<u64> },
}

/// One entry of a virtual dataset's mapping list.
///
/// Describes how a region of the dataset's logical space is filled from a
/// region of a named dataset in another (possibly external) container.
/// List order is significant: earlier entries take priority where
/// selections overlap, so a rewrite must preserve it exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapping {
    /// Path of the container holding the source dataset.
    pub source_file: String,
    /// Path of the source dataset within that container.
    pub source_dataset: String,
    /// Region read from the source dataset.
    pub src_selection: Selection,
    /// Region of the virtual dataset being filled.
    pub dst_selection: Selection,
}

impl fmt::Display for SourceMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_file, self.source_dataset)
    }
}

/// How a dataset's elements are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Elements stored as one run.
    Contiguous,
    /// Elements stored in fixed-size chunks.
    Chunked { chunk: Vec<u64> },
    /// No stored elements; contents assembled from `mappings`.
    Virtual { mappings: Vec<SourceMapping> },
}

impl Layout {
    pub const fn is_virtual(&self) -> bool {
        matches!(self, Layout::Virtual { .. })
    }
}
