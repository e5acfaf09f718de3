//! vdsmv - in-place retargeting of virtual dataset source paths.
//!
//! A virtual dataset stores no elements of its own; its contents are
//! assembled from an ordered list of mappings into other, possibly
//! external, source datasets. When those source files move, the mappings
//! go stale. This crate walks a container's namespace, finds every
//! virtual dataset and substitutes a path prefix across its mapping list,
//! swapping each changed object for a rebuilt copy that keeps its link
//! name, attributes and hardlink identity.

pub mod cli;
pub mod container;
pub mod logger;
pub mod rewrite;
