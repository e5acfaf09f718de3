//! Minimal hierarchical binary container.
//!
//! A container is a namespace of groups and leaf objects (datasets, named
//! types) addressed by stable physical addresses, with named hardlinks
//! from groups to objects. The whole store is loaded at open, mutated in
//! memory and written back in place on [`Container::save`].
//!
//! This module only exposes the primitives the rewrite engine consumes:
//! child enumeration, object inspection, attribute access and link
//! create/delete/rename. General container editing is out of scope.

pub mod error;
pub mod layout;
pub mod object;

pub use error::{ContainerError, ContainerResult};
pub use layout::{Layout, Selection, SourceMapping};
pub use object::{Address, AttrValue, Attribute, Dataspace, Datatype, Link, ObjectKind};

use object::Object;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File magic: "VDSC" + format revision 1.
const MAGIC: [u8; 8] = *b"VDSC\x01\0\0\0";

/// Address of the root group in every container.
const ROOT: Address = Address(1);

/// Serialized portion of a container.
#[derive(Debug, Serialize, Deserialize)]
struct Store {
    next_addr: u64,
    root: Address,
    objects: BTreeMap<Address, Object>,
}

/// An open container, bound to the file it was loaded from.
#[derive(Debug)]
pub struct Container {
    path: PathBuf,
    store: Store,
}

impl Container {
    /// Create an empty container (root group only). Nothing touches the
    /// filesystem until [`Container::save`].
    pub fn create(path: impl Into<PathBuf>) -> Self {
        let mut objects = BTreeMap::new();
        objects.insert(ROOT, Object::empty_group());
        Self {
            path: path.into(),
            store: Store {
                next_addr: ROOT.0 + 1,
                root: ROOT,
                objects,
            },
        }
    }

    /// Load a container from disk.
    pub fn open(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).map_err(|e| ContainerError::Io(path.to_path_buf(), e))?;
        if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
            return Err(ContainerError::BadMagic(path.to_path_buf()));
        }
        let store: Store =
            bincode::deserialize(&bytes[MAGIC.len()..]).map_err(ContainerError::Decode)?;
        if !matches!(store.objects.get(&store.root), Some(Object::Group { .. })) {
            return Err(ContainerError::MissingRoot(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            store,
        })
    }

    /// Write the container back to its file, dropping objects no longer
    /// reachable from the root first.
    pub fn save(&mut self) -> ContainerResult<()> {
        self.sweep();
        let body = bincode::serialize(&self.store).map_err(ContainerError::Encode)?;
        let mut bytes = Vec::with_capacity(MAGIC.len() + body.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&body);
        fs::write(&self.path, bytes).map_err(|e| ContainerError::Io(self.path.clone(), e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> Address {
        self.store.root
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    fn object(&self, addr: Address) -> ContainerResult<&Object> {
        self.store
            .objects
            .get(&addr)
            .ok_or(ContainerError::NoSuchObject(addr))
    }

    fn object_mut(&mut self, addr: Address) -> ContainerResult<&mut Object> {
        self.store
            .objects
            .get_mut(&addr)
            .ok_or(ContainerError::NoSuchObject(addr))
    }

    fn group_links(&self, addr: Address) -> ContainerResult<&Vec<Link>> {
        match self.object(addr)? {
            Object::Group { links, .. } => Ok(links),
            _ => Err(ContainerError::NotAGroup(addr)),
        }
    }

    fn group_links_mut(&mut self, addr: Address) -> ContainerResult<&mut Vec<Link>> {
        match self.object_mut(addr)? {
            Object::Group { links, .. } => Ok(links),
            _ => Err(ContainerError::NotAGroup(addr)),
        }
    }

    /// Snapshot of a group's links, in native (insertion) order.
    pub fn links(&self, group: Address) -> ContainerResult<Vec<Link>> {
        Ok(self.group_links(group)?.clone())
    }

    pub fn object_kind(&self, addr: Address) -> ContainerResult<ObjectKind> {
        Ok(self.object(addr)?.kind())
    }

    pub fn link_target(&self, group: Address, name: &str) -> ContainerResult<Address> {
        self.group_links(group)?
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.target)
            .ok_or_else(|| ContainerError::NoSuchLink {
                group,
                name: name.to_owned(),
            })
    }

    pub fn link_exists(&self, group: Address, name: &str) -> bool {
        self.group_links(group)
            .map(|links| links.iter().any(|l| l.name == name))
            .unwrap_or(false)
    }

    /// Storage layout of a dataset.
    pub fn layout(&self, addr: Address) -> ContainerResult<&Layout> {
        match self.object(addr)? {
            Object::Dataset { layout, .. } => Ok(layout),
            _ => Err(ContainerError::NotADataset(addr)),
        }
    }

    /// Element type and shape of a dataset.
    pub fn dataset_meta(&self, addr: Address) -> ContainerResult<(Datatype, Dataspace)> {
        match self.object(addr)? {
            Object::Dataset { dtype, space, .. } => Ok((*dtype, space.clone())),
            _ => Err(ContainerError::NotADataset(addr)),
        }
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attr_names(&self, addr: Address) -> ContainerResult<Vec<String>> {
        Ok(self
            .object(addr)?
            .attrs()
            .iter()
            .map(|a| a.name.clone())
            .collect())
    }

    pub fn attr(&self, addr: Address, name: &str) -> ContainerResult<AttrValue> {
        self.object(addr)?
            .attrs()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.clone())
            .ok_or_else(|| ContainerError::NoSuchAttribute {
                addr,
                name: name.to_owned(),
            })
    }

    /// Set an attribute, replacing any existing value under the same name.
    pub fn set_attr(
        &mut self,
        addr: Address,
        name: &str,
        value: AttrValue,
    ) -> ContainerResult<()> {
        let attrs = self.object_mut(addr)?.attrs_mut();
        match attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => attrs.push(Attribute {
                name: name.to_owned(),
                value,
            }),
        }
        Ok(())
    }

    // ========================================================================
    // Object and link creation
    // ========================================================================

    fn alloc(&mut self) -> Address {
        let addr = Address(self.store.next_addr);
        self.store.next_addr += 1;
        addr
    }

    fn insert_under(
        &mut self,
        group: Address,
        name: &str,
        object: Object,
    ) -> ContainerResult<Address> {
        if self.link_exists(group, name) {
            return Err(ContainerError::LinkExists {
                group,
                name: name.to_owned(),
            });
        }
        // Validates `group` before allocating.
        self.group_links(group)?;
        let addr = self.alloc();
        self.store.objects.insert(addr, object);
        self.group_links_mut(group)?.push(Link {
            name: name.to_owned(),
            target: addr,
        });
        Ok(addr)
    }

    pub fn create_group(&mut self, parent: Address, name: &str) -> ContainerResult<Address> {
        self.insert_under(parent, name, Object::empty_group())
    }

    pub fn create_dataset(
        &mut self,
        group: Address,
        name: &str,
        dtype: Datatype,
        space: Dataspace,
        layout: Layout,
    ) -> ContainerResult<Address> {
        self.insert_under(
            group,
            name,
            Object::Dataset {
                dtype,
                space,
                layout,
                attrs: Vec::new(),
            },
        )
    }

    pub fn create_named_type(
        &mut self,
        group: Address,
        name: &str,
        dtype: Datatype,
    ) -> ContainerResult<Address> {
        self.insert_under(
            group,
            name,
            Object::NamedType {
                dtype,
                attrs: Vec::new(),
            },
        )
    }

    /// Create a hardlink to an existing object.
    pub fn create_link(
        &mut self,
        group: Address,
        name: &str,
        target: Address,
    ) -> ContainerResult<()> {
        self.object(target)?;
        if self.link_exists(group, name) {
            return Err(ContainerError::LinkExists {
                group,
                name: name.to_owned(),
            });
        }
        self.group_links_mut(group)?.push(Link {
            name: name.to_owned(),
            target,
        });
        Ok(())
    }

    /// Remove a link. The target object stays in the store until an
    /// unreachable-object sweep at save time.
    pub fn delete_link(&mut self, group: Address, name: &str) -> ContainerResult<()> {
        let links = self.group_links_mut(group)?;
        match links.iter().position(|l| l.name == name) {
            Some(idx) => {
                links.remove(idx);
                Ok(())
            }
            None => Err(ContainerError::NoSuchLink {
                group,
                name: name.to_owned(),
            }),
        }
    }

    /// Rename a link in place, keeping its position in the enumeration
    /// order. Fails if `to` is already taken.
    pub fn rename_link(&mut self, group: Address, from: &str, to: &str) -> ContainerResult<()> {
        if self.link_exists(group, to) {
            return Err(ContainerError::LinkExists {
                group,
                name: to.to_owned(),
            });
        }
        let links = self.group_links_mut(group)?;
        match links.iter_mut().find(|l| l.name == from) {
            Some(link) => {
                link.name = to.to_owned();
                Ok(())
            }
            None => Err(ContainerError::NoSuchLink {
                group,
                name: from.to_owned(),
            }),
        }
    }

    /// Drop objects not reachable from the root. Cycle-safe.
    fn sweep(&mut self) {
        let mut live = FxHashSet::default();
        let mut stack = vec![self.store.root];
        while let Some(addr) = stack.pop() {
            if !live.insert(addr) {
                continue;
            }
            if let Some(Object::Group { links, .. }) = self.store.objects.get(&addr) {
                stack.extend(links.iter().map(|l| l.target));
            }
        }
        self.store.objects.retain(|addr, _| live.contains(addr));
    }

    /// Number of live objects (after links were deleted, until the next
    /// save the count still includes unreachable objects).
    pub fn object_count(&self) -> usize {
        self.store.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch() -> Container {
        Container::create("unused.vdsc")
    }

    #[test]
    fn links_enumerate_in_insertion_order() {
        let mut c = scratch();
        let root = c.root();
        c.create_group(root, "zzz").unwrap();
        c.create_group(root, "aaa").unwrap();
        c.create_group(root, "mmm").unwrap();
        let names: Vec<_> = c.links(root).unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, ["zzz", "aaa", "mmm"]);
    }

    #[test]
    fn hardlinks_share_one_address() {
        let mut c = scratch();
        let root = c.root();
        let ds = c
            .create_dataset(
                root,
                "a",
                Datatype::Float64,
                Dataspace::new([4]),
                Layout::Contiguous,
            )
            .unwrap();
        c.create_link(root, "b", ds).unwrap();
        assert_eq!(c.link_target(root, "a").unwrap(), ds);
        assert_eq!(c.link_target(root, "b").unwrap(), ds);
    }

    #[test]
    fn duplicate_link_name_rejected() {
        let mut c = scratch();
        let root = c.root();
        c.create_group(root, "g").unwrap();
        assert!(matches!(
            c.create_group(root, "g"),
            Err(ContainerError::LinkExists { .. })
        ));
    }

    #[test]
    fn rename_keeps_position_and_rejects_collision() {
        let mut c = scratch();
        let root = c.root();
        c.create_group(root, "first").unwrap();
        c.create_group(root, "second").unwrap();
        c.rename_link(root, "first", "renamed").unwrap();
        let names: Vec<_> = c.links(root).unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, ["renamed", "second"]);
        assert!(matches!(
            c.rename_link(root, "renamed", "second"),
            Err(ContainerError::LinkExists { .. })
        ));
    }

    #[test]
    fn attributes_set_get_replace() {
        let mut c = scratch();
        let root = c.root();
        let ds = c
            .create_dataset(
                root,
                "d",
                Datatype::Int32,
                Dataspace::new([2, 2]),
                Layout::Contiguous,
            )
            .unwrap();
        c.set_attr(ds, "units", AttrValue::Text("mm".into())).unwrap();
        c.set_attr(ds, "scale", AttrValue::Float(0.5)).unwrap();
        c.set_attr(ds, "units", AttrValue::Text("um".into())).unwrap();
        assert_eq!(c.attr_names(ds).unwrap(), ["units", "scale"]);
        assert_eq!(c.attr(ds, "units").unwrap(), AttrValue::Text("um".into()));
        assert!(matches!(
            c.attr(ds, "missing"),
            Err(ContainerError::NoSuchAttribute { .. })
        ));
    }

    #[test]
    fn save_open_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.vdsc");
        let mut c = Container::create(&path);
        let root = c.root();
        let g = c.create_group(root, "g1").unwrap();
        c.create_dataset(
            g,
            "vds",
            Datatype::UInt16,
            Dataspace::new([8]),
            Layout::Virtual {
                mappings: vec![SourceMapping {
                    source_file: "/data/a.vdsc".into(),
                    source_dataset: "ds".into(),
                    src_selection: Selection::All,
                    dst_selection: Selection::All,
                }],
            },
        )
        .unwrap();
        c.save().unwrap();

        let reopened = Container::open(&path).unwrap();
        let g = reopened.link_target(reopened.root(), "g1").unwrap();
        let vds = reopened.link_target(g, "vds").unwrap();
        assert!(reopened.layout(vds).unwrap().is_virtual());
        assert_eq!(
            reopened.dataset_meta(vds).unwrap(),
            (Datatype::UInt16, Dataspace::new([8]))
        );
    }

    #[test]
    fn open_rejects_foreign_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not-a-container");
        std::fs::write(&path, b"definitely not a container").unwrap();
        assert!(matches!(
            Container::open(&path),
            Err(ContainerError::BadMagic(_))
        ));
    }

    #[test]
    fn sweep_drops_unlinked_objects_but_keeps_linked_ones() {
        let mut c = scratch();
        let root = c.root();
        let keep = c
            .create_dataset(
                root,
                "keep",
                Datatype::Int8,
                Dataspace::new([1]),
                Layout::Contiguous,
            )
            .unwrap();
        c.create_dataset(
            root,
            "drop",
            Datatype::Int8,
            Dataspace::new([1]),
            Layout::Contiguous,
        )
        .unwrap();
        c.delete_link(root, "drop").unwrap();
        assert_eq!(c.object_count(), 3);
        c.sweep();
        assert_eq!(c.object_count(), 2);
        assert_eq!(c.object_kind(keep).unwrap(), ObjectKind::Dataset);
    }

    #[test]
    fn sweep_terminates_on_group_cycles() {
        let mut c = scratch();
        let root = c.root();
        let g = c.create_group(root, "g").unwrap();
        c.create_link(g, "back-to-root", root).unwrap();
        c.sweep();
        assert_eq!(c.object_count(), 2);
    }
}
