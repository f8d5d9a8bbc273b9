//! The catalog interface.
//!
//! The evaluator only needs to look up and create resource nodes keyed by
//! type and title. [`Catalog`] is that narrow seam; [`MemoryCatalog`] is the
//! in-memory implementation used by the driver and tests.

use std::fmt;

use mar_ir::Location;
use mar_types::Value;
use rustc_hash::FxHashMap;

/// Identity of a resource: its type and title.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResourceKey {
    pub type_name: String,
    pub title: String,
}

impl ResourceKey {
    /// Type names are case-insensitive and stored lower-cased.
    pub fn new(type_name: impl Into<String>, title: impl Into<String>) -> Self {
        ResourceKey {
            type_name: type_name.into().to_lowercase(),
            title: title.into(),
        }
    }

    /// Key of a class; `title` must already be normalised.
    pub fn class(title: impl Into<String>) -> Self {
        ResourceKey::new("class", title)
    }

    pub fn is_class(&self) -> bool {
        self.type_name == "class"
    }
}

/// Capitalise every `::`-separated segment: `foo::bar` becomes `Foo::Bar`.
pub(crate) fn capitalize_segments(name: &str) -> String {
    name.split("::")
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("::")
}

/// Reference form, e.g. `File[/etc/motd]` or `Class[Foo::Bar]`.
impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = capitalize_segments(&self.type_name);
        if self.is_class() {
            write!(f, "{type_name}[{}]", capitalize_segments(&self.title))
        } else {
            write!(f, "{type_name}[{}]", self.title)
        }
    }
}

/// Handle to a resource inside one catalog.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResourceId(u32);

impl ResourceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A resource node.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub key: ResourceKey,
    /// Where the resource was declared.
    pub location: Location,
    /// Declared with `@@`.
    pub exported: bool,
    /// Attributes, in declaration order.
    pub parameters: Vec<(String, Value)>,
}

impl Resource {
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

/// The resource graph being built.
pub trait Catalog {
    fn find_resource(&self, key: &ResourceKey) -> Option<ResourceId>;

    /// Create a resource node. Returns `None` when `key` already exists.
    fn add_resource(
        &mut self,
        key: ResourceKey,
        location: Location,
        exported: bool,
    ) -> Option<ResourceId>;

    fn resource(&self, id: ResourceId) -> Option<&Resource>;

    /// Set or replace an attribute. Returns `false` for an unknown id.
    fn set_parameter(&mut self, id: ResourceId, name: &str, value: Value) -> bool;
}

/// In-memory catalog preserving declaration order.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    resources: Vec<Resource>,
    index: FxHashMap<ResourceKey, ResourceId>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        MemoryCatalog::default()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&Resource> {
        self.find_resource(key).and_then(|id| self.resource(id))
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.index.contains_key(key)
    }
}

impl Catalog for MemoryCatalog {
    fn find_resource(&self, key: &ResourceKey) -> Option<ResourceId> {
        self.index.get(key).copied()
    }

    fn add_resource(
        &mut self,
        key: ResourceKey,
        location: Location,
        exported: bool,
    ) -> Option<ResourceId> {
        if self.index.contains_key(&key) {
            return None;
        }
        let id = ResourceId(u32::try_from(self.resources.len()).ok()?);
        self.index.insert(key.clone(), id);
        self.resources.push(Resource {
            key,
            location,
            exported,
            parameters: Vec::new(),
        });
        Some(id)
    }

    fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id.index())
    }

    fn set_parameter(&mut self, id: ResourceId, name: &str, value: Value) -> bool {
        let Some(resource) = self.resources.get_mut(id.index()) else {
            return false;
        };
        match resource.parameters.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => resource.parameters.push((name.to_string(), value)),
        }
        true
    }
}
