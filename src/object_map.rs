//! # Object maps
//!
//! Later fillers resolve references across collections, so every filler records which
//! input object produced which output record. Three layers:
//!
//! - [`ObjectMap<S, D>`]: links source identities `S` (e.g.
//!   [`ElectronId`](crate::event::ElectronId)) to output slots `D` (e.g.
//!   [`ElectronSlot`](crate::output::ElectronSlot)), with forward and backward views.
//! - [`ObjectMapSet`]: all maps published by one filler, keyed by the `(S, D)` type pair.
//! - [`ObjectMapStore`]: one [`ObjectMapSet`] per filler name. The pipeline owns it,
//!   clears it before each event, hands each filler its own set during the fill pass and
//!   the whole store, read-only, during the reference-resolution pass.
//!
//! ```text
//! ObjectMapStore
//! ├── "electrons"      ObjectMapSet { (ElectronId, ElectronSlot), (SuperClusterId, ElectronSlot) }
//! └── "superClusters"  ObjectMapSet { (SuperClusterId, SuperClusterSlot) }
//! ```
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    hash::Hash,
};

use ahash::RandomState;

use crate::fill_errors::FillError;

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

/// Bidirectional map between source identities and output slots.
///
/// `backward` holds one entry per published slot. Several slots may share a source (two
/// electrons built from one super cluster); `forward` then keeps the last slot added.
/// When sources are unique the map is a bijection.
#[derive(Debug, Clone)]
pub struct ObjectMap<S, D>
where
    S: Eq + Hash + Copy,
    D: Eq + Hash + Copy,
{
    forward: FastHashMap<S, D>,
    backward: FastHashMap<D, S>,
}

impl<S, D> Default for ObjectMap<S, D>
where
    S: Eq + Hash + Copy,
    D: Eq + Hash + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, D> ObjectMap<S, D>
where
    S: Eq + Hash + Copy,
    D: Eq + Hash + Copy,
{
    pub fn new() -> Self {
        Self {
            forward: FastHashMap::default(),
            backward: FastHashMap::default(),
        }
    }

    /// Record that `source` produced `dest`, in both directions.
    pub fn add(&mut self, source: S, dest: D) {
        self.forward.insert(source, dest);
        self.backward.insert(dest, source);
    }

    /// Source identity → output slot.
    pub fn fwd(&self) -> &FastHashMap<S, D> {
        &self.forward
    }

    /// Output slot → source identity.
    pub fn bwd(&self) -> &FastHashMap<D, S> {
        &self.backward
    }

    pub fn get_by_source(&self, source: &S) -> Option<&D> {
        self.forward.get(source)
    }

    pub fn get_by_dest(&self, dest: &D) -> Option<&S> {
        self.backward.get(dest)
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }

    /// Number of published slots.
    pub fn len(&self) -> usize {
        self.backward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

trait AnyObjectMap: Any {
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S, D> AnyObjectMap for ObjectMap<S, D>
where
    S: Eq + Hash + Copy + 'static,
    D: Eq + Hash + Copy + 'static,
{
    fn clear(&mut self) {
        ObjectMap::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The object maps published by one filler, one per `(source, destination)` type pair.
#[derive(Default)]
pub struct ObjectMapSet {
    maps: FastHashMap<(TypeId, TypeId), Box<dyn AnyObjectMap>>,
}

impl std::fmt::Debug for ObjectMapSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectMapSet")
            .field("maps", &self.maps.len())
            .finish()
    }
}

impl ObjectMapSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map for the `(S, D)` pair, created empty on first access.
    pub fn get_mut<S, D>(&mut self) -> &mut ObjectMap<S, D>
    where
        S: Eq + Hash + Copy + 'static,
        D: Eq + Hash + Copy + 'static,
    {
        self.maps
            .entry((TypeId::of::<S>(), TypeId::of::<D>()))
            .or_insert_with(|| Box::new(ObjectMap::<S, D>::new()))
            .as_any_mut()
            .downcast_mut::<ObjectMap<S, D>>()
            // the key is the TypeId pair of the stored map
            .unwrap_or_else(|| unreachable!())
    }

    /// Map for the `(S, D)` pair, if this filler ever published one.
    pub fn get<S, D>(&self) -> Option<&ObjectMap<S, D>>
    where
        S: Eq + Hash + Copy + 'static,
        D: Eq + Hash + Copy + 'static,
    {
        self.maps
            .get(&(TypeId::of::<S>(), TypeId::of::<D>()))
            .and_then(|m| m.as_any().downcast_ref::<ObjectMap<S, D>>())
    }

    /// Empty every map, keeping them registered.
    pub fn clear(&mut self) {
        for map in self.maps.values_mut() {
            map.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// Object maps of every filler, keyed by filler name. Scoped to one event.
#[derive(Debug, Default)]
pub struct ObjectMapStore {
    sets: FastHashMap<String, ObjectMapSet>,
}

impl ObjectMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set owned by filler `name`, created on first access.
    pub fn entry(&mut self, name: &str) -> &mut ObjectMapSet {
        self.sets.entry(name.to_string()).or_default()
    }

    /// The set published by filler `name`.
    pub fn at(&self, name: &str) -> Result<&ObjectMapSet, FillError> {
        self.sets
            .get(name)
            .ok_or_else(|| FillError::MissingObjectMap(name.to_string()))
    }

    /// Typed map published by filler `name`.
    ///
    /// Fails with [`FillError::MissingObjectMap`] both when the filler is unknown and when
    /// it never published the `(S, D)` pair.
    pub fn map<S, D>(&self, name: &str) -> Result<&ObjectMap<S, D>, FillError>
    where
        S: Eq + Hash + Copy + 'static,
        D: Eq + Hash + Copy + 'static,
    {
        self.at(name)?.get::<S, D>().ok_or_else(|| {
            FillError::MissingObjectMap(format!(
                "{name} ({} -> {})",
                std::any::type_name::<S>(),
                std::any::type_name::<D>()
            ))
        })
    }

    /// Empty every set before a new event.
    pub fn clear(&mut self) {
        for set in self.sets.values_mut() {
            set.clear();
        }
    }
}
