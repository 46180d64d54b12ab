//! Normalized `{ byId, allIds }` collections and the primitives that transform them.
//!
//! The primitives know nothing about panels, dancers or shapes. The store builds
//! its cascading operations out of them.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::entities::Entity;
use super::ids::{EntityId, IdGenerator};

/// Keyed lookup plus the authoritative display order.
///
/// `all_ids` holds no duplicates and names exactly the keys of `by_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCollection<T> {
    pub by_id: HashMap<EntityId, T>,
    pub all_ids: Vec<EntityId>,
}

impl<T> Default for EntityCollection<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            all_ids: Vec::new(),
        }
    }
}

impl<T> EntityCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.by_id.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &EntityId) -> Option<&mut T> {
        self.by_id.get_mut(id)
    }

    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.all_ids.iter().position(|candidate| candidate == id)
    }

    /// Entities in `all_ids` order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.all_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Drops every listed id. Unknown ids are ignored. Returns how many entities
    /// were actually removed.
    pub fn remove_ids<'a>(&mut self, ids: impl IntoIterator<Item = &'a EntityId>) -> usize {
        let doomed: HashSet<&EntityId> = ids.into_iter().collect();
        if doomed.is_empty() {
            return 0;
        }
        let mut removed = 0;
        for id in &doomed {
            if self.by_id.remove(*id).is_some() {
                removed += 1;
            }
        }
        self.all_ids.retain(|id| !doomed.contains(id));
        removed
    }
}

impl<T: Entity> EntityCollection<T> {
    pub fn from_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let mut collection = Self::new();
        collection.insert_entities(entities);
        collection
    }

    /// Inserts each entity under its own id and appends new ids in input order.
    ///
    /// An id that is already present keeps its position; its value is replaced.
    pub fn insert_entities(&mut self, entities: impl IntoIterator<Item = T>) {
        for entity in entities {
            let id = entity.id().clone();
            if self.by_id.insert(id.clone(), entity).is_none() {
                self.all_ids.push(id);
            }
        }
    }
}

/// Snapshot form of [`EntityCollection::insert_entities`].
pub fn add_entities<T: Entity>(
    collection: &EntityCollection<T>,
    new_entities: impl IntoIterator<Item = T>,
) -> EntityCollection<T> {
    let mut next = collection.clone();
    next.insert_entities(new_entities);
    next
}

/// Snapshot form of [`EntityCollection::remove_ids`].
pub fn remove_entities<T: Clone>(
    collection: &EntityCollection<T>,
    ids_to_remove: &[EntityId],
) -> EntityCollection<T> {
    let mut next = collection.clone();
    next.remove_ids(ids_to_remove);
    next
}

/// Result of [`clone_entities`]: the copies in source order and the old→new id map.
#[derive(Clone, Debug, PartialEq)]
pub struct ClonedEntities<T> {
    pub clones: Vec<T>,
    pub id_map: HashMap<EntityId, EntityId>,
}

impl<T> ClonedEntities<T> {
    /// Maps `ids` through `id_map`, keeping order. Ids that were not cloned are dropped.
    pub fn translate(&self, ids: &[EntityId]) -> Vec<EntityId> {
        ids.iter()
            .filter_map(|id| self.id_map.get(id).cloned())
            .collect()
    }
}

/// Copies every entity named in `source_ids` under a fresh id.
///
/// Ids missing from `by_id` are skipped. A repeated source id is cloned once, at
/// its first occurrence.
pub fn clone_entities<T, G>(
    by_id: &HashMap<EntityId, T>,
    source_ids: &[EntityId],
    ids: &mut G,
) -> ClonedEntities<T>
where
    T: Entity,
    G: IdGenerator + ?Sized,
{
    let mut clones = Vec::with_capacity(source_ids.len());
    let mut id_map = HashMap::with_capacity(source_ids.len());

    for source_id in source_ids {
        if id_map.contains_key(source_id) {
            continue;
        }
        let Some(source) = by_id.get(source_id) else {
            continue;
        };
        let fresh = ids.next_id();
        clones.push(source.rekeyed(fresh.clone()));
        id_map.insert(source_id.clone(), fresh);
    }

    ClonedEntities { clones, id_map }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage_editor::entities::Dancer;
    use crate::stage_editor::ids::SequentialIds;

    fn dancer(id: &str, x: f64) -> Dancer {
        Dancer::new(id.into(), x, 0.0)
    }

    fn ids(raw: &[&str]) -> Vec<EntityId> {
        raw.iter().map(|id| EntityId::from(*id)).collect()
    }

    #[test]
    fn add_appends_in_input_order() {
        let base = EntityCollection::from_entities([dancer("a", 1.0)]);
        let next = add_entities(&base, [dancer("c", 3.0), dancer("b", 2.0)]);

        assert_eq!(next.all_ids, ids(&["a", "c", "b"]));
        assert_eq!(next.get(&"b".into()).map(|d| d.x), Some(2.0));
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn add_with_existing_id_overwrites_in_place() {
        let base = EntityCollection::from_entities([dancer("a", 1.0), dancer("b", 2.0)]);
        let next = add_entities(&base, [dancer("a", 9.0)]);

        assert_eq!(next.all_ids, ids(&["a", "b"]));
        assert_eq!(next.get(&"a".into()).map(|d| d.x), Some(9.0));
    }

    #[test]
    fn remove_ignores_unknown_ids() {
        let base = EntityCollection::from_entities([dancer("a", 1.0), dancer("b", 2.0)]);
        let next = remove_entities(&base, &ids(&["b", "zzz"]));

        assert_eq!(next.all_ids, ids(&["a"]));
        assert!(!next.contains(&"b".into()));
        assert_eq!(next.by_id.len(), 1);
    }

    #[test]
    fn remove_clears_dangling_order_entries() {
        let mut collection = EntityCollection::from_entities([dancer("a", 1.0)]);
        collection.all_ids.push("ghost".into());

        let removed = collection.remove_ids(&ids(&["ghost"]));
        assert_eq!(removed, 0);
        assert_eq!(collection.all_ids, ids(&["a"]));
    }

    #[test]
    fn clone_rekeys_in_source_order() {
        let base = EntityCollection::from_entities([dancer("a", 1.0), dancer("b", 2.0)]);
        let mut id_gen = SequentialIds::new("copy");
        let cloned = clone_entities(&base.by_id, &ids(&["b", "a"]), &mut id_gen);

        let clone_ids: Vec<_> = cloned.clones.iter().map(|d| d.id.clone()).collect();
        assert_eq!(clone_ids, ids(&["copy-1", "copy-2"]));
        assert_eq!(cloned.clones[0].x, 2.0);
        assert_eq!(cloned.id_map.get(&"a".into()), Some(&"copy-2".into()));
        assert_eq!(cloned.translate(&ids(&["a", "b"])), ids(&["copy-2", "copy-1"]));
    }

    #[test]
    fn clone_skips_missing_and_repeated_sources() {
        let base = EntityCollection::from_entities([dancer("a", 1.0)]);
        let mut id_gen = SequentialIds::new("copy");
        let cloned = clone_entities(&base.by_id, &ids(&["a", "missing", "a"]), &mut id_gen);

        assert_eq!(cloned.clones.len(), 1);
        assert_eq!(cloned.id_map.len(), 1);
        assert_eq!(cloned.translate(&ids(&["missing", "a"])), ids(&["copy-1"]));
    }

    #[test]
    fn clones_are_independent_of_sources() {
        let base = EntityCollection::from_entities([dancer("a", 1.0)]);
        let mut id_gen = SequentialIds::new("copy");
        let mut cloned = clone_entities(&base.by_id, &ids(&["a"]), &mut id_gen);
        cloned.clones[0].x = 999.0;

        assert_eq!(base.get(&"a".into()).map(|d| d.x), Some(1.0));
    }

    #[test]
    fn iter_follows_display_order() {
        let mut collection = EntityCollection::from_entities([dancer("a", 1.0), dancer("b", 2.0)]);
        collection.all_ids.reverse();
        let xs: Vec<f64> = collection.iter().map(|d| d.x).collect();
        assert_eq!(xs, vec![2.0, 1.0]);
    }
}
