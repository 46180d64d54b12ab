//! Identifier and reference integrity checks over a [`StageState`].

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::collection::EntityCollection;
use super::entities::Entity;
use super::ids::EntityId;
use super::store::StageState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("{collection}: id {id} appears more than once in allIds")]
    DuplicateId { collection: &'static str, id: EntityId },
    #[error("{collection}: id {id} is listed in allIds but has no entity")]
    MissingEntity { collection: &'static str, id: EntityId },
    #[error("{collection}: entity {id} is stored but not listed in allIds")]
    UnlistedEntity { collection: &'static str, id: EntityId },
    #[error("{collection}: entity stored under {key} carries id {id}")]
    KeyMismatch {
        collection: &'static str,
        key: EntityId,
        id: EntityId,
    },
    #[error("panel {panel_id} references missing {kind} {id}")]
    DanglingReference {
        panel_id: EntityId,
        kind: &'static str,
        id: EntityId,
    },
    #[error("{kind} {id} is referenced by panels {first} and {second}")]
    SharedOwnership {
        kind: &'static str,
        id: EntityId,
        first: EntityId,
        second: EntityId,
    },
    #[error("selection points at missing {kind} {id}")]
    DanglingSelection { kind: &'static str, id: EntityId },
    #[error("selected {kind} {id} is not owned by panel {panel_id}")]
    SelectionOwnerMismatch {
        kind: &'static str,
        id: EntityId,
        panel_id: EntityId,
    },
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid state json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("inconsistent state: {0}")]
    Integrity(#[from] IntegrityError),
}

fn check_collection<T: Entity>(
    name: &'static str,
    collection: &EntityCollection<T>,
) -> Result<(), IntegrityError> {
    let mut listed = HashSet::with_capacity(collection.all_ids.len());
    for id in &collection.all_ids {
        if !listed.insert(id) {
            return Err(IntegrityError::DuplicateId {
                collection: name,
                id: id.clone(),
            });
        }
        if !collection.by_id.contains_key(id) {
            return Err(IntegrityError::MissingEntity {
                collection: name,
                id: id.clone(),
            });
        }
    }
    for (key, entity) in &collection.by_id {
        if !listed.contains(key) {
            return Err(IntegrityError::UnlistedEntity {
                collection: name,
                id: key.clone(),
            });
        }
        if entity.id() != key {
            return Err(IntegrityError::KeyMismatch {
                collection: name,
                key: key.clone(),
                id: entity.id().clone(),
            });
        }
    }
    Ok(())
}

/// Every reference must resolve, and no child may belong to two panels.
fn check_references<'a, T>(
    kind: &'static str,
    children: &EntityCollection<T>,
    references: impl Iterator<Item = (&'a EntityId, &'a [EntityId])>,
) -> Result<(), IntegrityError> {
    let mut owners: HashMap<&EntityId, &EntityId> = HashMap::new();
    for (panel_id, ids) in references {
        for id in ids {
            if !children.contains(id) {
                return Err(IntegrityError::DanglingReference {
                    panel_id: panel_id.clone(),
                    kind,
                    id: id.clone(),
                });
            }
            if let Some(first) = owners.insert(id, panel_id) {
                return Err(IntegrityError::SharedOwnership {
                    kind,
                    id: id.clone(),
                    first: first.clone(),
                    second: panel_id.clone(),
                });
            }
        }
    }
    Ok(())
}

impl StageState {
    /// Verifies every invariant the store operations maintain. Useful after
    /// [`Store::set_state`](super::Store::set_state) or when loading a snapshot.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        check_collection("panels", &self.panels)?;
        check_collection("dancers", &self.dancers)?;
        check_collection("shapes", &self.shapes)?;

        check_references(
            "dancer",
            &self.dancers,
            self.panels.iter().map(|p| (&p.id, p.dancers.as_slice())),
        )?;
        check_references(
            "shape",
            &self.shapes,
            self.panels.iter().map(|p| (&p.id, p.shapes.as_slice())),
        )?;

        self.check_selection()
    }

    fn check_selection(&self) -> Result<(), IntegrityError> {
        let selection = &self.selection;
        if let Some(panel_id) = &selection.selected_panel_id {
            if !self.panels.contains(panel_id) {
                return Err(IntegrityError::DanglingSelection {
                    kind: "panel",
                    id: panel_id.clone(),
                });
            }
        }
        if let Some(selected) = &selection.selected_dancer {
            if !self.dancers.contains(&selected.dancer_id) {
                return Err(IntegrityError::DanglingSelection {
                    kind: "dancer",
                    id: selected.dancer_id.clone(),
                });
            }
            let owned = self
                .panels
                .get(&selected.panel_id)
                .is_some_and(|panel| panel.owns_dancer(&selected.dancer_id));
            if !owned {
                return Err(IntegrityError::SelectionOwnerMismatch {
                    kind: "dancer",
                    id: selected.dancer_id.clone(),
                    panel_id: selected.panel_id.clone(),
                });
            }
        }
        if let Some(selected) = &selection.selected_shape {
            if !self.shapes.contains(&selected.shape_id) {
                return Err(IntegrityError::DanglingSelection {
                    kind: "shape",
                    id: selected.shape_id.clone(),
                });
            }
            let owned = self
                .panels
                .get(&selected.panel_id)
                .is_some_and(|panel| panel.owns_shape(&selected.shape_id));
            if !owned {
                return Err(IntegrityError::SelectionOwnerMismatch {
                    kind: "shape",
                    id: selected.shape_id.clone(),
                    panel_id: selected.panel_id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage_editor::entities::{Dancer, Panel};
    use crate::stage_editor::store::DancerSelection;

    #[test]
    fn seed_is_consistent() {
        assert_eq!(StageState::seed().check_integrity(), Ok(()));
    }

    #[test]
    fn detects_duplicate_order_entry() {
        let mut state = StageState::seed();
        let id = state.dancers.all_ids[0].clone();
        state.dancers.all_ids.push(id.clone());
        assert_eq!(
            state.check_integrity(),
            Err(IntegrityError::DuplicateId {
                collection: "dancers",
                id
            })
        );
    }

    #[test]
    fn detects_unlisted_entity() {
        let mut state = StageState::seed();
        state
            .dancers
            .by_id
            .insert("stray".into(), Dancer::new("stray".into(), 0.0, 0.0));
        assert!(matches!(
            state.check_integrity(),
            Err(IntegrityError::UnlistedEntity { .. })
        ));
    }

    #[test]
    fn detects_key_mismatch() {
        let mut state = StageState::seed();
        let key = state.dancers.all_ids[0].clone();
        if let Some(dancer) = state.dancers.by_id.get_mut(&key) {
            dancer.id = "renamed".into();
        }
        assert!(matches!(
            state.check_integrity(),
            Err(IntegrityError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn detects_dangling_reference() {
        let mut state = StageState::seed();
        state.panels.insert_entities([Panel::new(
            "broken".into(),
            vec!["ghost".into()],
            Vec::new(),
        )]);
        assert_eq!(
            state.check_integrity(),
            Err(IntegrityError::DanglingReference {
                panel_id: "broken".into(),
                kind: "dancer",
                id: "ghost".into(),
            })
        );
    }

    #[test]
    fn detects_shared_children() {
        let mut state = StageState::seed();
        let shapes = state.shapes.all_ids.clone();
        state
            .panels
            .insert_entities([Panel::new("thief".into(), Vec::new(), shapes)]);
        assert!(matches!(
            state.check_integrity(),
            Err(IntegrityError::SharedOwnership { kind: "shape", .. })
        ));
    }

    #[test]
    fn detects_stale_selection() {
        let mut state = StageState::seed();
        state.selection.selected_panel_id = Some("gone".into());
        assert!(matches!(
            state.check_integrity(),
            Err(IntegrityError::DanglingSelection { kind: "panel", .. })
        ));

        let mut state = StageState::seed();
        let dancer_id = state.dancers.all_ids[0].clone();
        state.selection.selected_dancer = Some(DancerSelection {
            dancer_id,
            panel_id: "elsewhere".into(),
        });
        assert!(matches!(
            state.check_integrity(),
            Err(IntegrityError::SelectionOwnerMismatch { kind: "dancer", .. })
        ));
    }

    #[test]
    fn state_error_wraps_integrity() {
        let err: StateError = IntegrityError::DanglingSelection {
            kind: "panel",
            id: "p".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "inconsistent state: selection points at missing panel p"
        );
    }
}
