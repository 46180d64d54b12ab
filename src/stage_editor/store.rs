//! The entity store: three normalized collections, the selection projection and
//! every operation allowed to change them.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use super::attributes::{strip_reserved, Attributes, DancerPatch, ShapePatch};
use super::collection::{clone_entities, EntityCollection};
use super::entities::{Dancer, Entity, Panel, Shape};
use super::ids::{EntityId, IdGenerator, UuidIds};
use super::integrity::StateError;

const SEED_PANEL_ID: &str = "panel-seed";
// None of these end in `-<digits>`, so no `SequentialIds` output can match them.
const SEED_DANCER_IDS: [&str; 2] = ["dancer-seed-a", "dancer-seed-b"];
const SEED_SHAPE_ID: &str = "shape-seed";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DancerSelection {
    pub dancer_id: EntityId,
    pub panel_id: EntityId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeSelection {
    pub shape_id: EntityId,
    pub panel_id: EntityId,
}

/// What the UI currently highlights. Never owns anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selected_panel_id: Option<EntityId>,
    pub selected_dancer: Option<DancerSelection>,
    pub selected_shape: Option<ShapeSelection>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.selected_panel_id.is_none()
            && self.selected_dancer.is_none()
            && self.selected_shape.is_none()
    }

    /// Clears every field associated with `panel_id`, whether or not the selected
    /// dancer or shape itself still exists. Returns true if anything was cleared.
    pub fn release_panel(&mut self, panel_id: &EntityId) -> bool {
        let mut released = false;
        if self.selected_panel_id.as_ref() == Some(panel_id) {
            self.selected_panel_id = None;
            released = true;
        }
        if self
            .selected_dancer
            .as_ref()
            .is_some_and(|dancer| &dancer.panel_id == panel_id)
        {
            self.selected_dancer = None;
            released = true;
        }
        if self
            .selected_shape
            .as_ref()
            .is_some_and(|shape| &shape.panel_id == panel_id)
        {
            self.selected_shape = None;
            released = true;
        }
        released
    }
}

/// One consistent snapshot of the whole store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageState {
    pub panels: EntityCollection<Panel>,
    pub dancers: EntityCollection<Dancer>,
    pub shapes: EntityCollection<Shape>,
    pub selection: Selection,
}

impl StageState {
    /// The starting configuration: one panel holding two dancers and one shape.
    ///
    /// The seed always carries the same fixed ids. Restoring it (see [`Store::reset`])
    /// is a wholesale replacement, so those ids reappear even if they were removed
    /// earlier; ids created by store operations are never handed out twice.
    pub fn seed() -> Self {
        let (panel, dancers, shape) = formation_template(
            SEED_PANEL_ID.into(),
            SEED_DANCER_IDS.map(EntityId::from),
            SEED_SHAPE_ID.into(),
        );
        Self {
            panels: EntityCollection::from_entities([panel]),
            dancers: EntityCollection::from_entities(dancers),
            shapes: EntityCollection::from_entities([shape]),
            selection: Selection::default(),
        }
    }

    /// The first panel (in display order) whose reference list names `dancer_id`.
    pub fn panel_of_dancer(&self, dancer_id: &EntityId) -> Option<&Panel> {
        self.panels.iter().find(|panel| panel.owns_dancer(dancer_id))
    }

    pub fn panel_of_shape(&self, shape_id: &EntityId) -> Option<&Panel> {
        self.panels.iter().find(|panel| panel.owns_shape(shape_id))
    }

    /// Dancers placed on `panel_id`, in the panel's order. Dangling references are skipped.
    pub fn dancers_of(&self, panel_id: &EntityId) -> Vec<&Dancer> {
        self.panels
            .get(panel_id)
            .map(|panel| {
                panel
                    .dancers
                    .iter()
                    .filter_map(|id| self.dancers.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn shapes_of(&self, panel_id: &EntityId) -> Vec<&Shape> {
        self.panels
            .get(panel_id)
            .map(|panel| {
                panel
                    .shapes
                    .iter()
                    .filter_map(|id| self.shapes.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Content every new panel starts with.
fn formation_template(
    panel_id: EntityId,
    dancer_ids: [EntityId; 2],
    shape_id: EntityId,
) -> (Panel, Vec<Dancer>, Shape) {
    let [left_id, right_id] = dancer_ids;

    let mut left = Dancer::new(left_id, 120.0, 160.0);
    left.attrs.insert("color".into(), json!("#e63946"));
    let mut right = Dancer::new(right_id, 280.0, 160.0);
    right.attrs.insert("color".into(), json!("#457b9d"));

    let mut shape = Shape::new(shape_id, 200.0, 260.0);
    shape.attrs.insert("kind".into(), json!("rect"));
    shape.attrs.insert("width".into(), json!(240.0));
    shape.attrs.insert("height".into(), json!(40.0));

    let panel = Panel::new(
        panel_id,
        vec![left.id.clone(), right.id.clone()],
        vec![shape.id.clone()],
    );
    (panel, vec![left, right], shape)
}

/// Owns the current [`StageState`] and the id source. Every method leaves the
/// state consistent; unknown ids turn an operation into a no-op.
#[derive(Debug)]
pub struct Store {
    state: StageState,
    ids: Box<dyn IdGenerator>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(UuidIds)
    }
}

impl Store {
    pub fn new(ids: impl IdGenerator + 'static) -> Self {
        Self::with_state(StageState::seed(), ids)
    }

    pub fn with_state(state: StageState, ids: impl IdGenerator + 'static) -> Self {
        Self {
            state,
            ids: Box::new(ids),
        }
    }

    pub fn state(&self) -> &StageState {
        &self.state
    }

    pub fn snapshot(&self) -> StageState {
        self.state.clone()
    }

    pub fn initial_state() -> StageState {
        StageState::seed()
    }

    /// Unchecked write access. The caller keeps the state consistent.
    pub fn set_state(&mut self, update: impl FnOnce(&mut StageState)) {
        update(&mut self.state);
    }

    /// Swaps in `state` wholesale and hands back the previous one.
    pub fn replace_state(&mut self, state: StageState) -> StageState {
        std::mem::replace(&mut self.state, state)
    }

    /// Back to [`StageState::seed`], including its fixed ids.
    pub fn reset(&mut self) {
        self.state = StageState::seed();
    }

    /// Replaces the state with a JSON snapshot, after checking its integrity.
    /// On error the current state is kept.
    pub fn load_json(&mut self, json: &str) -> Result<(), StateError> {
        let state = StageState::from_json(json)?;
        state.check_integrity()?;
        self.state = state;
        Ok(())
    }

    pub fn add_panel(&mut self) -> EntityId {
        let panel_id = self.ids.next_id();
        let dancer_ids = [self.ids.next_id(), self.ids.next_id()];
        let shape_id = self.ids.next_id();
        let (panel, dancers, shape) = formation_template(panel_id.clone(), dancer_ids, shape_id);

        self.state.dancers.insert_entities(dancers);
        self.state.shapes.insert_entities([shape]);
        self.state.panels.insert_entities([panel]);

        debug!(%panel_id, panels = self.state.panels.len(), "added panel");
        panel_id
    }

    /// Removes the panel together with every dancer and shape it references.
    pub fn remove_panel(&mut self, panel_id: &EntityId) -> bool {
        let Some(panel) = self.state.panels.get(panel_id).cloned() else {
            return false;
        };

        let dancers = self.state.dancers.remove_ids(&panel.dancers);
        let shapes = self.state.shapes.remove_ids(&panel.shapes);
        self.state.panels.remove_ids([panel_id]);

        if self.state.selection.release_panel(panel_id) {
            trace!(%panel_id, "selection released");
        }
        debug!(%panel_id, dancers, shapes, "removed panel");
        true
    }

    /// Appends a deep copy of the panel, its dancers and its shapes under fresh ids.
    pub fn clone_panel(&mut self, panel_id: &EntityId) -> Option<EntityId> {
        let source = self.state.panels.get(panel_id)?;
        let clone_id = self.ids.next_id();

        let dancers = clone_entities(&self.state.dancers.by_id, &source.dancers, self.ids.as_mut());
        let shapes = clone_entities(&self.state.shapes.by_id, &source.shapes, self.ids.as_mut());

        let mut panel = source.rekeyed(clone_id.clone());
        panel.dancers = dancers.translate(&source.dancers);
        panel.shapes = shapes.translate(&source.shapes);

        self.state.dancers.insert_entities(dancers.clones);
        self.state.shapes.insert_entities(shapes.clones);
        self.state.panels.insert_entities([panel]);

        debug!(source = %panel_id, clone = %clone_id, "cloned panel");
        Some(clone_id)
    }

    /// Moves `dragged_id` to the index `target_id` held. Everything else keeps its
    /// relative order.
    pub fn move_panel(&mut self, dragged_id: &EntityId, target_id: &EntityId) -> bool {
        if dragged_id == target_id {
            return false;
        }
        let panels = &mut self.state.panels;
        let (Some(from), Some(to)) = (panels.position(dragged_id), panels.position(target_id))
        else {
            return false;
        };

        let dragged = panels.all_ids.remove(from);
        panels.all_ids.insert(to, dragged);

        debug!(panel_id = %dragged_id, from, to, "moved panel");
        true
    }

    /// Runs `update` against the panel's own attributes. Reference lists are out of
    /// reach; keys naming panel fields are dropped afterwards.
    pub fn update_panel_state(
        &mut self,
        panel_id: &EntityId,
        update: impl FnOnce(&mut Attributes),
    ) -> bool {
        let Some(panel) = self.state.panels.get_mut(panel_id) else {
            return false;
        };
        update(&mut panel.attrs);
        strip_reserved(&mut panel.attrs, Panel::FIELDS);
        true
    }

    pub fn update_dancer(&mut self, dancer_id: &EntityId, patch: DancerPatch) -> bool {
        let Some(dancer) = self.state.dancers.get_mut(dancer_id) else {
            return false;
        };
        dancer.apply(patch);
        true
    }

    pub fn update_shape(&mut self, shape_id: &EntityId, patch: ShapePatch) -> bool {
        let Some(shape) = self.state.shapes.get_mut(shape_id) else {
            return false;
        };
        shape.apply(patch);
        true
    }

    pub fn select_panel(&mut self, panel_id: &EntityId) -> bool {
        if !self.state.panels.contains(panel_id) {
            return false;
        }
        self.state.selection.selected_panel_id = Some(panel_id.clone());
        true
    }

    /// Selects the dancer and records the panel that owns it.
    pub fn select_dancer(&mut self, dancer_id: &EntityId) -> bool {
        if !self.state.dancers.contains(dancer_id) {
            return false;
        }
        let Some(panel_id) = self.state.panel_of_dancer(dancer_id).map(|p| p.id.clone()) else {
            return false;
        };
        self.state.selection.selected_dancer = Some(DancerSelection {
            dancer_id: dancer_id.clone(),
            panel_id,
        });
        true
    }

    pub fn select_shape(&mut self, shape_id: &EntityId) -> bool {
        if !self.state.shapes.contains(shape_id) {
            return false;
        }
        let Some(panel_id) = self.state.panel_of_shape(shape_id).map(|p| p.id.clone()) else {
            return false;
        };
        self.state.selection.selected_shape = Some(ShapeSelection {
            shape_id: shape_id.clone(),
            panel_id,
        });
        true
    }

    pub fn clear_selection(&mut self) {
        self.state.selection = Selection::default();
    }
}
