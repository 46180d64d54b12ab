//! Process-wide default store, published to the UI as a dioxus signal.
//!
//! Components that read [`STAGE`] re-render whenever one of the commands below
//! writes to it. Code that wants its own instance should hold a [`Store`] instead.

use dioxus::prelude::*;

use super::attributes::{Attributes, DancerPatch, ShapePatch};
use super::ids::EntityId;
use super::store::{StageState, Store};

pub static STAGE: GlobalSignal<Store> = Signal::global(Store::default);

pub fn get_state() -> StageState {
    STAGE.read().snapshot()
}

pub fn get_initial_state() -> StageState {
    Store::initial_state()
}

pub fn set_state(update: impl FnOnce(&mut StageState)) {
    STAGE.write().set_state(update);
}

pub fn reset_stage() {
    STAGE.write().reset();
}

pub fn add_panel() -> EntityId {
    STAGE.write().add_panel()
}

pub fn remove_panel(panel_id: &EntityId) -> bool {
    STAGE.write().remove_panel(panel_id)
}

pub fn clone_panel(panel_id: &EntityId) -> Option<EntityId> {
    STAGE.write().clone_panel(panel_id)
}

pub fn move_panel(dragged_id: &EntityId, target_id: &EntityId) -> bool {
    STAGE.write().move_panel(dragged_id, target_id)
}

pub fn update_panel_state(panel_id: &EntityId, update: impl FnOnce(&mut Attributes)) -> bool {
    STAGE.write().update_panel_state(panel_id, update)
}

pub fn update_dancer(dancer_id: &EntityId, patch: DancerPatch) -> bool {
    STAGE.write().update_dancer(dancer_id, patch)
}

pub fn update_shape(shape_id: &EntityId, patch: ShapePatch) -> bool {
    STAGE.write().update_shape(shape_id, patch)
}

pub fn select_panel(panel_id: &EntityId) -> bool {
    STAGE.write().select_panel(panel_id)
}

pub fn select_dancer(dancer_id: &EntityId) -> bool {
    STAGE.write().select_dancer(dancer_id)
}

pub fn select_shape(shape_id: &EntityId) -> bool {
    STAGE.write().select_shape(shape_id)
}

pub fn clear_selection() {
    STAGE.write().clear_selection();
}
