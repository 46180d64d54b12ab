//! Normalized store for choreography panels, the dancers placed on them and the
//! shapes drawn behind them.
//!
//! Everything lives in [`stage_editor`]; the most used types are re-exported here.

pub mod stage_editor;

pub use stage_editor::{
    Attributes, ClonedEntities, Dancer, DancerPatch, DancerSelection, Entity, EntityCollection,
    EntityId, IdGenerator, IntegrityError, Panel, Selection, SequentialIds, Shape, ShapePatch,
    ShapeSelection, SharedStore, StageState, StateError, Store, UuidIds,
};
