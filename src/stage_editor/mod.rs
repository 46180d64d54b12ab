pub mod attributes;
pub mod collection;
pub mod entities;
pub mod ids;
pub mod integrity;
pub mod shared;
pub mod stage;
pub mod store;

pub use attributes::{Attributes, DancerPatch, ShapePatch};
pub use collection::{add_entities, clone_entities, remove_entities, ClonedEntities, EntityCollection};
pub use entities::{Dancer, Entity, Panel, Shape};
pub use ids::{EntityId, IdGenerator, SequentialIds, UuidIds};
pub use integrity::{IntegrityError, StateError};
pub use shared::SharedStore;
pub use store::{DancerSelection, Selection, ShapeSelection, StageState, Store};
