use serde::{Deserialize, Serialize};

use super::attributes::{merge_attributes, Attributes, DancerPatch, ShapePatch};
use super::ids::EntityId;

/// Anything stored in an [`EntityCollection`](super::EntityCollection).
pub trait Entity: Clone {
    /// Serialized field names. Open attributes may not use them.
    const FIELDS: &'static [&'static str];

    fn id(&self) -> &EntityId;

    /// Copy of `self` under a new identifier. Nothing is shared with the original.
    fn rekeyed(&self, id: EntityId) -> Self;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dancer {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub attrs: Attributes,
}

impl Dancer {
    pub fn new(id: EntityId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            attrs: Attributes::new(),
        }
    }

    pub fn apply(&mut self, patch: DancerPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        merge_attributes(&mut self.attrs, patch.attrs, Self::FIELDS);
    }
}

impl Entity for Dancer {
    const FIELDS: &'static [&'static str] = &["id", "x", "y"];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn rekeyed(&self, id: EntityId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    #[serde(flatten)]
    pub attrs: Attributes,
}

impl Shape {
    pub fn new(id: EntityId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            rotation: 0.0,
            attrs: Attributes::new(),
        }
    }

    pub fn apply(&mut self, patch: ShapePatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        merge_attributes(&mut self.attrs, patch.attrs, Self::FIELDS);
    }
}

impl Entity for Shape {
    const FIELDS: &'static [&'static str] = &["id", "x", "y", "rotation"];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn rekeyed(&self, id: EntityId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

/// A formation frame. `dancers` and `shapes` are references into the store's
/// top-level collections, in display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: EntityId,
    pub dancers: Vec<EntityId>,
    pub shapes: Vec<EntityId>,
    #[serde(flatten)]
    pub attrs: Attributes,
}

impl Panel {
    pub fn new(id: EntityId, dancers: Vec<EntityId>, shapes: Vec<EntityId>) -> Self {
        Self {
            id,
            dancers,
            shapes,
            attrs: Attributes::new(),
        }
    }

    pub fn owns_dancer(&self, dancer_id: &EntityId) -> bool {
        self.dancers.contains(dancer_id)
    }

    pub fn owns_shape(&self, shape_id: &EntityId) -> bool {
        self.shapes.contains(shape_id)
    }
}

impl Entity for Panel {
    const FIELDS: &'static [&'static str] = &["id", "dancers", "shapes"];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn rekeyed(&self, id: EntityId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rekeyed_dancer_does_not_share_attributes() {
        let mut original = Dancer::new("d1".into(), 10.0, 20.0);
        original.attrs.insert("color".into(), json!("red"));

        let mut copy = original.rekeyed("d2".into());
        copy.attrs.insert("color".into(), json!("blue"));
        copy.x = 999.0;

        assert_eq!(copy.id.as_str(), "d2");
        assert_eq!(original.x, 10.0);
        assert_eq!(original.attrs.get("color"), Some(&json!("red")));
    }

    #[test]
    fn extra_attributes_flatten_into_json() {
        let mut shape = Shape::new("s1".into(), 1.0, 2.0);
        shape.attrs.insert("kind".into(), json!("rect"));

        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(
            value,
            json!({ "id": "s1", "x": 1.0, "y": 2.0, "rotation": 0.0, "kind": "rect" })
        );
        let back: Shape = serde_json::from_value(value).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn shape_patch_leaves_unset_fields() {
        let mut shape = Shape::new("s1".into(), 1.0, 2.0);
        shape.apply(ShapePatch::default().rotation(90.0));
        assert_eq!((shape.x, shape.y, shape.rotation), (1.0, 2.0, 90.0));
    }
}
