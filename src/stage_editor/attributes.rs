use serde_json::{Map, Value};

/// Open-ended display attributes carried by every entity (colour, label, size...).
pub type Attributes = Map<String, Value>;

/// Merges `patch` into `target`. A `null` value deletes the key instead of storing it.
/// Keys listed in `reserved` name the entity's own fields and are skipped.
pub fn merge_attributes(target: &mut Attributes, patch: Attributes, reserved: &[&str]) {
    for (key, value) in patch {
        if reserved.contains(&key.as_str()) {
            continue;
        }
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

/// Drops every key that would shadow one of the entity's own fields once flattened.
pub fn strip_reserved(attrs: &mut Attributes, reserved: &[&str]) {
    attrs.retain(|key, _| !reserved.contains(&key.as_str()));
}

/// Partial update for a dancer. Unset fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DancerPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub attrs: Attributes,
}

impl DancerPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

/// Partial update for a shape. Unset fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub attrs: Attributes,
}

impl ShapePatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_removes_and_values_overwrite() {
        let mut attrs = Attributes::new();
        attrs.insert("color".into(), json!("red"));
        attrs.insert("label".into(), json!("A"));

        let mut patch = Attributes::new();
        patch.insert("color".into(), json!("blue"));
        patch.insert("label".into(), Value::Null);
        patch.insert("size".into(), json!(3));
        merge_attributes(&mut attrs, patch, &[]);

        assert_eq!(attrs.get("color"), Some(&json!("blue")));
        assert_eq!(attrs.get("label"), None);
        assert_eq!(attrs.get("size"), Some(&json!(3)));
    }

    #[test]
    fn reserved_keys_are_never_stored() {
        let mut attrs = Attributes::new();
        let mut patch = Attributes::new();
        patch.insert("x".into(), json!(5));
        patch.insert("id".into(), json!("hijack"));
        patch.insert("color".into(), json!("gold"));
        merge_attributes(&mut attrs, patch, &["id", "x", "y"]);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("color"), Some(&json!("gold")));

        attrs.insert("dancers".into(), json!([]));
        strip_reserved(&mut attrs, &["id", "dancers", "shapes"]);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn builders_only_set_what_they_name() {
        let patch = ShapePatch::default().rotation(45.0).attr("kind", "circle");
        assert_eq!(patch.x, None);
        assert_eq!(patch.rotation, Some(45.0));
        assert_eq!(patch.attrs.get("kind"), Some(&json!("circle")));
    }
}
