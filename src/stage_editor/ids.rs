use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier shared by panels, dancers and shapes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Source of fresh identifiers. Every call must return an id never handed out before.
pub trait IdGenerator: fmt::Debug + Send {
    fn next_id(&mut self) -> EntityId;
}

/// Random v4 UUIDs. The default for [`Store`](super::Store).
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> EntityId {
        EntityId(Uuid::new_v4().to_string())
    }
}

/// `prefix-1`, `prefix-2`, ... Deterministic, handy for fixtures and logs.
///
/// Every id ends in `-<digits>`, which keeps them apart from the seed ids
/// (`panel-seed`, `dancer-seed-a`, `dancer-seed-b`, `shape-seed`) whatever the
/// prefix. Uniqueness only holds as long as no state containing ids with the same
/// prefix is loaded into the store from elsewhere.
#[derive(Clone, Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> EntityId {
        let id = EntityId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sequential_ids_count_up_from_one() {
        let mut ids = SequentialIds::new("dancer");
        assert_eq!(ids.next_id().as_str(), "dancer-1");
        assert_eq!(ids.next_id().as_str(), "dancer-2");
    }

    #[test]
    fn uuid_ids_do_not_repeat() {
        let mut ids = UuidIds;
        let issued: HashSet<EntityId> = (0..256).map(|_| ids.next_id()).collect();
        assert_eq!(issued.len(), 256);
    }

    #[test]
    fn entity_id_serializes_as_plain_string() {
        let id = EntityId::from("p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");
    }
}
