//! The top-level entity table.
//!
//! `Arena` owns type-expression nodes; `Entities` owns everything a
//! `TypeExpr::Ref`/`Var` can point at. Kept as a separate table (rather
//! than folded into the arena) because entities are defined once, up
//! front, by `Context::define` (spec §4.2), while arena nodes keep
//! accumulating as the checker descends into bodies.

use rustc_hash::FxHashMap;
use typeck_common::{CheckError, EntityId};

use crate::types::{Alias, Data, DataConstructor, Method, Param, Trait};

/// One top-level definition, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityDef {
    Alias(Alias),
    Data(Data),
    DataConstructor(DataConstructor),
    Trait(Trait),
    Method(Method),
    Param(Param),
}

impl EntityDef {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            EntityDef::Alias(a) => a.id,
            EntityDef::Data(d) => d.id,
            EntityDef::DataConstructor(c) => c.id,
            EntityDef::Trait(t) => t.id,
            EntityDef::Method(m) => m.id,
            EntityDef::Param(p) => p.id,
        }
    }

    /// Number of type parameters this entity introduces, used to build
    /// the curried kind-arrow of a `Ref` (spec §4.3: "its kind is the
    /// curried kind-arrow of its parameter list ending in `*`").
    #[must_use]
    pub fn param_count(&self) -> usize {
        match self {
            EntityDef::Alias(a) => a.params.len(),
            EntityDef::Data(d) => d.params.len(),
            EntityDef::Trait(t) => t.params.len(),
            EntityDef::DataConstructor(_) | EntityDef::Method(_) | EntityDef::Param(_) => 0,
        }
    }
}

/// The set of top-level entities defined for one checking session.
#[derive(Debug, Default)]
pub struct Entities {
    by_id: FxHashMap<EntityId, EntityDef>,
}

impl Entities {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: FxHashMap::default(),
        }
    }

    /// Register a new entity. There is no `Redeclaration` check here —
    /// name-uniqueness is a `Context` concern (spec §4.2); this table is
    /// keyed by id, which the `Repository` already guarantees unique.
    pub fn insert(&mut self, def: EntityDef) {
        self.by_id.insert(def.id(), def);
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityDef> {
        self.by_id.get(&id)
    }

    pub fn try_get(&self, id: EntityId) -> Result<&EntityDef, CheckError> {
        self.get(id).ok_or_else(|| CheckError::NotFound {
            name: format!("entity#{}", id.raw()),
        })
    }

    #[must_use]
    pub fn param(&self, id: EntityId) -> Option<&Param> {
        match self.get(id) {
            Some(EntityDef::Param(p)) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Param;

    #[test]
    fn round_trips_a_param() {
        let mut entities = Entities::new();
        let id = EntityId::from_raw(7);
        entities.insert(EntityDef::Param(Param {
            id,
            name: "T".to_string(),
            kind: None,
            constraints: Vec::new(),
        }));
        assert_eq!(entities.param(id).map(|p| p.name.as_str()), Some("T"));
        assert_eq!(entities.len(), 1);
    }

    #[test]
    fn missing_entity_is_not_found() {
        let entities = Entities::new();
        assert!(entities.try_get(EntityId::from_raw(0)).is_err());
    }
}
