use crate::replication::{EntityState, ReplicationError};
use std::collections::HashMap;

/// Remote-side representation of an entity. Mirrors only ever observe.
pub trait Replica: Send + Sync + 'static {
    /// Called after any attribute of the mirrored entity changed.
    fn on_update(&mut self, _state: &EntityState) {}

    fn on_invoke(&mut self, _method: &str, _params: &[String]) {}

    fn on_destroy(&mut self) {}
}

type Constructor =
    Box<dyn Fn(&EntityState, &[String]) -> Result<Box<dyn Replica>, ReplicationError> + Send + Sync>;

/// Closed set of replicable types: type identifier to constructor.
#[derive(Default)]
pub struct TypeRegistry {
    constructors: HashMap<String, Constructor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, R>(&mut self, type_id: &str, constructor: F) -> &mut Self
    where
        F: Fn(&EntityState, &[String]) -> Result<R, ReplicationError> + Send + Sync + 'static,
        R: Replica,
    {
        self.constructors.insert(
            type_id.to_string(),
            Box::new(move |state, params| {
                constructor(state, params).map(|replica| Box::new(replica) as Box<dyn Replica>)
            }),
        );
        self
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.constructors.contains_key(type_id)
    }

    pub fn construct(
        &self,
        state: &EntityState,
        params: &[String],
    ) -> Result<Box<dyn Replica>, ReplicationError> {
        let constructor = self
            .constructors
            .get(&state.type_id)
            .ok_or_else(|| ReplicationError::UnknownType(state.type_id.clone()))?;
        constructor(state, params)
    }
}
