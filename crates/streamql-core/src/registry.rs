//! Event type registry
//!
//! Registration happens at setup time. During parsing the registry is only
//! read, so a single instance can be shared by reference between threads
//! that compile queries concurrently.

use crate::schema::EventType;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: FxHashMap<String, Arc<EventType>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event type under its own name, returning the entry it
    /// replaced, if any.
    pub fn register(&mut self, event_type: EventType) -> Option<Arc<EventType>> {
        let name = event_type.name.clone();
        let previous = self.types.insert(name.clone(), Arc::new(event_type));
        if previous.is_some() {
            warn!(event_type = %name, "replacing registered event type");
        }
        previous
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<EventType>> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EventType>> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<EventType> for Registry {
    fn from_iter<I: IntoIterator<Item = EventType>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for event_type in iter {
            registry.register(event_type);
        }
        registry
    }
}

impl Extend<EventType> for Registry {
    fn extend<I: IntoIterator<Item = EventType>>(&mut self, iter: I) {
        for event_type in iter {
            self.register(event_type);
        }
    }
}
