//! `ActivityRegistry` — maps activity names from input files to dense
//! [`ActivityId`]s and back.
//!
//! The engine itself only ever sees `ActivityId`; names matter to loaders
//! (skills columns, routing tables) and to output writers.

use std::collections::HashMap;

use crate::{ActivityId, CoreResult};

/// Interned activity names, indexed by `ActivityId`.
#[derive(Clone, Debug, Default)]
pub struct ActivityRegistry {
    names: Vec<String>,
    by_name: HashMap<String, ActivityId>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from names in order: the first name gets `ActivityId(0)`.
    /// Duplicates are interned once.
    pub fn from_names<I, S>(names: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.intern(name.as_ref())?;
        }
        Ok(registry)
    }

    /// Return the id for `name`, registering it if unseen.
    pub fn intern(&mut self, name: &str) -> CoreResult<ActivityId> {
        if let Some(&id) = self.by_name.get(name) {
            return Ok(id);
        }
        let id = ActivityId::try_from(self.names.len())?;
        self.names.push(name.to_owned());
        self.by_name.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Look up an already registered name.
    pub fn id(&self, name: &str) -> Option<ActivityId> {
        self.by_name.get(name).copied()
    }

    /// Display name for `id`, or `None` if it was never registered.
    pub fn name(&self, id: ActivityId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All registered ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = ActivityId> + '_ {
        (0..self.names.len()).map(|i| ActivityId(i as u16))
    }
}
