//! `Resource` — a person or machine with limited concurrent capacity.

use std::collections::BTreeSet;
use std::fmt;

use crate::{ActivityId, ResourceId};

/// An immutable resource description.
///
/// Many cases may reference the same resource at once; exclusive ownership of
/// a *slot* is enforced by the simulator's resource pool, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    pub id: ResourceId,
    /// Display name.  Defaults to the numeric id when not supplied.
    pub name: String,
    /// Activities this resource is able to perform.
    pub skills: BTreeSet<ActivityId>,
    /// Number of activities it can execute concurrently.
    pub capacity: u32,
}

impl Resource {
    /// A resource with no skills and the given capacity.
    pub fn new(id: ResourceId, capacity: u32) -> Self {
        Self {
            id,
            name: id.0.to_string(),
            skills: BTreeSet::new(),
            capacity,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_skills<I: IntoIterator<Item = ActivityId>>(mut self, skills: I) -> Self {
        self.skills.extend(skills);
        self
    }

    #[inline]
    pub fn can_execute(&self, activity: ActivityId) -> bool {
        self.skills.contains(&activity)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource(id={}, skills={})", self.name, self.skills.len())
    }
}
