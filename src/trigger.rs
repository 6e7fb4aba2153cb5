//! Triggers: typed events that index and dispatch plans.
//!
//! A trigger couples an [`EventType`] with a [`Literal`]. The plan index is keyed
//! by [`TriggerKey`] (event type plus the literal's structural hash), so a
//! pattern trigger `+!goal(X)` and an event `+!goal(1)` share a key.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::term::Literal;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Kind of event a trigger reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    AddBelief,
    DeleteBelief,
    AddGoal,
    DeleteGoal,
}

impl EventType {
    /// Textual prefix marker (`+`, `-`, `+!`, `-!`).
    pub fn prefix(self) -> &'static str {
        match self {
            EventType::AddBelief => "+",
            EventType::DeleteBelief => "-",
            EventType::AddGoal => "+!",
            EventType::DeleteGoal => "-!",
        }
    }

    /// Inverse of [`prefix`](Self::prefix).
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "+" => Some(EventType::AddBelief),
            "-" => Some(EventType::DeleteBelief),
            "+!" => Some(EventType::AddGoal),
            "-!" => Some(EventType::DeleteGoal),
            _ => None,
        }
    }

    pub fn is_goal(self) -> bool {
        matches!(self, EventType::AddGoal | EventType::DeleteGoal)
    }
}

/// Index key: event type and literal structural hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerKey {
    pub event: EventType,
    pub structure_hash: u64,
}

/// An event kind coupled with a literal.
#[derive(Debug, Clone)]
pub struct Trigger {
    event: EventType,
    literal: Literal,
}

// ---------------------------------------------------------------------------
// Construction and access
// ---------------------------------------------------------------------------

impl Trigger {
    pub fn new(event: EventType, literal: Literal) -> Self {
        Self { event, literal }
    }

    pub fn add_goal(literal: Literal) -> Self {
        Self::new(EventType::AddGoal, literal)
    }

    pub fn delete_goal(literal: Literal) -> Self {
        Self::new(EventType::DeleteGoal, literal)
    }

    pub fn add_belief(literal: Literal) -> Self {
        Self::new(EventType::AddBelief, literal)
    }

    pub fn delete_belief(literal: Literal) -> Self {
        Self::new(EventType::DeleteBelief, literal)
    }

    pub fn event(&self) -> EventType {
        self.event
    }

    pub fn literal(&self) -> &Literal {
        &self.literal
    }

    pub fn into_literal(self) -> Literal {
        self.literal
    }

    pub fn key(&self) -> TriggerKey {
        TriggerKey {
            event: self.event,
            structure_hash: self.literal.structure_hash(),
        }
    }

    /// Hash over event type and literal structure.
    pub fn structure_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.key().hash(&mut hasher);
        hasher.finish()
    }

    /// Hash over event type and full literal content.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.event.hash(&mut hasher);
        self.literal.content_hash().hash(&mut hasher);
        hasher.finish()
    }

    pub fn is_ground(&self) -> bool {
        !self.literal.has_variable()
    }

    /// Same event with the literal functor cut down to its last segment, or
    /// `None` when the functor has a single segment already.
    pub fn suffix_copy(&self) -> Option<Trigger> {
        (self.literal.functor().len() > 1).then(|| Trigger::new(self.event, self.literal.suffix_copy()))
    }

    /// Same event type carrying another literal.
    pub fn with_literal(&self, literal: Literal) -> Trigger {
        Trigger::new(self.event, literal)
    }
}

impl PartialEq for Trigger {
    fn eq(&self, other: &Self) -> bool {
        self.event == other.event && self.literal == other.literal
    }
}

impl Eq for Trigger {}

impl Hash for Trigger {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash().hash(state);
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.event.prefix(), self.literal)
    }
}
