use serde_json::Value;
use std::fmt;

use crate::errors::{PersistenceError, ServiceError};
use crate::models::Record;

/// One pending write against a named collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Adds a new record at the head of the collection.
    Insert {
        collection: &'static str,
        id: String,
        record: Value,
    },
    /// Overwrites the record with the same id. Staging fails with
    /// `NotFound` if the id is absent at apply time.
    Replace {
        collection: &'static str,
        id: String,
        record: Value,
    },
}

impl Effect {
    pub fn insert<R: Record>(record: &R) -> Result<Self, ServiceError> {
        Ok(Effect::Insert {
            collection: R::COLLECTION_KEY,
            id: record.id().to_string(),
            record: serde_json::to_value(record)?,
        })
    }

    pub fn replace<R: Record>(record: &R) -> Result<Self, ServiceError> {
        Ok(Effect::Replace {
            collection: R::COLLECTION_KEY,
            id: record.id().to_string(),
            record: serde_json::to_value(record)?,
        })
    }

    pub fn collection(&self) -> &'static str {
        match self {
            Effect::Insert { collection, .. } | Effect::Replace { collection, .. } => *collection,
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            Effect::Insert { id, .. } | Effect::Replace { id, .. } => id,
        }
    }
}

/// Ordered writes produced by one command. Applied as a unit by
/// [`super::Workspace::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectList {
    effects: Vec<Effect>,
}

impl EffectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<R: Record>(mut self, record: &R) -> Result<Self, ServiceError> {
        self.effects.push(Effect::insert(record)?);
        Ok(self)
    }

    pub fn replace<R: Record>(mut self, record: &R) -> Result<Self, ServiceError> {
        self.effects.push(Effect::replace(record)?);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    /// Collections touched, in first-touch order.
    pub fn collections(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Vec::new();
        for effect in &self.effects {
            if !keys.contains(&effect.collection()) {
                keys.push(effect.collection());
            }
        }
        keys
    }
}

impl IntoIterator for EffectList {
    type Item = Effect;
    type IntoIter = std::vec::IntoIter<Effect>;

    fn into_iter(self) -> Self::IntoIter {
        self.effects.into_iter()
    }
}

#[derive(Debug)]
pub struct FailedWrite {
    pub collection: &'static str,
    pub error: PersistenceError,
}

/// Outcome of applying an effect list once staging succeeded.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub written: Vec<&'static str>,
    pub failed: Vec<FailedWrite>,
}

impl ApplyReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} written", self.written.len())?;
        for failure in &self.failed {
            write!(f, "; {} failed: {}", failure.collection, failure.error)?;
        }
        Ok(())
    }
}
