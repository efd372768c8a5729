//! Read-only reference collections supplied by the page-level data provider
//! (branches, oil grades) and the lookup table used to resolve them.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::errors::ServiceError;
use crate::format::PLACEHOLDER;
use crate::persistence::Persistence;

/// Persisted branch list supplied by the data provider.
pub const BRANCHES_KEY: &str = "ref.branches.v1";

/// Fuel grades handled across the stations.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum OilType {
    #[default]
    Diesel,
    Gasohol91,
    Gasohol95,
    E20,
    Benzine,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: u32,
    pub name: String,
    pub region: String,
}

impl Branch {
    pub fn new(id: u32, name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            region: region.into(),
        }
    }
}

/// Something a [`LookupTable`] can resolve by key.
pub trait Labeled {
    /// Human readable entity name used in error messages.
    const ENTITY: &'static str;

    fn lookup_key(&self) -> Cow<'_, str>;

    fn label(&self) -> Cow<'_, str>;
}

impl Labeled for Branch {
    const ENTITY: &'static str = "Branch";

    fn lookup_key(&self) -> Cow<'_, str> {
        Cow::Owned(self.id.to_string())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// Read-only table addressed by string key. Missing keys degrade to the
/// placeholder for display and to `NotFound` when a write depends on them.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupTable<T> {
    items: Vec<T>,
}

impl<T> Default for LookupTable<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Labeled> LookupTable<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        let key = key.trim();
        self.items.iter().find(|item| item.lookup_key() == key)
    }

    pub fn label_or_placeholder(&self, key: &str) -> Cow<'_, str> {
        self.get(key)
            .map(|item| item.label())
            .unwrap_or(Cow::Borrowed(PLACEHOLDER))
    }

    pub fn require(&self, key: &str) -> Result<&T, ServiceError> {
        self.get(key)
            .ok_or_else(|| ServiceError::not_found(T::ENTITY, key))
    }
}

/// Reference data handed to the workspace by the embedding application.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceData {
    pub branches: LookupTable<Branch>,
}

impl ReferenceData {
    pub fn new(branches: Vec<Branch>) -> Self {
        Self {
            branches: LookupTable::new(branches),
        }
    }

    /// Reads the stored branch list, or `fallback` when none is stored.
    pub fn load(persistence: &Persistence, fallback: Vec<Branch>) -> Self {
        Self::new(persistence.load(BRANCHES_KEY, fallback))
    }

    pub fn branch_name(&self, branch_id: u32) -> Cow<'_, str> {
        self.branches.label_or_placeholder(&branch_id.to_string())
    }
}
