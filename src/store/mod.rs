//! Collections, the workspace that owns them, and effect application.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::commands::{Command, Executed};
use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::reference::ReferenceData;
use crate::models::Record;
use crate::persistence::{FileBackend, MemoryBackend, Persistence};

pub mod effects;

pub use effects::{ApplyReport, Effect, EffectList, FailedWrite};

/// Read and write access to one record collection.
pub trait CollectionStore<T: Record> {
    fn list(&self) -> Vec<T>;

    fn get(&self, id: &str) -> Option<T> {
        self.list().into_iter().find(|record| record.id() == id)
    }

    fn insert(&mut self, record: T) -> Result<(), ServiceError>;

    /// Replaces the record with the same id. Fails with `NotFound` if it is
    /// not present.
    fn update(&mut self, record: T) -> Result<(), ServiceError>;
}

/// Collection held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryCollection<T> {
    records: Vec<T>,
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Record> MemoryCollection<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }
}

impl<T: Record> CollectionStore<T> for MemoryCollection<T> {
    fn list(&self) -> Vec<T> {
        self.records.clone()
    }

    fn insert(&mut self, record: T) -> Result<(), ServiceError> {
        self.records.insert(0, record);
        Ok(())
    }

    fn update(&mut self, record: T) -> Result<(), ServiceError> {
        let slot = self
            .records
            .iter_mut()
            .find(|existing| existing.id() == record.id())
            .ok_or_else(|| ServiceError::not_found(T::COLLECTION_KEY, record.id()))?;
        *slot = record;
        Ok(())
    }
}

/// Collection stored under `T::COLLECTION_KEY`. Every mutation re-reads the
/// stored array first so writes from another workspace are not lost.
#[derive(Debug, Clone)]
pub struct PersistedCollection<T> {
    persistence: Persistence,
    marker: PhantomData<fn() -> T>,
}

impl<T: Record> PersistedCollection<T> {
    pub fn new(persistence: Persistence) -> Self {
        Self {
            persistence,
            marker: PhantomData,
        }
    }
}

impl<T: Record> CollectionStore<T> for PersistedCollection<T> {
    fn list(&self) -> Vec<T> {
        self.persistence.load(T::COLLECTION_KEY, Vec::new())
    }

    fn insert(&mut self, record: T) -> Result<(), ServiceError> {
        let mut records: Vec<T> = self.persistence.load_for_update(T::COLLECTION_KEY)?;
        records.insert(0, record);
        self.persistence.try_save(T::COLLECTION_KEY, &records)?;
        Ok(())
    }

    fn update(&mut self, record: T) -> Result<(), ServiceError> {
        let mut records: Vec<T> = self.persistence.load_for_update(T::COLLECTION_KEY)?;
        let slot = records
            .iter_mut()
            .find(|existing| existing.id() == record.id())
            .ok_or_else(|| ServiceError::not_found(T::COLLECTION_KEY, record.id()))?;
        *slot = record;
        self.persistence.try_save(T::COLLECTION_KEY, &records)?;
        Ok(())
    }
}

/// Business thresholds applied by the form commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessRules {
    /// Smallest accepted deposit.
    pub min_deposit: Decimal,
    /// Loan ceiling as a multiple of the member's savings balance.
    pub loan_multiplier: Decimal,
    pub max_loan_installments: u32,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            min_deposit: Decimal::from(100),
            loan_multiplier: Decimal::from(5),
            max_loan_installments: 60,
        }
    }
}

/// Everything a page works against: persisted collections, read-only
/// reference data and the business rules.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    persistence: Persistence,
    reference: Arc<ReferenceData>,
    rules: BusinessRules,
}

impl Workspace {
    pub fn new(persistence: Persistence, reference: ReferenceData) -> Self {
        Self {
            persistence,
            reference: Arc::new(reference),
            rules: BusinessRules::default(),
        }
    }

    pub fn in_memory(reference: ReferenceData) -> Self {
        Self::new(Persistence::in_memory(), reference)
    }

    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = Arc::new(reference);
        self
    }

    pub fn with_rules(mut self, rules: BusinessRules) -> Self {
        self.rules = rules;
        self
    }

    /// Builds the workspace for the configured storage backend.
    pub fn from_config(config: &AppConfig, reference: ReferenceData) -> Result<Self, ServiceError> {
        let persistence = if config.uses_memory_storage() {
            let backend = match config.storage_quota_bytes {
                Some(quota) => MemoryBackend::with_quota(quota),
                None => MemoryBackend::new(),
            };
            Persistence::new(Arc::new(backend))
        } else {
            let backend = FileBackend::open(Path::new(&config.data_dir))?
                .with_quota(config.storage_quota_bytes);
            info!(data_dir = %config.data_dir, "Using file storage");
            Persistence::new(Arc::new(backend))
        };
        Ok(Self::new(persistence, reference).with_rules(config.business_rules()))
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn rules(&self) -> &BusinessRules {
        &self.rules
    }

    /// Fresh copy of a collection as currently stored.
    pub fn list<R: Record>(&self) -> Vec<R> {
        self.persistence.load(R::COLLECTION_KEY, Vec::new())
    }

    pub fn find<R: Record>(&self, id: &str) -> Option<R> {
        self.list::<R>().into_iter().find(|record| record.id() == id)
    }

    pub fn collection<R: Record>(&self) -> PersistedCollection<R> {
        PersistedCollection::new(self.persistence.clone())
    }

    /// Applies an effect list.
    ///
    /// Every touched collection is read fresh, mutated and serialized before
    /// any key is written; a staging error, including a failed read, returns
    /// `Err` with nothing written. Write failures after staging do not stop the remaining
    /// writes and are listed in the report.
    #[instrument(skip(self, effects), fields(effects = effects.len()))]
    pub fn apply(&self, effects: EffectList) -> Result<ApplyReport, ServiceError> {
        let mut staged: Vec<(&'static str, Vec<Value>)> = Vec::new();
        for effect in effects {
            let key = effect.collection();
            let idx = match staged.iter().position(|(staged_key, _)| *staged_key == key) {
                Some(idx) => idx,
                None => {
                    staged.push((key, self.persistence.load_for_update(key)?));
                    staged.len() - 1
                }
            };
            let rows = &mut staged[idx].1;
            match effect {
                Effect::Insert { record, .. } => rows.insert(0, record),
                Effect::Replace {
                    collection,
                    id,
                    record,
                } => {
                    let slot = rows
                        .iter_mut()
                        .find(|row| row.get("id").and_then(Value::as_str) == Some(id.as_str()))
                        .ok_or_else(|| ServiceError::not_found(collection, &id))?;
                    *slot = record;
                }
            }
        }

        let payloads = staged
            .into_iter()
            .map(|(key, rows)| Ok((key, serde_json::to_string(&rows)?)))
            .collect::<Result<Vec<_>, ServiceError>>()?;

        let mut report = ApplyReport::default();
        for (key, payload) in payloads {
            match self.persistence.write_raw(key, &payload) {
                Ok(()) => report.written.push(key),
                Err(error) => {
                    warn!(collection = key, error = %error, "Write failed after staging");
                    report.failed.push(FailedWrite {
                        collection: key,
                        error,
                    });
                }
            }
        }
        debug!(written = report.written.len(), failed = report.failed.len(), "Applied effects");
        Ok(report)
    }

    /// Plans `command` against the current state and applies its effects.
    pub fn execute<C: Command>(&self, command: &C) -> Result<Executed<C::Output>, ServiceError> {
        let plan = command.plan(self)?;
        let report = self.apply(plan.effects)?;
        Ok(Executed {
            output: plan.output,
            report,
        })
    }
}
