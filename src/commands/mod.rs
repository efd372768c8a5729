use crate::errors::ServiceError;
use crate::store::{ApplyReport, EffectList, Workspace};

pub mod delivery;
pub mod fund;
pub mod sales;

/// A business operation submitted from a form or a row action.
///
/// Planning reads the workspace, validates the input and returns the
/// records to write without touching storage. [`Workspace::execute`] applies
/// the plan.
pub trait Command {
    /// Value handed back to the caller on success, usually the primary
    /// record written.
    type Output;

    fn plan(&self, workspace: &Workspace) -> Result<Plan<Self::Output>, ServiceError>;
}

/// Output of a command together with the writes it needs.
#[derive(Debug)]
pub struct Plan<T> {
    pub output: T,
    pub effects: EffectList,
}

impl<T> Plan<T> {
    pub fn new(output: T, effects: EffectList) -> Self {
        Self { output, effects }
    }
}

#[derive(Debug)]
pub struct Executed<T> {
    pub output: T,
    pub report: ApplyReport,
}
