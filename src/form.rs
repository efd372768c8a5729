//! Modal form session: a draft being edited, the mode it was opened in and
//! the error from the last failed submit.

use tracing::{debug, warn};

use crate::commands::{Command, Executed};
use crate::errors::ServiceError;
use crate::store::Workspace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone)]
pub struct FormSession<D> {
    mode: FormMode,
    draft: D,
    open: bool,
    last_error: Option<ServiceError>,
}

impl<D: Default> Default for FormSession<D> {
    fn default() -> Self {
        Self {
            mode: FormMode::Create,
            draft: D::default(),
            open: false,
            last_error: None,
        }
    }
}

impl<D: Default> FormSession<D> {
    /// Opens an empty form for a new record.
    pub fn create() -> Self {
        Self {
            open: true,
            ..Self::default()
        }
    }

    /// Opens the form prefilled from an existing record.
    pub fn edit(id: impl Into<String>, draft: D) -> Self {
        Self {
            mode: FormMode::Edit { id: id.into() },
            draft,
            open: true,
            last_error: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn last_error(&self) -> Option<&ServiceError> {
        self.last_error.as_ref()
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Builds a command from the draft and runs it.
    ///
    /// On failure nothing is written, the draft stays as typed and the error
    /// is kept for display. On success the form closes and resets.
    pub fn submit<C, F>(&mut self, workspace: &Workspace, build: F) -> Result<Executed<C::Output>, ServiceError>
    where
        C: Command,
        F: FnOnce(&FormMode, &D) -> C,
    {
        let command = build(&self.mode, &self.draft);
        match workspace.execute(&command) {
            Ok(executed) => {
                if !executed.report.is_complete() {
                    warn!(report = %executed.report, "Submit applied with write failures");
                }
                debug!(mode = ?self.mode, "Form submitted");
                *self = Self::default();
                Ok(executed)
            }
            Err(err) => {
                debug!(error = %err, "Form submit rejected");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fund::{MemberDraft, RegisterMemberCommand};

    #[test]
    fn failed_submit_keeps_draft_and_error() {
        let ws = Workspace::default();
        let mut form = FormSession::<MemberDraft>::create();
        form.draft_mut().code = "E009".into();

        let result = form.submit(&ws, |_, draft| RegisterMemberCommand {
            draft: draft.clone(),
        });

        assert!(result.is_err());
        assert!(form.is_open());
        assert_eq!(form.draft().code, "E009");
        assert!(form.last_error().and_then(ServiceError::field_errors).is_some());
    }

    #[test]
    fn successful_submit_resets() {
        let ws = Workspace::default();
        let mut form = FormSession::<MemberDraft>::create();
        *form.draft_mut() = MemberDraft {
            code: "E010".into(),
            name: "Malee".into(),
            joined_on: "2023-04-01".into(),
            ..MemberDraft::default()
        };

        form.submit(&ws, |_, draft| RegisterMemberCommand {
            draft: draft.clone(),
        })
        .unwrap();

        assert!(!form.is_open());
        assert_eq!(form.draft(), &MemberDraft::default());
        assert!(form.last_error().is_none());
    }
}
