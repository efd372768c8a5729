use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::commands::{Command, Plan};
use crate::common::new_record_id;
use crate::errors::ServiceError;
use crate::models::delivery::{RecoveredOil, SuctionLog, SuctionMode};
use crate::models::reference::OilType;
use crate::models::Record;
use crate::store::{EffectList, Workspace};
use crate::validation::{validate_not_blank, DraftParser};

/// Raw inputs of the suction log form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuctionDraft {
    #[validate(custom = "validate_not_blank")]
    pub date: String,
    #[validate(custom = "validate_not_blank")]
    pub branch_id: String,
    #[validate(custom = "validate_not_blank")]
    pub oil_type: String,
    /// `suction` or `sell`; blank means `suction`.
    pub mode: String,
    #[validate(custom = "validate_not_blank")]
    pub quantity_liters: String,
    pub notes: String,
}

impl SuctionDraft {
    pub fn from_record(log: &SuctionLog) -> Self {
        Self {
            date: log.date.clone(),
            branch_id: log.branch_id.to_string(),
            oil_type: log.oil_type.to_string(),
            mode: log.mode.to_string(),
            quantity_liters: log.quantity_liters.normalize().to_string(),
            notes: log.notes.clone().unwrap_or_default(),
        }
    }

    fn parse(&self, workspace: &Workspace) -> Result<ParsedSuction, ServiceError> {
        let mut parser = DraftParser::new(self);
        let date = parser.date("date", &self.date);
        let branch_id = parser.parse::<u32>("branch_id", &self.branch_id);
        let oil_type = parser.parse::<OilType>("oil_type", &self.oil_type);
        let mode = if self.mode.trim().is_empty() {
            SuctionMode::Suction
        } else {
            parser.parse::<SuctionMode>("mode", &self.mode)
        };
        let quantity_liters = parser.positive("quantity_liters", &self.quantity_liters);
        let notes = parser.optional_text(&self.notes);
        parser.finish()?;

        workspace
            .reference()
            .branches
            .require(&branch_id.to_string())?;

        Ok(ParsedSuction {
            date,
            branch_id,
            oil_type,
            mode,
            quantity_liters,
            notes,
        })
    }
}

struct ParsedSuction {
    date: NaiveDate,
    branch_id: u32,
    oil_type: OilType,
    mode: SuctionMode,
    quantity_liters: Decimal,
    notes: Option<String>,
}

/// Adds a suction log entry. Sell-mode entries also add a recovered-oil
/// inventory entry in the same effect list.
#[derive(Debug, Clone)]
pub struct RecordSuctionCommand {
    pub draft: SuctionDraft,
}

impl Command for RecordSuctionCommand {
    type Output = SuctionLog;

    #[instrument(skip(self, workspace))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<SuctionLog>, ServiceError> {
        let parsed = self.draft.parse(workspace)?;
        let log = SuctionLog {
            id: new_record_id(SuctionLog::ID_PREFIX),
            created_at: Utc::now(),
            updated_at: None,
            date: parsed.date.format("%Y-%m-%d").to_string(),
            branch_id: parsed.branch_id,
            oil_type: parsed.oil_type,
            mode: parsed.mode,
            quantity_liters: parsed.quantity_liters,
            notes: parsed.notes,
        };

        let mut effects = EffectList::new().insert(&log)?;
        if log.mode == SuctionMode::Sell {
            let mirror = RecoveredOil::mirror_of(&log, new_record_id(RecoveredOil::ID_PREFIX));
            effects = effects.insert(&mirror)?;
        }

        info!(id = %log.id, mode = %log.mode, liters = %log.quantity_liters, "Suction log recorded");
        Ok(Plan::new(log, effects))
    }
}

/// Replaces an existing suction log, keeping its id and creation time. The
/// recovered-oil mirror follows the edit.
#[derive(Debug, Clone)]
pub struct EditSuctionCommand {
    pub id: String,
    pub draft: SuctionDraft,
}

impl Command for EditSuctionCommand {
    type Output = SuctionLog;

    #[instrument(skip(self, workspace), fields(id = %self.id))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<SuctionLog>, ServiceError> {
        let existing = workspace
            .find::<SuctionLog>(&self.id)
            .ok_or_else(|| ServiceError::not_found("Suction log", &self.id))?;
        let parsed = self.draft.parse(workspace)?;

        let log = SuctionLog {
            id: existing.id.clone(),
            created_at: existing.created_at,
            updated_at: Some(Utc::now()),
            date: parsed.date.format("%Y-%m-%d").to_string(),
            branch_id: parsed.branch_id,
            oil_type: parsed.oil_type,
            mode: parsed.mode,
            quantity_liters: parsed.quantity_liters,
            notes: parsed.notes,
        };

        let mirror = workspace
            .list::<RecoveredOil>()
            .into_iter()
            .find(|entry| entry.source_id == log.id);

        let mut effects = EffectList::new().replace(&log)?;
        match (log.mode, mirror) {
            (SuctionMode::Sell, Some(current)) => {
                effects = effects.replace(&RecoveredOil::mirror_of(&log, current.id))?;
            }
            (SuctionMode::Sell, None) => {
                effects = effects
                    .insert(&RecoveredOil::mirror_of(&log, new_record_id(RecoveredOil::ID_PREFIX)))?;
            }
            (SuctionMode::Suction, Some(current)) => {
                warn!(mirror = %current.id, "Refusing to drop recovered oil already in stock");
                return Err(ServiceError::InvalidOperation(format!(
                    "Suction log {} already supplied recovered oil {}",
                    log.id, current.id
                )));
            }
            (SuctionMode::Suction, None) => {}
        }

        info!(mode = %log.mode, liters = %log.quantity_liters, "Suction log updated");
        Ok(Plan::new(log, effects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reference::{Branch, ReferenceData};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn workspace() -> Workspace {
        Workspace::in_memory(ReferenceData::new(vec![Branch::new(1, "Bang Na", "Bangkok")]))
    }

    fn draft(mode: &str, liters: &str) -> SuctionDraft {
        SuctionDraft {
            date: "2024-03-05".into(),
            branch_id: "1".into(),
            oil_type: "diesel".into(),
            mode: mode.into(),
            quantity_liters: liters.into(),
            notes: String::new(),
        }
    }

    #[test]
    fn suction_mode_writes_only_the_log() {
        let ws = workspace();
        let plan = RecordSuctionCommand {
            draft: draft("", "300"),
        }
        .plan(&ws)
        .unwrap();
        assert_eq!(plan.effects.len(), 1);
        assert_eq!(plan.output.mode, SuctionMode::Suction);
        assert_eq!(plan.output.quantity_liters, dec!(300));
    }

    #[test]
    fn sell_mode_adds_mirror() {
        let ws = workspace();
        let plan = RecordSuctionCommand {
            draft: draft("sell", "1,200"),
        }
        .plan(&ws)
        .unwrap();
        assert_eq!(
            plan.effects.collections(),
            vec![SuctionLog::COLLECTION_KEY, RecoveredOil::COLLECTION_KEY]
        );
    }

    #[test]
    fn unknown_branch_is_not_found() {
        let ws = workspace();
        let mut input = draft("sell", "10");
        input.branch_id = "7".into();
        assert_matches!(
            RecordSuctionCommand { draft: input }.plan(&ws),
            Err(ServiceError::NotFound(_))
        );
    }

    #[test]
    fn invalid_fields_are_reported_together() {
        let ws = workspace();
        let input = SuctionDraft {
            date: "yesterday".into(),
            quantity_liters: "-5".into(),
            ..draft("pump", "0")
        };
        let err = RecordSuctionCommand { draft: input }.plan(&ws).unwrap_err();
        let fields = err.field_errors().unwrap().field_errors();
        assert!(fields.contains_key("date"));
        assert!(fields.contains_key("mode"));
        assert!(fields.contains_key("quantity_liters"));
    }

    #[test]
    fn edit_keeps_identity_and_updates_mirror() {
        let ws = workspace();
        let created = ws
            .execute(&RecordSuctionCommand {
                draft: draft("sell", "100"),
            })
            .unwrap()
            .output;

        let edited = ws
            .execute(&EditSuctionCommand {
                id: created.id.clone(),
                draft: draft("sell", "150"),
            })
            .unwrap()
            .output;

        assert_eq!(edited.id, created.id);
        assert_eq!(edited.created_at, created.created_at);
        let mirrors = ws.list::<RecoveredOil>();
        assert_eq!(mirrors.len(), 1);
        assert_eq!(mirrors[0].quantity_liters, dec!(150));
    }

    #[test]
    fn edit_cannot_unsell_recovered_oil() {
        let ws = workspace();
        let created = ws
            .execute(&RecordSuctionCommand {
                draft: draft("sell", "100"),
            })
            .unwrap()
            .output;
        assert_matches!(
            ws.execute(&EditSuctionCommand {
                id: created.id,
                draft: draft("suction", "100"),
            }),
            Err(ServiceError::InvalidOperation(_))
        );
    }
}
