use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{reference::OilType, FieldValue, Record, CREATED_AT};

/// Whether oil was pumped back out of a station tank or sold off as
/// recovered stock.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum SuctionMode {
    #[default]
    Suction,
    Sell,
}

/// One entry of the oil suction log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuctionLog {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Operation date, `YYYY-MM-DD`.
    pub date: String,
    pub branch_id: u32,
    pub oil_type: OilType,
    pub mode: SuctionMode,
    pub quantity_liters: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for SuctionLog {
    const COLLECTION_KEY: &'static str = "ptt.delivery.suctionLogs.v1";
    const ID_PREFIX: &'static str = "SL";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::text(&self.id),
            CREATED_AT => FieldValue::Timestamp(self.created_at),
            "date" => FieldValue::date(&self.date),
            "branchId" => FieldValue::Number(self.branch_id.into()),
            "oilType" => FieldValue::tag(self.oil_type),
            "mode" => FieldValue::tag(self.mode),
            "quantityLiters" => FieldValue::Number(self.quantity_liters),
            "notes" => FieldValue::optional_text(self.notes.as_deref()),
            _ => FieldValue::Missing,
        }
    }

    fn search_columns() -> &'static [&'static str] {
        &["id", "oilType", "mode", "notes"]
    }

    fn date_column() -> &'static str {
        "date"
    }
}

/// Shared recovered-oil inventory entry. Written by the suction log's sell
/// action and read as available stock by truck sales; the shape must stay
/// stable for both sides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredOil {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Suction log that produced this entry.
    pub source_id: String,
    pub branch_id: u32,
    pub oil_type: OilType,
    pub quantity_liters: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RecoveredOil {
    /// Mirror entry for a sell-mode suction log; shares its timestamp,
    /// branch, grade and quantity.
    pub fn mirror_of(log: &SuctionLog, id: String) -> Self {
        Self {
            id,
            created_at: log.created_at,
            source_id: log.id.clone(),
            branch_id: log.branch_id,
            oil_type: log.oil_type,
            quantity_liters: log.quantity_liters,
            notes: log.notes.clone(),
        }
    }
}

impl Record for RecoveredOil {
    const COLLECTION_KEY: &'static str = "ptt.delivery.recoveredOil.v1";
    const ID_PREFIX: &'static str = "RO";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::text(&self.id),
            CREATED_AT => FieldValue::Timestamp(self.created_at),
            "sourceId" => FieldValue::text(&self.source_id),
            "branchId" => FieldValue::Number(self.branch_id.into()),
            "oilType" => FieldValue::tag(self.oil_type),
            "quantityLiters" => FieldValue::Number(self.quantity_liters),
            "notes" => FieldValue::optional_text(self.notes.as_deref()),
            _ => FieldValue::Missing,
        }
    }

    fn search_columns() -> &'static [&'static str] {
        &["id", "sourceId", "oilType", "notes"]
    }
}
