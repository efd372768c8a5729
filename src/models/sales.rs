use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{reference::OilType, FieldValue, Record, CREATED_AT};

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
)]
#[strum(ascii_case_insensitive)]
pub enum QuotationStatus {
    #[default]
    Open,
    Converted,
    Cancelled,
}

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
)]
#[strum(ascii_case_insensitive)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Delivered,
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub branch_id: u32,
    pub customer: String,
    pub oil_type: OilType,
    pub quantity_liters: Decimal,
    pub unit_price: Decimal,
    pub status: QuotationStatus,
    #[serde(default)]
    pub order_id: Option<String>,
}

impl Quotation {
    pub fn total(&self) -> Decimal {
        self.quantity_liters.saturating_mul(self.unit_price)
    }
}

impl Record for Quotation {
    const COLLECTION_KEY: &'static str = "sales.quotations.v1";
    const ID_PREFIX: &'static str = "QT";

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
            "branchId" => FieldValue::Number(self.branch_id.into()),
            "customer" => FieldValue::text(&self.customer),
            "oilType" => FieldValue::tag(self.oil_type),
            "quantityLiters" => FieldValue::Number(self.quantity_liters),
            "unitPrice" => FieldValue::Number(self.unit_price),
            "total" => FieldValue::Number(self.total()),
            "status" => FieldValue::tag(self.status),
            "orderId" => FieldValue::optional_text(self.order_id.as_deref()),
            _ => FieldValue::Missing,
        }
    }

    fn search_columns() -> &'static [&'static str] {
        &["id", "customer", "oilType", "status"]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Informal join back to the quotation it came from.
    pub quotation_id: String,
    pub branch_id: u32,
    pub customer: String,
    pub oil_type: OilType,
    pub quantity_liters: Decimal,
    pub unit_price: Decimal,
    pub status: OrderStatus,
}

impl Order {
    pub fn total(&self) -> Decimal {
        self.quantity_liters.saturating_mul(self.unit_price)
    }
}

impl Record for Order {
    const COLLECTION_KEY: &'static str = "sales.orders.v1";
    const ID_PREFIX: &'static str = "OR";

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
            "quotationId" => FieldValue::text(&self.quotation_id),
            "branchId" => FieldValue::Number(self.branch_id.into()),
            "customer" => FieldValue::text(&self.customer),
            "oilType" => FieldValue::tag(self.oil_type),
            "quantityLiters" => FieldValue::Number(self.quantity_liters),
            "unitPrice" => FieldValue::Number(self.unit_price),
            "total" => FieldValue::Number(self.total()),
            "status" => FieldValue::tag(self.status),
            _ => FieldValue::Missing,
        }
    }

    fn search_columns() -> &'static [&'static str] {
        &["id", "quotationId", "customer", "oilType", "status"]
    }
}

/// Bulk sale of recovered oil off a tanker truck.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckSale {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub date: String,
    pub branch_id: u32,
    pub oil_type: OilType,
    pub quantity_liters: Decimal,
    pub unit_price: Decimal,
    pub buyer: String,
}

impl TruckSale {
    pub fn total(&self) -> Decimal {
        self.quantity_liters.saturating_mul(self.unit_price)
    }
}

impl Record for TruckSale {
    const COLLECTION_KEY: &'static str = "sales.truckSales.v1";
    const ID_PREFIX: &'static str = "TS";

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
            "quantityLiters" => FieldValue::Number(self.quantity_liters),
            "unitPrice" => FieldValue::Number(self.unit_price),
            "total" => FieldValue::Number(self.total()),
            "buyer" => FieldValue::text(&self.buyer),
            _ => FieldValue::Missing,
        }
    }

    fn search_columns() -> &'static [&'static str] {
        &["id", "oilType", "buyer"]
    }

    fn date_column() -> &'static str {
        "date"
    }
}
